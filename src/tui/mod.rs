//! AutoService terminal user interface
//!
//! A public area (landing menu, booking wizard, login) and the admin
//! console behind a mock session.

pub mod app;
pub mod components;
pub mod events;
pub mod screens;
pub mod traits;
pub mod ui;

pub use app::{App, Screen};
pub use events::AppEvent;
