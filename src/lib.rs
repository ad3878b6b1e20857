//! AutoService admin console
//!
//! Tables, wizards and dashboards of the AutoService vehicle-service
//! platform over in-memory fixture data, rendered as a terminal UI.

pub mod errors;
pub mod format;
pub mod status;
pub mod table;
pub mod listing;
#[macro_use]
pub mod models;
pub mod fixtures;
pub mod wizard;
pub mod session;
pub mod config;
pub mod stats;
pub mod notifications;
pub mod export;
pub mod context;
pub mod cli;
pub mod tui;

pub use context::AppContext;
pub use errors::{AppError, AppResult};
