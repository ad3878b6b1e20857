//! Reusable UI components

pub mod data_table;
pub mod input;
pub mod sidebar;
pub mod toast;
pub mod wizard_panel;

pub use data_table::{column_widths, handle_table_key, render_table, TableKey};
pub use input::InputField;
pub use sidebar::Sidebar;
pub use toast::{ToastKind, Toasts};
pub use wizard_panel::{WizardOutcome, WizardPanel};
