//! TUI screens

pub mod booking;
pub mod broadcasts;
pub mod dashboard;
pub mod landing;
pub mod login;
pub mod monitoring;
pub mod records;
pub mod services;
pub mod settings;
pub mod workshop_editor;

pub use booking::BookingScreen;
pub use broadcasts::BroadcastsScreen;
pub use dashboard::DashboardScreen;
pub use landing::LandingScreen;
pub use login::LoginScreen;
pub use monitoring::MonitoringScreen;
pub use records::{
    BookingsScreen, FinanceScreen, ListScreen, MechanicsScreen, NotificationsScreen, RecordView,
    UsersScreen, WorkshopsScreen,
};
pub use services::ServicesScreen;
pub use settings::SettingsScreen;
pub use workshop_editor::WorkshopEditorScreen;
