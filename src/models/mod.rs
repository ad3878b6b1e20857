//! View-model records of the AutoService platform
//!
//! Every collection is loaded once from fixture data and only changed in
//! memory afterwards.

/// Closed set of lowercase string codes, serialized as the code itself
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(value))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod booking;
pub mod finance;
pub mod notification;
pub mod people;
pub mod settings;
pub mod workshop;

pub use booking::{
    Booking, BookingLocation, BookingStatus, PartyRef, PaymentStatus, ServiceRef, TimelineStep,
    VehicleInfo,
};
pub use finance::{EscrowStatus, Transaction, TransactionStatus, TransactionType};
pub use notification::{
    ActivityLog, ActivityType, AdminNotification, AdminNotificationType, Notification,
    NotificationTarget, NotificationType,
};
pub use people::{Admin, Mechanic, MechanicStatus, User, VerificationStatus};
pub use settings::{SettingField, SystemSettings, SYSTEM_INFO};
pub use workshop::{filter_catalog, PriceType, Service, ServiceCategory, Workshop};

use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamp as a sortable table cell value
pub(crate) fn timestamp_cell(ts: &DateTime<Utc>) -> crate::table::CellValue {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true).into()
}

/// One point of a time series, e.g. daily revenue
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub value: u64,
}
