use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp_cell;
use crate::{
    format,
    listing::{contains, Listing},
    status::Tone,
    table::{CellValue, Column, TableRecord},
};

string_enum!(NotificationType {
    Push => "push",
    System => "system",
    Broadcast => "broadcast",
});

impl NotificationType {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationType::Push => "Push Notification",
            NotificationType::System => "System Alert",
            NotificationType::Broadcast => "Broadcast Message",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            NotificationType::Push => Tone::Primary,
            NotificationType::System => Tone::Warning,
            NotificationType::Broadcast => Tone::Info,
        }
    }
}

string_enum!(NotificationTarget {
    All => "all",
    Users => "users",
    Mechanics => "mechanics",
    Workshops => "workshops",
});

impl NotificationTarget {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationTarget::All => "All Users",
            NotificationTarget::Users => "Customers Only",
            NotificationTarget::Mechanics => "Mechanics Only",
            NotificationTarget::Workshops => "Workshops Only",
        }
    }
}

/// Outgoing push, system or broadcast message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub target: NotificationTarget,
    pub sent_at: DateTime<Utc>,
    pub read_count: u64,
    pub total_recipients: u64,
}

impl Notification {
    /// Rounded percentage of recipients who read the message
    pub fn read_rate(&self) -> u32 {
        if self.total_recipients == 0 {
            return 0;
        }
        ((self.read_count as f64 / self.total_recipients as f64) * 100.0).round() as u32
    }
}

impl TableRecord for Notification {
    fn record_key(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "id" => self.id.as_str().into(),
            "title" => self.title.as_str().into(),
            "type" => self.kind.as_str().into(),
            "target" => self.target.as_str().into(),
            "readCount" => self.read_count.into(),
            "readRate" => self.read_rate().into(),
            "sentAt" => timestamp_cell(&self.sent_at),
            _ => CellValue::Empty,
        }
    }
}

impl Listing for Notification {
    const KIND: &'static str = "Notification";
    const TITLE: &'static str = "Notification History";

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("title", "Notification").with_width(28),
            Column::new("type", "Type")
                .custom(|n: &Self| crate::status::label(n.kind.as_str()))
                .with_width(10),
            Column::new("target", "Target")
                .custom(|n: &Self| crate::status::label(n.target.as_str()))
                .with_width(10),
            Column::new("readCount", "Read Rate")
                .custom(|n: &Self| {
                    format!(
                        "{}% ({}/{})",
                        n.read_rate(),
                        format::format_number(n.read_count),
                        format::format_number(n.total_recipients)
                    )
                })
                .with_width(18),
            Column::new("sentAt", "Sent").date_time().sortable().with_width(22),
        ]
    }

    fn matches_search(&self, q: &str) -> bool {
        contains(&self.title, q) || contains(&self.message, q)
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Title", self.title.clone()),
            ("Message", self.message.clone()),
            ("Type", self.kind.label().to_string()),
            ("Target", self.target.label().to_string()),
            (
                "Read",
                format!(
                    "{} of {} ({}%)",
                    self.read_count,
                    self.total_recipients,
                    self.read_rate()
                ),
            ),
            ("Sent", format::format_date_time(&self.sent_at)),
        ]
    }

    fn page_size() -> usize {
        5
    }

    fn empty_message() -> &'static str {
        "No notifications sent yet"
    }
}

string_enum!(AdminNotificationType {
    Booking => "booking",
    Mechanic => "mechanic",
    Payment => "payment",
    System => "system",
    Alert => "alert",
});

impl AdminNotificationType {
    pub fn label(&self) -> &'static str {
        match self {
            AdminNotificationType::Booking => "Booking",
            AdminNotificationType::Mechanic => "Mechanic",
            AdminNotificationType::Payment => "Payment",
            AdminNotificationType::System => "System",
            AdminNotificationType::Alert => "Alert",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            AdminNotificationType::Booking => Tone::Primary,
            AdminNotificationType::Mechanic => Tone::Success,
            AdminNotificationType::Payment => Tone::Warning,
            AdminNotificationType::System => Tone::Info,
            AdminNotificationType::Alert => Tone::Danger,
        }
    }
}

/// Incoming notification addressed to the administrator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminNotification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: AdminNotificationType,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl TableRecord for AdminNotification {
    fn record_key(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "id" => self.id.as_str().into(),
            "title" => self.title.as_str().into(),
            "type" => self.kind.as_str().into(),
            "isRead" => self.is_read.into(),
            "createdAt" => timestamp_cell(&self.created_at),
            _ => CellValue::Empty,
        }
    }
}

impl Listing for AdminNotification {
    const KIND: &'static str = "Notification";
    const TITLE: &'static str = "All Notifications";

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("isRead", " ")
                .custom(|n: &Self| if n.is_read { " " } else { "●" }.to_string())
                .with_width(2),
            Column::new("type", "Type")
                .custom(|n: &Self| n.kind.label().to_string())
                .with_width(9),
            Column::new("title", "Title").with_width(30),
            Column::new("message", "Message").custom(|n: &Self| n.message.clone()),
            Column::new("createdAt", "Received").date_time().sortable().with_width(22),
        ]
    }

    fn matches_search(&self, q: &str) -> bool {
        contains(&self.title, q) || contains(&self.message, q)
    }

    fn status_filters() -> &'static [(&'static str, &'static str)] {
        &[
            ("unread", "Unread"),
            ("booking", "Bookings"),
            ("payment", "Payments"),
            ("mechanic", "Mechanics"),
            ("alert", "Alerts"),
            ("system", "System"),
        ]
    }

    fn matches_status(&self, filter: &str) -> bool {
        match filter {
            "unread" => !self.is_read,
            kind => self.kind.as_str() == kind,
        }
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("Title", self.title.clone()),
            ("Message", self.message.clone()),
            ("Type", self.kind.label().to_string()),
            ("Status", if self.is_read { "Read" } else { "Unread" }.to_string()),
            ("Received", format::format_date_time(&self.created_at)),
        ];
        if let Some(ref link) = self.link {
            lines.push(("Link", link.clone()));
        }
        for (key, value) in &self.metadata {
            lines.push(("Info", format!("{}: {}", key, value)));
        }
        lines
    }

    fn empty_message() -> &'static str {
        "No notifications found"
    }
}

string_enum!(ActivityType {
    BookingCreated => "booking_created",
    BookingAccepted => "booking_accepted",
    BookingCompleted => "booking_completed",
    MechanicOnline => "mechanic_online",
    MechanicOffline => "mechanic_offline",
    PaymentReceived => "payment_received",
    SystemAlert => "system_alert",
});

impl ActivityType {
    pub fn tone(&self) -> Tone {
        match self {
            ActivityType::BookingCreated => Tone::Primary,
            ActivityType::BookingAccepted | ActivityType::MechanicOnline => Tone::Success,
            ActivityType::BookingCompleted => Tone::Info,
            ActivityType::MechanicOffline => Tone::Neutral,
            ActivityType::PaymentReceived => Tone::Warning,
            ActivityType::SystemAlert => Tone::Danger,
        }
    }
}

/// Activity feed entry shown on the monitoring screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl TableRecord for ActivityLog {
    fn record_key(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "id" => self.id.as_str().into(),
            "type" => self.kind.as_str().into(),
            "message" => self.message.as_str().into(),
            "timestamp" => timestamp_cell(&self.timestamp),
            _ => CellValue::Empty,
        }
    }
}

impl Listing for ActivityLog {
    const KIND: &'static str = "Activity";
    const TITLE: &'static str = "Activity Log";

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("timestamp", "Time").date_time().sortable().with_width(22),
            Column::new("type", "Event").badge().with_width(18),
            Column::new("message", "Message"),
        ]
    }

    fn matches_search(&self, q: &str) -> bool {
        contains(&self.message, q)
    }

    fn status_filters() -> &'static [(&'static str, &'static str)] {
        &[
            ("booking", "Bookings"),
            ("mechanic", "Mechanics"),
            ("payment", "Payments"),
            ("system", "System"),
        ]
    }

    /// Event families match by substring, so "booking" covers every booking event
    fn matches_status(&self, family: &str) -> bool {
        self.kind.as_str().contains(family)
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("Event", crate::status::label(self.kind.as_str())),
            ("Message", self.message.clone()),
            ("Time", format::format_date_time(&self.timestamp)),
        ];
        for (key, value) in &self.metadata {
            lines.push(("Info", format!("{}: {}", key, value)));
        }
        lines
    }

    fn empty_message() -> &'static str {
        "No activity logs found"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn log(kind: ActivityType, message: &str) -> ActivityLog {
        ActivityLog {
            id: format!("log-{}", kind),
            kind,
            message: message.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn test_activity_family_filter_uses_substring() {
        let created = log(ActivityType::BookingCreated, "New booking BK-2024-0015");
        let online = log(ActivityType::MechanicOnline, "Budi is online");
        assert!(created.matches_status("booking"));
        assert!(!created.matches_status("mechanic"));
        assert!(online.matches_status("mechanic"));
        assert!(log(ActivityType::SystemAlert, "High load").matches_status("system"));
    }

    #[test]
    fn test_read_rate_rounds_and_guards_zero() {
        let mut n = Notification {
            id: "notif-1".to_string(),
            title: "Promo".to_string(),
            message: "Discount".to_string(),
            kind: NotificationType::Broadcast,
            target: NotificationTarget::All,
            sent_at: Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap(),
            read_count: 2,
            total_recipients: 3,
        };
        assert_eq!(n.read_rate(), 67);
        n.total_recipients = 0;
        assert_eq!(n.read_rate(), 0);
    }

    #[test]
    fn test_admin_notification_unread_filter() {
        let n = AdminNotification {
            id: "an-1".to_string(),
            title: "Payment received".to_string(),
            message: "Rp 350.000".to_string(),
            kind: AdminNotificationType::Payment,
            is_read: false,
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            link: None,
            metadata: BTreeMap::new(),
        };
        assert!(n.matches_status("unread"));
        assert!(n.matches_status("payment"));
        assert!(!n.matches_status("booking"));
    }
}
