use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp_cell;
use crate::{
    format,
    listing::{contains, Listing},
    table::{CellValue, Column, TableRecord},
};

string_enum!(MechanicStatus {
    Online => "online",
    Offline => "offline",
    Busy => "busy",
});

string_enum!(VerificationStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mechanic {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: MechanicStatus,
    pub verification_status: VerificationStatus,
    pub is_active: bool,
    pub rating: f64,
    pub total_jobs: u32,
    pub completed_jobs: u32,
    pub wallet_balance: u64,
    #[serde(default)]
    pub specializations: Vec<String>,
    pub joined_at: DateTime<Utc>,
    pub city: String,
    #[serde(default)]
    pub ktp_number: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub bank_account_number: Option<String>,
    #[serde(default)]
    pub bank_account_name: Option<String>,
}

impl Mechanic {
    /// Share of accepted jobs that were completed, in percent
    pub fn completion_rate(&self) -> u32 {
        if self.total_jobs == 0 {
            0
        } else {
            ((self.completed_jobs as f64 / self.total_jobs as f64) * 100.0).round() as u32
        }
    }
}

impl TableRecord for Mechanic {
    fn record_key(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "id" => self.id.as_str().into(),
            "name" => self.name.as_str().into(),
            "email" => self.email.as_str().into(),
            "phone" => self.phone.as_str().into(),
            "city" => self.city.as_str().into(),
            "status" => self.status.as_str().into(),
            "verificationStatus" => self.verification_status.as_str().into(),
            "rating" => self.rating.into(),
            "totalJobs" => self.total_jobs.into(),
            "completedJobs" => self.completed_jobs.into(),
            "walletBalance" => self.wallet_balance.into(),
            "joinedAt" => timestamp_cell(&self.joined_at),
            _ => CellValue::Empty,
        }
    }
}

impl Listing for Mechanic {
    const KIND: &'static str = "Mechanic";
    const TITLE: &'static str = "Mechanic Management";

    fn page_size() -> usize {
        8
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Mechanic").sortable().with_width(18),
            Column::new("city", "City").sortable().with_width(10),
            Column::new("specializations", "Skills")
                .custom(|m: &Self| m.specializations.join(", "))
                .with_width(22),
            Column::new("status", "Status").badge().sortable().with_width(9),
            Column::new("verificationStatus", "Verification").badge().with_width(12),
            Column::new("rating", "Rating")
                .custom(|m: &Self| format!("★ {:.1}", m.rating))
                .sortable()
                .with_width(7),
            Column::new("totalJobs", "Jobs").number().sortable().with_width(6),
            Column::new("walletBalance", "Wallet").currency().sortable().with_width(14),
        ]
    }

    fn matches_search(&self, q: &str) -> bool {
        contains(&self.name, q)
            || contains(&self.email, q)
            || contains(&self.phone, q)
            || contains(&self.city, q)
            || self.specializations.iter().any(|s| contains(s, q))
            || contains(self.verification_status.as_str(), q)
    }

    fn status_filters() -> &'static [(&'static str, &'static str)] {
        &[("online", "Online"), ("busy", "Busy"), ("offline", "Offline")]
    }

    fn matches_status(&self, status: &str) -> bool {
        self.status.as_str() == status
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("Name", self.name.clone()),
            ("Email", self.email.clone()),
            ("Phone", self.phone.clone()),
            ("City", self.city.clone()),
            ("Status", crate::status::label(self.status.as_str())),
            (
                "Verification",
                crate::status::label(self.verification_status.as_str()),
            ),
            ("Active", if self.is_active { "Yes" } else { "No" }.to_string()),
            ("Rating", format!("{:.1}", self.rating)),
            (
                "Jobs",
                format!(
                    "{} completed of {} ({}%)",
                    self.completed_jobs,
                    self.total_jobs,
                    self.completion_rate()
                ),
            ),
            ("Wallet", format::format_currency(self.wallet_balance)),
            ("Specializations", self.specializations.join(", ")),
            ("Joined", format::format_date(&self.joined_at)),
        ];
        if let Some(ref ktp) = self.ktp_number {
            lines.push(("KTP", ktp.clone()));
        }
        if let (Some(bank), Some(number)) = (&self.bank_name, &self.bank_account_number) {
            let holder = self.bank_account_name.as_deref().unwrap_or("-");
            lines.push(("Bank", format!("{} {} a/n {}", bank, number, holder)));
        }
        lines
    }

    fn empty_message() -> &'static str {
        "No mechanics match your filters"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub total_bookings: u32,
    pub is_blocked: bool,
    pub joined_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub city: String,
}

impl User {
    pub fn status_code(&self) -> &'static str {
        if self.is_blocked {
            "blocked"
        } else {
            "active"
        }
    }
}

impl TableRecord for User {
    fn record_key(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "id" => self.id.as_str().into(),
            "name" => self.name.as_str().into(),
            "email" => self.email.as_str().into(),
            "phone" => self.phone.as_str().into(),
            "city" => self.city.as_str().into(),
            "totalBookings" => self.total_bookings.into(),
            "status" => self.status_code().into(),
            "joinedAt" => timestamp_cell(&self.joined_at),
            "lastActive" => timestamp_cell(&self.last_active),
            _ => CellValue::Empty,
        }
    }
}

impl Listing for User {
    const KIND: &'static str = "User";
    const TITLE: &'static str = "User Management";

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "User").sortable().with_width(18),
            Column::new("email", "Email").with_width(24),
            Column::new("phone", "Phone").with_width(16),
            Column::new("city", "City").sortable().with_width(10),
            Column::new("totalBookings", "Bookings").number().sortable().with_width(8),
            Column::new("status", "Status").badge().with_width(8),
            Column::new("joinedAt", "Joined").date().sortable().with_width(12),
        ]
    }

    fn matches_search(&self, q: &str) -> bool {
        contains(&self.name, q)
            || contains(&self.email, q)
            || contains(&self.phone, q)
            || contains(&self.city, q)
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.name.clone()),
            ("Email", self.email.clone()),
            ("Phone", self.phone.clone()),
            ("City", self.city.clone()),
            ("Bookings", self.total_bookings.to_string()),
            ("Status", crate::status::label(self.status_code())),
            ("Joined", format::format_date(&self.joined_at)),
            ("Last Active", format::format_date_time(&self.last_active)),
        ]
    }

    fn page_size() -> usize {
        8
    }

    fn empty_message() -> &'static str {
        "No users match your search"
    }
}

/// Signed-in administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Admin {
    /// The mock administrator every successful login produces
    pub fn mock(email: &str) -> Self {
        Self {
            id: "admin-1".to_string(),
            name: "Super Admin".to_string(),
            email: email.to_string(),
            role: "super_admin".to_string(),
        }
    }
}
