use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp_cell;
use crate::{
    format,
    listing::{contains, Listing},
    table::{CellValue, Column, TableRecord},
};

string_enum!(BookingStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

string_enum!(PaymentStatus {
    Pending => "pending",
    Paid => "paid",
    Refunded => "refunded",
    Escrow => "escrow",
});

/// Customer or mechanic as embedded in a booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyRef {
    pub id: String,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRef {
    pub id: String,
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingLocation {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleInfo {
    pub make: String,
    pub model: String,
    pub year: u16,
    pub plate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub booking_number: String,
    pub customer: PartyRef,
    #[serde(default)]
    pub mechanic: Option<PartyRef>,
    pub service: ServiceRef,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub amount: u64,
    pub platform_fee: u64,
    pub mechanic_earning: u64,
    pub location: BookingLocation,
    pub vehicle_info: VehicleInfo,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One milestone of the booking status timeline
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineStep {
    pub label: &'static str,
    pub time: Option<DateTime<Utc>>,
    pub done: bool,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            BookingStatus::Confirmed | BookingStatus::InProgress
        )
    }

    pub fn mechanic_name(&self) -> &str {
        self.mechanic
            .as_ref()
            .map(|m| m.name.as_str())
            .unwrap_or("Unassigned")
    }

    pub fn vehicle_label(&self) -> String {
        format!(
            "{} {} {} ({})",
            self.vehicle_info.year,
            self.vehicle_info.make,
            self.vehicle_info.model,
            self.vehicle_info.plate
        )
    }

    pub fn timeline(&self) -> Vec<TimelineStep> {
        use BookingStatus::*;
        let status = self.status;
        vec![
            TimelineStep {
                label: "Booking Created",
                time: Some(self.created_at),
                done: true,
            },
            TimelineStep {
                label: "Confirmed",
                time: Some(self.created_at),
                done: matches!(status, Confirmed | InProgress | Completed),
            },
            TimelineStep {
                label: "In Progress",
                time: Some(self.scheduled_at),
                done: matches!(status, InProgress | Completed),
            },
            TimelineStep {
                label: "Completed",
                time: self.completed_at,
                done: status == Completed,
            },
        ]
    }
}

impl TableRecord for Booking {
    fn record_key(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "id" => self.id.as_str().into(),
            "bookingNumber" => self.booking_number.as_str().into(),
            "customer" => self.customer.name.as_str().into(),
            "mechanic" => self.mechanic.as_ref().map(|m| m.name.as_str()).into(),
            "service" => self.service.name.as_str().into(),
            "status" => self.status.as_str().into(),
            "paymentStatus" => self.payment_status.as_str().into(),
            "location" | "city" => self.location.city.as_str().into(),
            "amount" => self.amount.into(),
            "platformFee" => self.platform_fee.into(),
            "mechanicEarning" => self.mechanic_earning.into(),
            "scheduledAt" => timestamp_cell(&self.scheduled_at),
            "createdAt" => timestamp_cell(&self.created_at),
            _ => CellValue::Empty,
        }
    }
}

impl Listing for Booking {
    const KIND: &'static str = "Booking";
    const TITLE: &'static str = "Booking Management";

    fn page_size() -> usize {
        8
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("bookingNumber", "Booking ID").sortable().with_width(14),
            Column::new("customer", "Customer").with_width(18),
            Column::new("service", "Service").with_width(18),
            Column::new("mechanic", "Mechanic")
                .custom(|b: &Self| b.mechanic_name().to_string())
                .with_width(16),
            Column::new("status", "Status").badge().sortable().with_width(12),
            Column::new("paymentStatus", "Payment").badge().with_width(10),
            Column::new("location", "City").with_width(10),
            Column::new("amount", "Amount").currency().sortable().with_width(14),
        ]
    }

    fn matches_search(&self, q: &str) -> bool {
        contains(&self.booking_number, q)
            || contains(&self.customer.name, q)
            || contains(&self.service.name, q)
            || self
                .mechanic
                .as_ref()
                .map_or(false, |m| contains(&m.name, q))
            || contains(&self.location.city, q)
    }

    fn status_filters() -> &'static [(&'static str, &'static str)] {
        &[
            ("pending", "Pending"),
            ("confirmed", "Confirmed"),
            ("in_progress", "In Progress"),
            ("completed", "Completed"),
            ("cancelled", "Cancelled"),
        ]
    }

    fn matches_status(&self, status: &str) -> bool {
        self.status.as_str() == status
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("Booking", self.booking_number.clone()),
            ("Status", crate::status::label(self.status.as_str())),
            ("Payment", crate::status::label(self.payment_status.as_str())),
            (
                "Customer",
                format!("{} ({})", self.customer.name, self.customer.phone),
            ),
            (
                "Mechanic",
                match self.mechanic {
                    Some(ref m) => format!("{} ({})", m.name, m.phone),
                    None => "Unassigned".to_string(),
                },
            ),
            (
                "Service",
                format!("{} / {}", self.service.category, self.service.name),
            ),
            ("Vehicle", self.vehicle_label()),
            (
                "Location",
                format!("{}, {}", self.location.address, self.location.city),
            ),
            ("Scheduled", format::format_date_time(&self.scheduled_at)),
            ("Amount", format::format_currency(self.amount)),
            ("Platform Fee", format::format_currency(self.platform_fee)),
            (
                "Mechanic Earning",
                format::format_currency(self.mechanic_earning),
            ),
            ("Created", format::format_date_time(&self.created_at)),
        ];
        if let Some(ts) = self.completed_at {
            lines.push(("Completed", format::format_date_time(&ts)));
        }
        if let Some(ts) = self.cancelled_at {
            lines.push(("Cancelled", format::format_date_time(&ts)));
        }
        if let Some(ref notes) = self.notes {
            lines.push(("Notes", notes.clone()));
        }
        lines
    }

    fn empty_message() -> &'static str {
        "No bookings match your filters"
    }
}
