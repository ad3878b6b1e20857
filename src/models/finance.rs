use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp_cell;
use crate::{
    format,
    listing::{contains, Listing},
    status::Tone,
    table::{CellValue, Column, TableRecord},
};

string_enum!(TransactionType {
    BookingPayment => "booking_payment",
    MechanicPayout => "mechanic_payout",
    PlatformCommission => "platform_commission",
    Withdrawal => "withdrawal",
    Refund => "refund",
});

impl TransactionType {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::BookingPayment => "Booking Payment",
            TransactionType::MechanicPayout => "Mechanic Payout",
            TransactionType::PlatformCommission => "Commission",
            TransactionType::Withdrawal => "Withdrawal",
            TransactionType::Refund => "Refund",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            TransactionType::BookingPayment => Tone::Primary,
            TransactionType::MechanicPayout => Tone::Success,
            TransactionType::PlatformCommission => Tone::Warning,
            TransactionType::Withdrawal => Tone::Info,
            TransactionType::Refund => Tone::Danger,
        }
    }

    /// Money leaving the platform
    pub fn is_outgoing(&self) -> bool {
        matches!(
            self,
            TransactionType::MechanicPayout | TransactionType::Refund
        )
    }
}

string_enum!(TransactionStatus {
    Completed => "completed",
    Pending => "pending",
    Failed => "failed",
});

string_enum!(EscrowStatus {
    Held => "held",
    Released => "released",
    Refunded => "refunded",
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: u64,
    pub status: TransactionStatus,
    #[serde(default)]
    pub escrow_status: Option<EscrowStatus>,
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub mechanic_id: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Amount with its direction sign, e.g. "-Rp 150.000"
    pub fn signed_amount(&self) -> String {
        let sign = if self.kind.is_outgoing() { "-" } else { "+" };
        format!("{}{}", sign, format::format_currency(self.amount))
    }
}

impl TableRecord for Transaction {
    fn record_key(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "id" => self.id.as_str().into(),
            "type" => self.kind.as_str().into(),
            "description" => self.description.as_str().into(),
            "amount" => self.amount.into(),
            "status" => self.status.as_str().into(),
            "escrowStatus" => self.escrow_status.map(|s| s.as_str()).into(),
            "bookingId" => self.booking_id.as_deref().into(),
            "mechanicId" => self.mechanic_id.as_deref().into(),
            "createdAt" => timestamp_cell(&self.created_at),
            _ => CellValue::Empty,
        }
    }
}

impl Listing for Transaction {
    const KIND: &'static str = "Transaction";
    const TITLE: &'static str = "Payments & Finance";

    fn page_size() -> usize {
        8
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", "Transaction ID").with_width(14),
            Column::new("type", "Type")
                .custom(|t: &Self| t.kind.label().to_string())
                .with_width(16),
            Column::new("description", "Description").with_width(30),
            Column::new("amount", "Amount")
                .custom(Transaction::signed_amount)
                .sortable()
                .with_width(15),
            Column::new("escrowStatus", "Escrow")
                .custom(|t: &Self| {
                    t.escrow_status
                        .map(|s| crate::status::label(s.as_str()))
                        .unwrap_or_else(|| "N/A".to_string())
                })
                .with_width(9),
            Column::new("status", "Status").badge().with_width(10),
            Column::new("createdAt", "Date").date_time().sortable().with_width(22),
        ]
    }

    fn matches_search(&self, q: &str) -> bool {
        contains(&self.id, q) || contains(&self.description, q)
    }

    fn status_filters() -> &'static [(&'static str, &'static str)] {
        &[
            ("booking_payment", "Payments"),
            ("mechanic_payout", "Payouts"),
            ("platform_commission", "Commissions"),
            ("refund", "Refunds"),
        ]
    }

    fn matches_status(&self, kind: &str) -> bool {
        self.kind.as_str() == kind
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Transaction", self.id.clone()),
            ("Type", self.kind.label().to_string()),
            ("Amount", self.signed_amount()),
            ("Status", crate::status::label(self.status.as_str())),
            (
                "Escrow",
                self.escrow_status
                    .map(|s| crate::status::label(s.as_str()))
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            ("Booking", self.booking_id.clone().unwrap_or_else(|| "-".to_string())),
            ("Mechanic", self.mechanic_id.clone().unwrap_or_else(|| "-".to_string())),
            ("Description", self.description.clone()),
            ("Date", format::format_date_time(&self.created_at)),
        ]
    }

    fn empty_message() -> &'static str {
        "No transactions found"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_labels() {
        assert_eq!(TransactionType::PlatformCommission.label(), "Commission");
        assert_eq!(TransactionType::Refund.tone(), Tone::Danger);
        assert!(TransactionType::MechanicPayout.is_outgoing());
        assert!(!TransactionType::BookingPayment.is_outgoing());
    }

    #[test]
    fn test_transaction_deserializes_type_field() {
        let json = r#"{
            "id": "TRX-001",
            "type": "refund",
            "amount": 150000,
            "status": "completed",
            "escrowStatus": "refunded",
            "description": "Refund for cancelled booking",
            "createdAt": "2024-01-15T10:00:00Z"
        }"#;
        let trx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(trx.kind, TransactionType::Refund);
        assert_eq!(trx.escrow_status, Some(EscrowStatus::Refunded));
        assert_eq!(trx.signed_amount(), "-Rp 150.000");
        assert!(trx.matches_status("refund"));
        assert!(trx.matches_search("cancelled"));
    }
}
