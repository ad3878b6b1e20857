//! Figures derived from fixture data for the dashboard, finance and
//! monitoring screens

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::fixtures::FixtureSet;
use crate::models::{
    ActivityLog, Booking, BookingStatus, EscrowStatus, Mechanic, MechanicStatus, PaymentStatus,
    Transaction, TransactionStatus, TransactionType,
};

/// Window for counting a user as new
pub const NEW_USER_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_bookings_today: usize,
    pub active_bookings: usize,
    pub completed_bookings: usize,
    pub cancelled_bookings: usize,
    pub total_revenue: u64,
    pub platform_commission: u64,
    pub active_mechanics: usize,
    pub new_users: usize,
}

impl DashboardStats {
    pub fn compute(data: &FixtureSet) -> Self {
        let now = data.generated_at;
        let today = now.date_naive();
        let bookings = &data.bookings;

        let count = |status: BookingStatus| bookings.iter().filter(|b| b.status == status).count();
        // Money the customer has actually handed over
        let collected = bookings
            .iter()
            .filter(|b| matches!(b.payment_status, PaymentStatus::Paid | PaymentStatus::Escrow));

        Self {
            total_bookings_today: bookings
                .iter()
                .filter(|b| b.created_at.date_naive() == today)
                .count(),
            active_bookings: bookings.iter().filter(|b| b.is_active()).count(),
            completed_bookings: count(BookingStatus::Completed),
            cancelled_bookings: count(BookingStatus::Cancelled),
            total_revenue: collected.clone().map(|b| b.amount).sum(),
            platform_commission: collected.map(|b| b.platform_fee).sum(),
            active_mechanics: data
                .mechanics
                .iter()
                .filter(|m| m.status == MechanicStatus::Online)
                .count(),
            new_users: data
                .users
                .iter()
                .filter(|u| now - u.joined_at <= Duration::days(NEW_USER_DAYS))
                .count(),
        }
    }

    /// (title, value) pairs in display order
    pub fn cards(&self) -> Vec<(&'static str, String)> {
        use crate::format::{format_currency, format_number};
        vec![
            ("Bookings Today", self.total_bookings_today.to_string()),
            ("Active Bookings", self.active_bookings.to_string()),
            ("Completed", format_number(self.completed_bookings as u64)),
            ("Cancelled", self.cancelled_bookings.to_string()),
            ("Total Revenue", format_currency(self.total_revenue)),
            ("Platform Commission", format_currency(self.platform_commission)),
            ("Active Mechanics", self.active_mechanics.to_string()),
            ("New Users", self.new_users.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceStats {
    pub total_transactions: usize,
    /// Completed booking payments
    pub total_revenue: u64,
    pub commission_earned: u64,
    pub pending_withdrawals: u64,
    pub escrow_held: u64,
    pub payouts: u64,
    pub refunds: u64,
}

impl FinanceStats {
    pub fn compute(transactions: &[Transaction]) -> Self {
        let sum = |kind: TransactionType, status: Option<TransactionStatus>| -> u64 {
            transactions
                .iter()
                .filter(|t| t.kind == kind && status.map_or(true, |s| t.status == s))
                .map(|t| t.amount)
                .sum()
        };
        let completed = Some(TransactionStatus::Completed);

        Self {
            total_transactions: transactions.len(),
            total_revenue: sum(TransactionType::BookingPayment, completed),
            commission_earned: sum(TransactionType::PlatformCommission, completed),
            pending_withdrawals: sum(TransactionType::Withdrawal, Some(TransactionStatus::Pending)),
            escrow_held: transactions
                .iter()
                .filter(|t| t.escrow_status == Some(EscrowStatus::Held))
                .map(|t| t.amount)
                .sum(),
            payouts: sum(TransactionType::MechanicPayout, completed),
            refunds: sum(TransactionType::Refund, completed),
        }
    }

    pub fn cards(&self) -> Vec<(&'static str, String)> {
        use crate::format::format_currency;
        vec![
            ("Total Transactions", self.total_transactions.to_string()),
            ("Total Revenue", format_currency(self.total_revenue)),
            ("Commission Earned", format_currency(self.commission_earned)),
            ("Pending Withdrawals", format_currency(self.pending_withdrawals)),
            ("Held in Escrow", format_currency(self.escrow_held)),
            ("Mechanic Payouts", format_currency(self.payouts)),
            ("Refunds", format_currency(self.refunds)),
        ]
    }
}

/// Sum of transaction amounts per type, in type order, skipping empty types
pub fn transaction_breakdown(transactions: &[Transaction]) -> Vec<(TransactionType, u64)> {
    TransactionType::ALL
        .iter()
        .map(|&kind| {
            let total = transactions
                .iter()
                .filter(|t| t.kind == kind)
                .map(|t| t.amount)
                .sum();
            (kind, total)
        })
        .filter(|(_, total)| *total > 0)
        .collect()
}

/// Bookings created per day for the seven days ending at `now`
pub fn bookings_per_day(bookings: &[Booking], now: DateTime<Utc>) -> Vec<(NaiveDate, u64)> {
    let today = now.date_naive();
    (0..7)
        .rev()
        .map(|back| {
            let day = today - Duration::days(back);
            let n = bookings
                .iter()
                .filter(|b| b.created_at.date_naive() == day)
                .count() as u64;
            (day, n)
        })
        .collect()
}

/// Most recently created bookings first
pub fn recent_bookings(bookings: &[Booking], limit: usize) -> Vec<&Booking> {
    let mut sorted: Vec<&Booking> = bookings.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

/// Newest activity first
pub fn recent_activity(logs: &[ActivityLog], limit: usize) -> Vec<&ActivityLog> {
    let mut sorted: Vec<&ActivityLog> = logs.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.truncate(limit);
    sorted
}

/// Mechanics ranked by completed jobs, rating breaking ties
pub fn top_mechanics(mechanics: &[Mechanic], limit: usize) -> Vec<&Mechanic> {
    let mut ranked: Vec<&Mechanic> = mechanics.iter().filter(|m| m.is_active).collect();
    ranked.sort_by(|a, b| {
        b.completed_jobs
            .cmp(&a.completed_jobs)
            .then(b.rating.total_cmp(&a.rating))
    });
    ranked.truncate(limit);
    ranked
}

/// (online, busy, offline) mechanic counts
pub fn mechanic_status_counts(mechanics: &[Mechanic]) -> (usize, usize, usize) {
    let count = |s: MechanicStatus| mechanics.iter().filter(|m| m.status == s).count();
    (
        count(MechanicStatus::Online),
        count(MechanicStatus::Busy),
        count(MechanicStatus::Offline),
    )
}

/// Bookings with a mechanic on the way or at work
pub fn live_trips(bookings: &[Booking]) -> Vec<&Booking> {
    bookings
        .iter()
        .filter(|b| b.status == BookingStatus::InProgress)
        .collect()
}

/// Bookings still waiting for a mechanic, newest first
pub fn incoming_bookings(bookings: &[Booking]) -> Vec<&Booking> {
    let mut pending: Vec<&Booking> = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Pending)
        .collect();
    pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    pending
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> FixtureSet {
        FixtureSet::embedded().unwrap()
    }

    #[test]
    fn test_dashboard_stats() {
        let stats = DashboardStats::compute(&data());
        assert_eq!(stats.total_bookings_today, 7);
        assert_eq!(stats.active_bookings, 5);
        assert_eq!(stats.completed_bookings, 5);
        assert_eq!(stats.cancelled_bookings, 2);
        assert_eq!(stats.active_mechanics, 4);
        assert_eq!(stats.new_users, 2);
        // Paid or escrow bookings: 1,2,3,5,7,8,9,12,13,14
        assert_eq!(stats.total_revenue, 8_700_000);
        assert_eq!(stats.platform_commission, 1_305_000);
    }

    #[test]
    fn test_finance_stats() {
        let stats = FinanceStats::compute(&data().transactions);
        assert_eq!(stats.total_transactions, 10);
        assert_eq!(stats.total_revenue, 5_350_000);
        assert_eq!(stats.commission_earned, 165_000);
        assert_eq!(stats.pending_withdrawals, 5_000_000);
        assert_eq!(stats.escrow_held, 5_350_000);
        assert_eq!(stats.refunds, 150_000);
    }

    #[test]
    fn test_bookings_per_day_covers_a_week() {
        let data = data();
        let days = bookings_per_day(&data.bookings, data.generated_at);
        assert_eq!(days.len(), 7);
        assert_eq!(days[6].1, 7);
        assert_eq!(days.iter().map(|(_, n)| n).sum::<u64>(), 13);
    }

    #[test]
    fn test_rankings() {
        let data = data();
        let top = top_mechanics(&data.mechanics, 3);
        assert_eq!(top[0].name, "Yanto Kurniawan");
        assert_eq!(top.len(), 3);

        let recent = recent_bookings(&data.bookings, 5);
        assert_eq!(recent[0].booking_number, "BK-2024-0010");

        assert_eq!(mechanic_status_counts(&data.mechanics), (4, 2, 2));
        assert_eq!(live_trips(&data.bookings).len(), 3);
        assert_eq!(incoming_bookings(&data.bookings).len(), 2);
    }

    #[test]
    fn test_breakdown_skips_empty_types() {
        let data = data();
        let breakdown = transaction_breakdown(&data.transactions);
        assert_eq!(breakdown[0].0, TransactionType::BookingPayment);
        assert_eq!(breakdown[0].1, 6_100_000);
        assert_eq!(breakdown.len(), 5);
    }
}
