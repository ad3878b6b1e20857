//! Static fixture data standing in for the platform backend
//!
//! The default set is compiled into the binary; `--fixtures PATH` or
//! `AUTOSERVICE_FIXTURES` swaps in another JSON file of the same shape.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};
use crate::listing::{find_by_key, Listing};
use crate::models::{
    ActivityLog, AdminNotification, Booking, ChartPoint, Mechanic, Notification, Service,
    ServiceCategory, SystemSettings, Transaction, User, Workshop,
};

const EMBEDDED_FIXTURES: &str = include_str!("../data/fixtures.json");

/// Every collection the admin console shows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureSet {
    /// "Now" for relative figures (today's bookings, new users, time-ago)
    pub generated_at: DateTime<Utc>,
    pub bookings: Vec<Booking>,
    pub mechanics: Vec<Mechanic>,
    pub workshops: Vec<Workshop>,
    pub users: Vec<User>,
    pub transactions: Vec<Transaction>,
    pub service_categories: Vec<ServiceCategory>,
    /// Outgoing broadcasts
    pub notifications: Vec<Notification>,
    /// Incoming notifications for the administrator
    pub admin_notifications: Vec<AdminNotification>,
    pub activity_logs: Vec<ActivityLog>,
    #[serde(default)]
    pub settings: SystemSettings,
    #[serde(default)]
    pub revenue_series: Vec<ChartPoint>,
}

impl FixtureSet {
    /// The fixture set compiled into the binary
    pub fn embedded() -> AppResult<Self> {
        Self::from_json(EMBEDDED_FIXTURES)
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        let set: FixtureSet = serde_json::from_str(json)?;
        set.validate()?;
        debug!(
            "Loaded fixtures: {} bookings, {} mechanics, {} workshops, {} users, {} transactions",
            set.bookings.len(),
            set.mechanics.len(),
            set.workshops.len(),
            set.users.len(),
            set.transactions.len()
        );
        Ok(set)
    }

    pub fn from_path(path: &Path) -> AppResult<Self> {
        info!("Loading fixtures from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Loads from `path` when given, otherwise the embedded set
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::embedded(),
        }
    }

    /// Identifiers must be unique within each collection
    pub fn validate(&self) -> AppResult<()> {
        unique_ids(&self.bookings)?;
        unique_ids(&self.mechanics)?;
        unique_ids(&self.workshops)?;
        unique_ids(&self.users)?;
        unique_ids(&self.transactions)?;
        unique_ids(&self.notifications)?;
        unique_ids(&self.admin_notifications)?;
        unique_ids(&self.activity_logs)?;
        unique_ids(&self.services())?;
        Ok(())
    }

    /// All services flattened out of their categories
    pub fn services(&self) -> Vec<Service> {
        self.service_categories
            .iter()
            .flat_map(|c| c.services.iter().cloned())
            .collect()
    }

    pub fn booking(&self, id: &str) -> AppResult<&Booking> {
        find(&self.bookings, id)
    }

    pub fn mechanic(&self, id: &str) -> AppResult<&Mechanic> {
        find(&self.mechanics, id)
    }

    pub fn workshop(&self, id: &str) -> AppResult<&Workshop> {
        find(&self.workshops, id)
    }

    pub fn user(&self, id: &str) -> AppResult<&User> {
        find(&self.users, id)
    }

    pub fn transaction(&self, id: &str) -> AppResult<&Transaction> {
        find(&self.transactions, id)
    }

    pub fn admin_notification(&self, id: &str) -> AppResult<&AdminNotification> {
        find(&self.admin_notifications, id)
    }

    /// Bookings handled by one mechanic, newest first
    pub fn bookings_for_mechanic(&self, mechanic_id: &str) -> Vec<&Booking> {
        let mut bookings: Vec<&Booking> = self
            .bookings
            .iter()
            .filter(|b| b.mechanic.as_ref().map_or(false, |m| m.id == mechanic_id))
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bookings
    }
}

/// Record lookup by id, `NotFound` when absent
pub fn find<'a, T: Listing>(records: &'a [T], id: &str) -> AppResult<&'a T> {
    find_by_key(records, id).ok_or_else(|| AppError::not_found(T::KIND, id))
}

fn unique_ids<T: Listing>(records: &[T]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for record in records {
        let key = record.record_key();
        if !seen.insert(key.clone()) {
            return Err(AppError::DuplicateId {
                kind: T::KIND,
                id: key,
            });
        }
    }
    Ok(())
}

/// Collection names accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Bookings,
    Mechanics,
    Workshops,
    Users,
    Transactions,
    Broadcasts,
    Notifications,
    Activity,
    Services,
}

impl Collection {
    pub const ALL: [Collection; 9] = [
        Collection::Bookings,
        Collection::Mechanics,
        Collection::Workshops,
        Collection::Users,
        Collection::Transactions,
        Collection::Broadcasts,
        Collection::Notifications,
        Collection::Activity,
        Collection::Services,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Bookings => "bookings",
            Collection::Mechanics => "mechanics",
            Collection::Workshops => "workshops",
            Collection::Users => "users",
            Collection::Transactions => "transactions",
            Collection::Broadcasts => "broadcasts",
            Collection::Notifications => "notifications",
            Collection::Activity => "activity",
            Collection::Services => "services",
        }
    }
}

impl FromStr for Collection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Collection::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| AppError::UnknownCollection(s.to_string()))
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
