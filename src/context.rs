//! Application-wide state handed to every screen

use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::fixtures::FixtureSet;
use crate::models::{SystemSettings, Workshop};
use crate::notifications::{Broadcasts, NotificationCenter};
use crate::session::{AuthSession, FileSessionStore, SessionStore};
use crate::wizard::WorkshopForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// Loaded data, the admin session and UI preferences. Edits made
/// through it live in memory only.
pub struct AppContext {
    pub config: Config,
    pub data: FixtureSet,
    pub session: AuthSession,
    pub notifications: NotificationCenter,
    pub broadcasts: Broadcasts,
    pub theme: Theme,
}

impl AppContext {
    /// Loads fixtures and restores any persisted session
    pub async fn init(config: Config) -> Result<Self> {
        let store = Arc::new(FileSessionStore::new(config.session_path.clone()));
        Self::init_with_store(config, store).await
    }

    pub async fn init_with_store(config: Config, store: Arc<dyn SessionStore>) -> Result<Self> {
        let data = FixtureSet::load(config.fixtures_path.as_deref())
            .context("Failed to load fixture data")?;
        let mut session = AuthSession::new(store);
        session
            .init()
            .await
            .context("Failed to restore admin session")?;

        info!(
            "Context ready: {} bookings, session {}",
            data.bookings.len(),
            if session.is_authenticated() { "restored" } else { "empty" }
        );

        Ok(Self {
            notifications: NotificationCenter::new(data.admin_notifications.clone()),
            broadcasts: Broadcasts::new(data.notifications.clone()),
            config,
            data,
            session,
            theme: Theme::default(),
        })
    }

    /// Signs out and forgets the persisted session
    pub async fn teardown(&mut self) -> AppResult<()> {
        self.session.logout().await
    }

    /// Reference "now" of the loaded data set
    pub fn now(&self) -> DateTime<Utc> {
        self.data.generated_at
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    /// Adds a workshop built from a completed form
    pub fn add_workshop(&mut self, form: WorkshopForm) -> &Workshop {
        let id = format!("ws-{}", Uuid::new_v4().simple());
        let workshop = form.into_workshop(id, Utc::now());
        info!("Registered workshop {} ({})", workshop.name, workshop.id);
        self.data.workshops.push(workshop);
        let last = self.data.workshops.len() - 1;
        &self.data.workshops[last]
    }

    pub fn update_workshop(&mut self, id: &str, form: &WorkshopForm) -> AppResult<()> {
        let workshop = self
            .data
            .workshops
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| AppError::not_found("Workshop", id))?;
        form.apply_to(workshop);
        info!("Updated workshop {}", id);
        Ok(())
    }

    /// Flips a user's blocked flag; returns the new value
    pub fn toggle_user_block(&mut self, id: &str) -> AppResult<bool> {
        let user = self
            .data
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::not_found("User", id))?;
        user.is_blocked = !user.is_blocked;
        info!(
            "User {} {}",
            user.id,
            if user.is_blocked { "blocked" } else { "unblocked" }
        );
        Ok(user.is_blocked)
    }

    pub fn save_settings(&mut self, settings: SystemSettings) {
        info!(?settings, "System settings saved");
        self.data.settings = settings;
    }

    /// Recipient count for a broadcast target
    pub fn audience_size(&self, target: crate::models::NotificationTarget) -> u64 {
        use crate::models::NotificationTarget::*;
        let users = self.data.users.len() as u64;
        let mechanics = self.data.mechanics.len() as u64;
        let workshops = self.data.workshops.len() as u64;
        match target {
            All => users + mechanics + workshops,
            Users => users,
            Mechanics => mechanics,
            Workshops => workshops,
        }
    }
}
