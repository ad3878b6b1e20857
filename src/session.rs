//! Administrator session and its persistence
//!
//! Signing in is mocked: any well-formed email and non-empty password
//! produce the same super admin after a short delay. The session outlives
//! the process through a [`SessionStore`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};
use crate::models::Admin;

/// Key the admin record is stored under
pub const SESSION_KEY: &str = "as_admin_session";

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> AppResult<Option<Admin>>;
    async fn save(&self, admin: &Admin) -> AppResult<()>;
    async fn clear(&self) -> AppResult<()>;
}

/// Session kept for the lifetime of the process only
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    admin: RwLock<Option<Admin>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> AppResult<Option<Admin>> {
        Ok(self.admin.read().await.clone())
    }

    async fn save(&self, admin: &Admin) -> AppResult<()> {
        *self.admin.write().await = Some(admin.clone());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        *self.admin.write().await = None;
        Ok(())
    }
}

/// Session persisted as a small JSON key/value file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> AppResult<BTreeMap<String, serde_json::Value>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                AppError::Session(format!("corrupt session file {}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, serde_json::Value>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> AppResult<Option<Admin>> {
        let entries = self.read_entries().await?;
        match entries.get(SESSION_KEY) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| AppError::Session(format!("invalid session record: {}", e))),
            None => Ok(None),
        }
    }

    async fn save(&self, admin: &Admin) -> AppResult<()> {
        // A corrupt file is replaced rather than blocking sign-in
        let mut entries = self.read_entries().await.unwrap_or_default();
        entries.insert(SESSION_KEY.to_string(), serde_json::to_value(admin)?);
        self.write_entries(&entries).await?;
        debug!("Session saved to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        let mut entries = self.read_entries().await.unwrap_or_default();
        entries.remove(SESSION_KEY);
        if !entries.is_empty() {
            return self.write_entries(&entries).await;
        }
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Why a login form cannot be submitted yet
pub fn validate_credentials(email: &str, password: &str) -> Result<(), &'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required");
    }
    if !email.contains('@') {
        return Err("Enter a valid email address");
    }
    if password.is_empty() {
        return Err("Password is required");
    }
    Ok(())
}

/// Signed-in state shared by the admin screens
pub struct AuthSession {
    store: Arc<dyn SessionStore>,
    user: Option<Admin>,
    loading: bool,
}

impl AuthSession {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            user: None,
            loading: true,
        }
    }

    /// Restores a persisted session. An unreadable session counts as
    /// signed out.
    pub async fn init(&mut self) -> AppResult<()> {
        self.user = match self.store.load().await {
            Ok(user) => user,
            Err(AppError::Session(msg)) => {
                warn!("Ignoring stored session: {}", msg);
                None
            }
            Err(e) => return Err(e),
        };
        self.loading = false;
        if let Some(ref admin) = self.user {
            info!("Restored session for {}", admin.email);
        }
        Ok(())
    }

    pub fn user(&self) -> Option<&Admin> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Marks a sign-in as in flight; the caller runs the delay
    pub fn begin_login(&mut self) {
        self.loading = true;
    }

    /// Finishes a sign-in for `email` and persists it
    pub async fn complete_login(&mut self, email: &str) -> AppResult<Admin> {
        let admin = Admin::mock(email.trim());
        let saved = self.store.save(&admin).await;
        self.loading = false;
        saved?;
        info!("Admin {} signed in", admin.email);
        self.user = Some(admin.clone());
        Ok(admin)
    }

    /// Full sign-in including the simulated delay
    pub async fn login(&mut self, email: &str, delay: Duration) -> AppResult<Admin> {
        self.begin_login();
        tokio::time::sleep(delay).await;
        self.complete_login(email).await
    }

    pub async fn logout(&mut self) -> AppResult<()> {
        if let Some(admin) = self.user.take() {
            info!("Admin {} signed out", admin.email);
        }
        self.loading = false;
        self.store.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::new();
        assert!(store.load().await.unwrap().is_none());
        store.save(&Admin::mock("a@b.c")).await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap().id, "admin-1");
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_persists_under_session_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store = FileSessionStore::new(&path);

        assert!(store.load().await.unwrap().is_none());
        store.save(&Admin::mock("admin@autoservice.id")).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[SESSION_KEY]["role"], "super_admin");

        let reopened = FileSessionStore::new(&path);
        let admin = reopened.load().await.unwrap().unwrap();
        assert_eq!(admin.email, "admin@autoservice.id");

        reopened.clear().await.unwrap();
        assert!(!path.exists());
        assert!(reopened.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_session_file_is_signed_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ nope").unwrap();

        let mut session = AuthSession::new(Arc::new(FileSessionStore::new(&path)));
        session.init().await.unwrap();
        assert!(!session.is_authenticated());
        assert!(!session.is_loading());

        session.complete_login("x@y.z").await.unwrap();
        assert!(FileSessionStore::new(&path).load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let mut session = AuthSession::new(store.clone());
        session.init().await.unwrap();
        assert!(!session.is_authenticated());

        let admin = session
            .login(" admin@autoservice.id ", Duration::from_millis(5))
            .await
            .unwrap();
        assert_eq!(admin.name, "Super Admin");
        assert_eq!(admin.email, "admin@autoservice.id");
        assert!(session.is_authenticated());

        let mut restored = AuthSession::new(store.clone());
        restored.init().await.unwrap();
        assert_eq!(restored.user(), Some(&admin));

        session.logout().await.unwrap();
        assert!(!session.is_authenticated());
        assert!(store.load().await.unwrap().is_none());
    }

    #[test]
    fn test_validate_credentials() {
        assert_eq!(validate_credentials("", "pw"), Err("Email is required"));
        assert_eq!(
            validate_credentials("admin", "pw"),
            Err("Enter a valid email address")
        );
        assert_eq!(
            validate_credentials("admin@autoservice.id", ""),
            Err("Password is required")
        );
        assert!(validate_credentials("admin@autoservice.id", "secret").is_ok());
    }
}
