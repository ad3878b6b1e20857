//! Centralized configuration management for autoservice

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Alternative fixture file; the embedded set is used when unset
    pub fixtures_path: Option<PathBuf>,
    /// File holding the persisted admin session
    pub session_path: PathBuf,
    /// Rows per table page; each listing has its own default when unset
    pub page_size: Option<usize>,
    /// Simulated delays and UI timing
    pub timing: Timing,
}

/// Simulated delays and UI timing (milliseconds)
#[derive(Debug, Clone)]
pub struct Timing {
    /// Delay before a wizard submission completes
    pub submit_delay_ms: u64,
    /// Delay before a mock login completes
    pub login_delay_ms: u64,
    /// Toast lifetime
    pub toast_ms: u64,
    /// Terminal input poll interval
    pub tick_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            submit_delay_ms: 1500,
            login_delay_ms: 1500,
            toast_ms: 4000,
            tick_ms: 250,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fixtures_path: None,
            session_path: PathBuf::from("./.autoservice_session.json"),
            page_size: None,
            timing: Timing::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let fixtures_path = std::env::var("AUTOSERVICE_FIXTURES").ok().map(PathBuf::from);

        let session_path = std::env::var("AUTOSERVICE_SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.session_path);

        let timing = Timing {
            submit_delay_ms: parse_env_var("AUTOSERVICE_SUBMIT_DELAY_MS")?
                .unwrap_or(defaults.timing.submit_delay_ms),
            login_delay_ms: parse_env_var("AUTOSERVICE_LOGIN_DELAY_MS")?
                .unwrap_or(defaults.timing.login_delay_ms),
            toast_ms: parse_env_var("AUTOSERVICE_TOAST_MS")?.unwrap_or(defaults.timing.toast_ms),
            tick_ms: parse_env_var("AUTOSERVICE_TICK_MS")?.unwrap_or(defaults.timing.tick_ms),
        };

        Ok(Config {
            fixtures_path,
            session_path,
            page_size: parse_env_var("AUTOSERVICE_PAGE_SIZE")?.or(defaults.page_size),
            timing,
        })
    }

    /// Command-line fixture path wins over the environment
    pub fn with_fixtures(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.fixtures_path = path;
        }
        self
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.timing.submit_delay_ms)
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.timing.login_delay_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.timing.toast_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.timing.tick_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.page_size == Some(0) {
            return Err(anyhow::anyhow!("AUTOSERVICE_PAGE_SIZE must be greater than 0"));
        }
        if self.timing.tick_ms == 0 {
            return Err(anyhow::anyhow!("AUTOSERVICE_TICK_MS must be greater than 0"));
        }

        if let Some(ref path) = self.fixtures_path {
            if !path.is_file() {
                return Err(anyhow::anyhow!(
                    "Fixture file does not exist: {}",
                    path.display()
                ));
            }
        }

        // The session file is created on first login; its directory must be usable
        if let Some(parent) = self.session_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Cannot create session directory: {}", parent.display())
                })?;
            }
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.trim().parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.session_path, PathBuf::from("./.autoservice_session.json"));
        assert_eq!(config.page_size, None);
        assert_eq!(config.timing.submit_delay_ms, 1500);
        assert_eq!(config.login_delay(), Duration::from_millis(1500));
        assert_eq!(config.toast_duration(), Duration::from_secs(4));
        assert!(config.fixtures_path.is_none());
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        config.validate().unwrap();

        let zero_page = Config {
            page_size: Some(0),
            ..Config::default()
        };
        assert!(zero_page.validate().is_err());

        let missing = Config::default().with_fixtures(Some(PathBuf::from("/nonexistent/fx.json")));
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_with_fixtures_keeps_env_value_when_absent() {
        let mut config = Config::default();
        config.fixtures_path = Some(PathBuf::from("env.json"));
        let config = config.with_fixtures(None);
        assert_eq!(config.fixtures_path, Some(PathBuf::from("env.json")));
    }

    #[test]
    fn test_parse_env_var() {
        std::env::set_var("AUTOSERVICE_TEST_PARSE_OK", " 42 ");
        std::env::set_var("AUTOSERVICE_TEST_PARSE_BAD", "forty-two");
        assert_eq!(parse_env_var::<u64>("AUTOSERVICE_TEST_PARSE_OK").unwrap(), Some(42));
        assert!(parse_env_var::<u64>("AUTOSERVICE_TEST_PARSE_BAD").is_err());
        assert_eq!(parse_env_var::<u64>("AUTOSERVICE_TEST_PARSE_UNSET").unwrap(), None);
    }
}
