//! AutoService error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Failed to parse fixture data: {0}")]
    Fixtures(#[from] serde_json::Error),

    #[error("Duplicate {kind} id '{id}' in fixture data")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Unknown collection '{0}'. Expected one of: bookings, mechanics, workshops, users, transactions, broadcasts, notifications, activity, services")]
    UnknownCollection(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. })
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
