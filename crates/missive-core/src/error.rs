//! Error type shared by the core services.

use thiserror::Error;

/// Errors surfaced by [`crate::services::MessageService`].
///
/// "Not found" is deliberately absent: lookups return `Option` and the
/// caller decides how absence is reported.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller supplied input that breaks a content rule.
    /// Raised before any store mutation is attempted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Propagated from the SQLite store (connectivity, constraints, decoding).
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }
}
