use thiserror::Error;
use tracing::error;

/// Error types for the office domain
#[derive(Error, Debug)]
pub enum OfficeError {
    /// Malformed or missing input, e.g. a blank username or a start date after the end date
    #[error("Validation error: {0}")]
    Validation(String),

    /// No session, unknown credentials or a disabled account
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Authenticated but not permitted to act on the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation clashes with existing state (duplicate check-in, taken username, decided request)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Password hashing failed
    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl OfficeError {
    pub fn validation(message: impl Into<String>) -> Self {
        OfficeError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        OfficeError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        OfficeError::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        OfficeError::Forbidden(message.into())
    }
}

impl From<argon2::password_hash::Error> for OfficeError {
    fn from(error: argon2::password_hash::Error) -> Self {
        let err = OfficeError::Crypto(error.to_string());
        error!(?err, "Password hashing failed");
        err
    }
}

/// Returns true when the database rejected a write because of a unique constraint.
///
/// SQLite and PostgreSQL report these differently, so the check falls back to the
/// driver message when the structured error is not available.
pub fn is_unique_violation(error: &sea_orm::DbErr) -> bool {
    if let Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) = error.sql_err() {
        return true;
    }
    let message = error.to_string().to_lowercase();
    message.contains("unique") || message.contains("duplicate")
}

/// Type alias for Result with OfficeError
pub type Result<T> = std::result::Result<T, OfficeError>;
