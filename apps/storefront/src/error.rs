//! # App Error Type
//!
//! The one error type the front end sees.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  ValidationError ─┐                                                     │
//! │  CoreError ───────┤                                                     │
//! │  DbError ─────────┼──► AppError { code, message } ──► CLI / views      │
//! │  RemoteError ─────┤                    │                                │
//! │  ConfigError ─────┘                    └──► Notifier (transient toast)  │
//! │                                                                         │
//! │  Storage internals are logged with tracing::error! and replaced by a   │
//! │  generic message; validation messages pass through verbatim.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use storefront_core::{CoreError, ValidationError};
use storefront_db::DbError;

use crate::remote::RemoteError;
use crate::state::config::ConfigError;

/// Error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_SIGNED_IN",
///   "message": "No user is signed in"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message, safe to show as-is
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed; nothing was sent anywhere
    ValidationError,

    /// Operation needs a session
    NotSignedIn,

    /// Wrong credentials or bad token
    AuthFailed,

    /// Signed in but not allowed
    Forbidden,

    /// Unique value already taken
    Conflict,

    /// A submission of the same form is still running
    Busy,

    /// Storage failed
    DatabaseError,

    /// An HTTP service failed or answered nonsense
    UpstreamError,

    /// Cart limits
    CartError,

    /// Bad configuration file or environment
    ConfigError,

    /// Anything else
    Internal,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }

    pub fn busy() -> Self {
        AppError::new(ErrorCode::Busy, "A submission is already in progress")
    }
}

/// Converts storage errors. Internals are logged, not shown.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => AppError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                AppError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Serialization(e) => {
                tracing::error!("Stored document is malformed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Stored data is malformed")
            }
            DbError::ConnectionFailed(e) | DbError::MigrationFailed(e) => {
                tracing::error!("Database unavailable: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database unavailable")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                tracing::error!("Database operation failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => AppError::not_found("Product", &id),
            CoreError::AddressNotFound(_) => {
                AppError::new(ErrorCode::NotFound, "Address not found")
            }
            CoreError::CartTooLarge { .. } | CoreError::QuantityTooLarge { .. } => {
                AppError::new(ErrorCode::CartError, err.to_string())
            }
            CoreError::Validation(e) => AppError::from(e),
        }
    }
}

impl From<RemoteError> for AppError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotSignedIn => AppError::new(ErrorCode::NotSignedIn, err.to_string()),
            RemoteError::Forbidden(_) => AppError::new(ErrorCode::Forbidden, err.to_string()),
            RemoteError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            RemoteError::AddressNotFound => AppError::new(ErrorCode::NotFound, err.to_string()),
            RemoteError::InvalidCredentials
            | RemoteError::InvalidResetToken
            | RemoteError::Session(_) => AppError::new(ErrorCode::AuthFailed, err.to_string()),
            RemoteError::EmailInUse(_) => AppError::new(ErrorCode::Conflict, err.to_string()),
            RemoteError::Validation(e) => AppError::from(e),
            RemoteError::Storage(e) => AppError::from(e),
            RemoteError::Http(ref e) => {
                tracing::error!(error = %e, "HTTP request failed");
                AppError::new(ErrorCode::UpstreamError, err.to_string())
            }
            RemoteError::Api { .. } | RemoteError::Parse(_) => {
                tracing::error!(error = %err, "Remote service failed");
                AppError::new(ErrorCode::UpstreamError, err.to_string())
            }
            RemoteError::Io(ref e) => {
                tracing::error!(error = %e, "I/O failed");
                AppError::internal(err.to_string())
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_signed_in_keeps_message() {
        let err = AppError::from(RemoteError::NotSignedIn);
        assert_eq!(err.code, ErrorCode::NotSignedIn);
        assert_eq!(err.message, "No user is signed in");
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = AppError::from(ValidationError::required("City"));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "City is required");
    }

    #[test]
    fn test_storage_internals_hidden() {
        let err = AppError::from(DbError::QueryFailed("near \"SELEC\": syntax error".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_value(AppError::busy()).unwrap();
        assert_eq!(json["code"], "BUSY");
    }
}
