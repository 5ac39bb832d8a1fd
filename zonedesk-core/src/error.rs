//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error types
pub use zonedesk_backend::{BackendError, ModuleConfigError, RecordError};

/// Core layer error type
///
/// Absence inside the backend interface is an `Outcome` or an empty listing;
/// it only becomes one of the `*NotFound` variants here, at the router edge.
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// No handler, backend or resource for this path
    #[error("Not found: {0}")]
    NotFound(String),

    /// Zone does not exist on the addressed backend
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// Record does not exist in the addressed zone
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// Zone or record to create already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Backend answered but refused the operation
    #[error("Backend rejected the operation: {0}")]
    BackendRejected(String),

    /// SOA serial could not be incremented
    #[error("Serial of zone {0} was not updated")]
    SerialNotUpdated(String),

    /// Handler does not support this method
    #[error("Method {method} not allowed on {resource}")]
    MethodNotAllowed { method: String, resource: String },

    /// Request parameters are missing or malformed
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Operation requires a logged-in user
    #[error("Please log in first")]
    NotAuthenticated,

    /// Authentication knows no such user
    #[error("No such user: {0}")]
    NoSuchUser(String),

    /// Configuration file is unreadable or inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend adapter could not be built from its configuration
    #[error("{0}")]
    ModuleConfig(#[from] ModuleConfigError),

    /// Record does not fit the type registry
    #[error("{0}")]
    Record(#[from] RecordError),

    /// Backend transport error (converting from library)
    #[error("{0}")]
    Backend(#[from] BackendError),
}

impl CoreError {
    /// Whether this is expected behaviour (bad input, missing resource) rather
    /// than a fault. Used to pick the log level.
    ///
    /// `warn` for `true`, `error` for `false`.
    /// **Update this method when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::NotFound(_)
            | Self::ZoneNotFound(_)
            | Self::RecordNotFound(_)
            | Self::AlreadyExists(_)
            | Self::BackendRejected(_)
            | Self::SerialNotUpdated(_)
            | Self::MethodNotAllowed { .. }
            | Self::InvalidParams(_)
            | Self::NotAuthenticated
            | Self::NoSuchUser(_)
            | Self::Record(_) => true,
            Self::Backend(e) => e.is_expected(),
            Self::Config(_) | Self::ModuleConfig(_) => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use zonedesk_backend::RecordType;

    #[test]
    fn display_messages() {
        assert_eq!(
            CoreError::ZoneNotFound("example.com".into()).to_string(),
            "Zone not found: example.com"
        );
        assert_eq!(
            CoreError::MethodNotAllowed {
                method: "PUT".into(),
                resource: "status".into(),
            }
            .to_string(),
            "Method PUT not allowed on status"
        );
        assert_eq!(CoreError::NotAuthenticated.to_string(), "Please log in first");
    }

    #[test]
    fn converts_library_errors() {
        let e: CoreError = RecordError::PriorityNotAllowed(RecordType::A).into();
        assert!(matches!(e, CoreError::Record(_)));
        assert!(e.is_expected());

        let e: CoreError = BackendError::NetworkError {
            backend: "main".into(),
            detail: "refused".into(),
        }
        .into();
        assert_eq!(e.to_string(), "[main] Network error: refused");
        assert!(!e.is_expected());
    }

    #[test]
    fn serializes_with_code() {
        let json = serde_json::to_value(CoreError::RecordNotFound("7".into())).unwrap();
        assert_eq!(json["code"], "RecordNotFound");
        assert_eq!(json["details"], "7");

        let json = serde_json::to_value(CoreError::NotAuthenticated).unwrap();
        assert_eq!(json["code"], "NotAuthenticated");
    }
}
