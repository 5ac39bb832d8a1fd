use serde::{Deserialize, Serialize};

/// Transport-level failure raised by a zone backend.
///
/// A backend that *answers* (even with `success: false`) never produces one of
/// these; its answer is reported through [`Outcome`](crate::Outcome) instead.
/// A `BackendError` means the backend's true state is unknown and must be
/// escalated to the caller.
///
/// Each variant carries the `backend` identifier (the configured sysname) that
/// produced it.
///
/// # Retryable Errors
///
/// - [`NetworkError`](Self::NetworkError): connection refused, reset, 502–504
/// - [`Timeout`](Self::Timeout): request exceeded the configured timeout
/// - [`RateLimited`](Self::RateLimited): HTTP 429
///
/// The HTTP client retries these for idempotent requests only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum BackendError {
    /// A network-level error occurred.
    NetworkError {
        /// Backend that produced the error.
        backend: String,
        /// Error details.
        detail: String,
    },

    /// The request timed out.
    Timeout {
        /// Backend that produced the error.
        backend: String,
        /// Error details.
        detail: String,
    },

    /// The remote API asked us to slow down (HTTP 429).
    RateLimited {
        /// Backend that produced the error.
        backend: String,
        /// Suggested wait in seconds, from `Retry-After`.
        retry_after: Option<u64>,
        /// Response body, if any.
        raw_message: Option<String>,
    },

    /// The response body was not the JSON envelope we expected.
    ParseError {
        /// Backend that produced the error.
        backend: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// A request body could not be serialized.
    SerializationError {
        /// Backend that produced the error.
        backend: String,
        /// Details about the serialization failure.
        detail: String,
    },

    /// The backend returned a record that does not satisfy its type schema.
    InvalidRecord {
        /// Backend that produced the error.
        backend: String,
        /// Id of the offending record, when known.
        record_id: Option<String>,
        /// What the registry rejected.
        detail: String,
    },
}

impl BackendError {
    /// Whether retrying the same idempotent request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }

    /// Whether this is an expected operational condition rather than a fault.
    ///
    /// Expected errors are logged at `warn` level, the rest at `error`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::InvalidRecord { .. })
    }

    /// Identifier of the backend that produced the error.
    pub fn backend(&self) -> &str {
        match self {
            Self::NetworkError { backend, .. }
            | Self::Timeout { backend, .. }
            | Self::RateLimited { backend, .. }
            | Self::ParseError { backend, .. }
            | Self::SerializationError { backend, .. }
            | Self::InvalidRecord { backend, .. } => backend,
        }
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { backend, detail } => {
                write!(f, "[{backend}] Network error: {detail}")
            }
            Self::Timeout { backend, detail } => {
                write!(f, "[{backend}] Request timeout: {detail}")
            }
            Self::RateLimited {
                backend,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{backend}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{backend}] Rate limited")
                }
            }
            Self::ParseError { backend, detail } => {
                write!(f, "[{backend}] Parse error: {detail}")
            }
            Self::SerializationError { backend, detail } => {
                write!(f, "[{backend}] Serialization error: {detail}")
            }
            Self::InvalidRecord {
                backend,
                record_id,
                detail,
            } => match record_id {
                Some(id) => write!(f, "[{backend}] Invalid record '{id}': {detail}"),
                None => write!(f, "[{backend}] Invalid record: {detail}"),
            },
        }
    }
}

impl std::error::Error for BackendError {}

/// Convenience alias for `Result<T, BackendError>`.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Configuration that cannot produce a working backend adapter.
///
/// Raised once, when the adapter is instantiated. The caller treats it as fatal
/// for that backend only: the backend is skipped, the rest keep serving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ModuleConfigError {
    /// No adapter is registered under this module name (or its feature is off).
    UnknownModule {
        /// Module name from the configuration.
        module: String,
    },
    /// A required option is absent.
    MissingField {
        /// Module being configured.
        module: String,
        /// Option key.
        field: String,
    },
    /// A required option is present but blank.
    EmptyField {
        /// Module being configured.
        module: String,
        /// Option key.
        field: String,
    },
    /// An option has the wrong shape or an unusable value.
    InvalidFormat {
        /// Module being configured.
        module: String,
        /// Option key.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl std::fmt::Display for ModuleConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownModule { module } => write!(f, "Unknown zone module: {module}"),
            Self::MissingField { module, field } => {
                write!(f, "[{module}] Missing required option: {field}")
            }
            Self::EmptyField { module, field } => {
                write!(f, "[{module}] Option must not be empty: {field}")
            }
            Self::InvalidFormat {
                module,
                field,
                reason,
            } => write!(f, "[{module}] {field}: {reason}"),
        }
    }
}

impl std::error::Error for ModuleConfigError {}
