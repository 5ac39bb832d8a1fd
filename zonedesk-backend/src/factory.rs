//! Backend factory functions and module metadata.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModuleConfigError;
use crate::traits::ZoneBackend;

#[cfg(feature = "json")]
use crate::backends::{JSON_MODULE, JsonBackendOptions, JsonZoneBackend};
#[cfg(feature = "memory")]
use crate::backends::{MEMORY_MODULE, MemoryZoneBackend};
#[cfg(feature = "json")]
use crate::http_client::TransportPolicy;

/// Raw configuration of one backend: the adapter module plus its options.
///
/// Deserializes from a `[zone.<sysname>]` table such as
///
/// ```toml
/// module = "json"
/// api_base = "http://127.0.0.1:8080/api"
/// server_sysname = "ns1"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSpec {
    pub module: String,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl BackendSpec {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            options: Map::new(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }
}

/// Validated, typed backend configuration.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Remote JSON API. Requires feature `json`.
    #[cfg(feature = "json")]
    Json(JsonBackendOptions),
    /// In-process storage. Requires feature `memory`.
    #[cfg(feature = "memory")]
    Memory {
        /// View names; the views capability is only present when non-empty.
        views: Vec<String>,
    },
}

impl BackendConfig {
    /// Validate a [`BackendSpec`] for its module.
    pub fn from_spec(spec: &BackendSpec) -> Result<Self, ModuleConfigError> {
        match spec.module.as_str() {
            #[cfg(feature = "json")]
            JSON_MODULE => {
                let module = JSON_MODULE;
                let raw_base = required_str(module, &spec.options, "api_base")?;
                let api_base =
                    url::Url::parse(&raw_base).map_err(|e| ModuleConfigError::InvalidFormat {
                        module: module.to_string(),
                        field: "api_base".to_string(),
                        reason: e.to_string(),
                    })?;
                if !matches!(api_base.scheme(), "http" | "https") {
                    return Err(ModuleConfigError::InvalidFormat {
                        module: module.to_string(),
                        field: "api_base".to_string(),
                        reason: format!("unsupported scheme '{}'", api_base.scheme()),
                    });
                }
                let server_sysname = required_str(module, &spec.options, "server_sysname")?;

                let mut policy = TransportPolicy::default();
                if let Some(secs) = optional_u64(module, &spec.options, "timeout_secs")? {
                    policy.request_timeout = std::time::Duration::from_secs(secs);
                }
                if let Some(secs) = optional_u64(module, &spec.options, "connect_timeout_secs")? {
                    policy.connect_timeout = std::time::Duration::from_secs(secs);
                }
                if let Some(retries) = optional_u64(module, &spec.options, "max_retries")? {
                    policy.max_retries =
                        u32::try_from(retries).map_err(|_| ModuleConfigError::InvalidFormat {
                            module: module.to_string(),
                            field: "max_retries".to_string(),
                            reason: "value too large".to_string(),
                        })?;
                }

                Ok(Self::Json(JsonBackendOptions {
                    api_base,
                    server_sysname,
                    policy,
                }))
            }
            #[cfg(feature = "memory")]
            MEMORY_MODULE => Ok(Self::Memory {
                views: string_list(MEMORY_MODULE, &spec.options, "views")?,
            }),
            other => Err(ModuleConfigError::UnknownModule {
                module: other.to_string(),
            }),
        }
    }
}

fn required_str(
    module: &str,
    options: &Map<String, Value>,
    key: &str,
) -> Result<String, ModuleConfigError> {
    match options.get(key) {
        None => Err(ModuleConfigError::MissingField {
            module: module.to_string(),
            field: key.to_string(),
        }),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ModuleConfigError::EmptyField {
            module: module.to_string(),
            field: key.to_string(),
        }),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(other) => Err(ModuleConfigError::InvalidFormat {
            module: module.to_string(),
            field: key.to_string(),
            reason: format!("expected a string, got {other}"),
        }),
    }
}

#[cfg(feature = "json")]
fn optional_u64(
    module: &str,
    options: &Map<String, Value>,
    key: &str,
) -> Result<Option<u64>, ModuleConfigError> {
    match options.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| ModuleConfigError::InvalidFormat {
                module: module.to_string(),
                field: key.to_string(),
                reason: format!("expected a non-negative integer, got {value}"),
            }),
    }
}

#[cfg(feature = "memory")]
fn string_list(
    module: &str,
    options: &Map<String, Value>,
    key: &str,
) -> Result<Vec<String>, ModuleConfigError> {
    let invalid = || ModuleConfigError::InvalidFormat {
        module: module.to_string(),
        field: key.to_string(),
        reason: "expected a list of strings".to_string(),
    };
    match options.get(key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        Some(_) => Err(invalid()),
    }
}

/// Creates a [`ZoneBackend`] named `sysname` from its raw configuration.
///
/// The returned backend is wrapped in `Arc<dyn ZoneBackend>`; [`Zone`](crate::Zone)
/// handles created from it hold weak references to that allocation.
///
/// # Examples
///
/// ```rust
/// use zonedesk_backend::{create_backend, BackendSpec, ZoneBackend};
///
/// let backend = create_backend("scratch", &BackendSpec::new("memory")).unwrap();
/// assert_eq!(backend.module(), "memory");
/// ```
pub fn create_backend(
    sysname: &str,
    spec: &BackendSpec,
) -> Result<Arc<dyn ZoneBackend>, ModuleConfigError> {
    match BackendConfig::from_spec(spec)? {
        #[cfg(feature = "json")]
        BackendConfig::Json(options) => Ok(JsonZoneBackend::new(sysname, options)?),
        #[cfg(feature = "memory")]
        BackendConfig::Memory { views } if views.is_empty() => {
            Ok(MemoryZoneBackend::new(sysname))
        }
        #[cfg(feature = "memory")]
        BackendConfig::Memory { views } => Ok(MemoryZoneBackend::with_views(sysname, views)),
    }
}

/// One option a module accepts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOption {
    pub key: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Description of an available backend module.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMetadata {
    pub module: &'static str,
    pub description: &'static str,
    pub options: Vec<ModuleOption>,
}

/// Returns metadata for all backend modules enabled via feature flags.
pub fn available_modules() -> Vec<ModuleMetadata> {
    vec![
        #[cfg(feature = "json")]
        ModuleMetadata {
            module: JSON_MODULE,
            description: "Remote server speaking the JSON zone API",
            options: vec![
                ModuleOption {
                    key: "api_base",
                    required: true,
                    description: "Base URL of the API",
                },
                ModuleOption {
                    key: "server_sysname",
                    required: true,
                    description: "Server identifier on the remote side",
                },
                ModuleOption {
                    key: "timeout_secs",
                    required: false,
                    description: "Request timeout in seconds (default 30)",
                },
                ModuleOption {
                    key: "connect_timeout_secs",
                    required: false,
                    description: "Connect timeout in seconds (default 10)",
                },
                ModuleOption {
                    key: "max_retries",
                    required: false,
                    description: "Retries for GET/DELETE requests (default 2)",
                },
            ],
        },
        #[cfg(feature = "memory")]
        ModuleMetadata {
            module: MEMORY_MODULE,
            description: "Zones kept in process memory",
            options: vec![ModuleOption {
                key: "views",
                required: false,
                description: "View names served by this backend",
            }],
        },
    ]
}
