//! # zonedesk-backend
//!
//! Backend-agnostic DNS zone and record model, plus the adapters that store
//! zones on actual DNS servers.
//!
//! ## Supported Backends
//!
//! | Module | Feature Flag | Storage |
//! |--------|-------------|---------|
//! | `json` | `json` | Remote server speaking the JSON zone API over HTTP |
//! | `memory` | `memory` | Process memory |
//!
//! ## Feature Flags
//!
//! - **`all-backends`** *(default)*: Enable every backend listed above.
//! - **`json`** / **`memory`**: Enable a single backend.
//! - **`rustls`** *(default)* / **`native-tls`**: TLS implementation used by
//!   the JSON backend's HTTP client.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use zonedesk_backend::{
//!     create_backend, BackendSpec, FieldValue, Outcome, Page, RecordType, ResourceRecord,
//!     ZoneBackend, ZoneBackendExt,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let spec = BackendSpec::new("json")
//!         .with_option("api_base", "http://127.0.0.1:8080/api")
//!         .with_option("server_sysname", "ns1");
//!     let backend = create_backend("main", &spec)?;
//!
//!     let zone = match backend.zone_create("example.com").await? {
//!         Outcome::Done(zone) => zone,
//!         Outcome::AlreadyExists => backend.zone("example.com"),
//!         other => return Err(format!("zone not created: {other:?}").into()),
//!     };
//!
//!     let www = ResourceRecord::new(
//!         RecordType::A,
//!         "www",
//!         [("address", FieldValue::from("192.0.2.10"))],
//!         3600,
//!         None,
//!     )?;
//!     backend.record_add(&zone, &www).await?;
//!
//!     for stored in backend.list_records_by_type(&zone, RecordType::A, Page::default()).await? {
//!         println!("{} {} {}", stored.id, stored.record.name(), stored.record.content_string());
//!     }
//!
//!     if let Some(serial) = backend.increment_serial(&zone).await? {
//!         println!("serial is now {serial}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Operations the backend answered (a missing record, a refused update) come
//! back as [`Outcome`] values or empty listings. [`BackendError`] is reserved
//! for transport failures and unusable responses. [`BackendError::is_retryable`]
//! tells which of those the HTTP layer may retry.

mod backends;
mod error;
mod factory;
mod http_client;
mod record;
mod rrtypes;
mod traits;
mod types;
mod utils;

// Re-export public API

pub use error::{BackendError, ModuleConfigError, Result};

pub use traits::{SERIAL_FIELD, Views, ZoneBackend, ZoneBackendExt};

pub use types::{BackendFeatures, Outcome, Page, RecordFilter, RecordId, StoredRecord, Zone};

pub use record::{FieldValue, RecordError, ResourceRecord, WireRecord};

pub use rrtypes::{
    FieldSpec, PRIORITY_FIELD, RecordType, SimpleType, list_types, schema_of, validate_registry,
};

pub use factory::{
    BackendConfig, BackendSpec, ModuleMetadata, ModuleOption, available_modules, create_backend,
};

pub use http_client::TransportPolicy;

pub use utils::serial::{date_serial, next_serial};

#[cfg(feature = "json")]
pub use backends::{JSON_MODULE, JsonBackendOptions, JsonZoneBackend};
#[cfg(feature = "memory")]
pub use backends::{MEMORY_MODULE, MemoryZoneBackend};
