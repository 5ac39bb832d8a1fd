//! Zone backend implementations

#[cfg(feature = "json")]
pub mod json;
#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "json")]
pub use json::{JSON_MODULE, JsonBackendOptions, JsonZoneBackend};
#[cfg(feature = "memory")]
pub use memory::{MEMORY_MODULE, MemoryZoneBackend};
