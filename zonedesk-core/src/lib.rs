//! zonedesk Core Library
//!
//! Request handling for DNS zone management on top of `zonedesk-backend`:
//! - Request model and the router chain (main → server → zone)
//! - Configuration file loading
//! - Backend registry and start-up wiring
//! - Authentication and session abstractions, with in-process implementations
//!
//! ```no_run
//! use std::sync::Arc;
//! use zonedesk_core::{build_context, Configuration, MainRouter, Request, RequestRouter};
//!
//! # async fn run() -> zonedesk_core::CoreResult<()> {
//! let config = Configuration::load("zonedesk.toml".as_ref())?;
//! let router = MainRouter::new(Arc::new(build_context(&config).await?));
//!
//! let mut request = Request::get("servers/main/zones");
//! let zones = router.track(&mut request).await?;
//! println!("{zones}");
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod bootstrap;
pub mod config;
pub mod context;
pub mod error;
pub mod request;
pub mod router;
pub mod traits;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use bootstrap::build_context;
pub use config::{ConfigError, Configuration};
pub use context::RouterContext;
pub use error::{CoreError, CoreResult};
pub use request::{Method, Request, RoutingPath};
pub use router::{error_payload, MainRouter, RequestRouter, ServerRouter, ZoneRouter};
pub use traits::{Authenticator, BackendRegistry, SessionManager, User};
