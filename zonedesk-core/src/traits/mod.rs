//! Collaborator abstractions consumed by the router chain

mod authenticator;
mod backend_registry;
mod session;

pub use authenticator::Authenticator;
pub use backend_registry::{BackendRegistry, InMemoryBackendRegistry};
pub use session::{SessionManager, User};
