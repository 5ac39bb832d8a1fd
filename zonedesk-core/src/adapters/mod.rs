//! In-process implementations of the collaborator traits

mod session;
mod static_auth;

pub use session::{InMemorySessionManager, StaticSessionManager};
pub use static_auth::{hash_password, StaticAuthenticator};
