//! Router context: every dependency the router chain needs.

use std::sync::Arc;

use zonedesk_backend::ZoneBackend;

use crate::error::{CoreError, CoreResult};
use crate::traits::{Authenticator, BackendRegistry, SessionManager, User};

/// Holds the collaborators of one running instance.
///
/// Built once at start-up (see [`crate::bootstrap`]) and shared by `Arc`.
pub struct RouterContext {
    /// Configured backends
    pub backend_registry: Arc<dyn BackendRegistry>,
    /// Password checks
    pub authenticator: Arc<dyn Authenticator>,
    /// Current user
    pub session: Arc<dyn SessionManager>,
}

impl RouterContext {
    #[must_use]
    pub fn new(
        backend_registry: Arc<dyn BackendRegistry>,
        authenticator: Arc<dyn Authenticator>,
        session: Arc<dyn SessionManager>,
    ) -> Self {
        Self {
            backend_registry,
            authenticator,
            session,
        }
    }

    /// Get a backend by sysname
    pub async fn get_backend(&self, sysname: &str) -> CoreResult<Arc<dyn ZoneBackend>> {
        self.backend_registry
            .get(sysname)
            .await
            .ok_or_else(|| CoreError::NotFound(format!("server '{sysname}'")))
    }

    /// The logged-in user, or `NotAuthenticated`
    pub async fn require_user(&self) -> CoreResult<User> {
        self.session
            .get_user()
            .await
            .ok_or(CoreError::NotAuthenticated)
    }
}
