//! Test helpers
//!
//! Contexts wired with the in-memory backend and in-process collaborators.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use zonedesk_backend::MemoryZoneBackend;

use crate::adapters::{
    hash_password, InMemorySessionManager, StaticAuthenticator, StaticSessionManager,
};
use crate::context::RouterContext;
use crate::error::{CoreError, CoreResult};
use crate::traits::{
    Authenticator, BackendRegistry, InMemoryBackendRegistry, SessionManager,
};

// ===== UnavailableAuthenticator =====

/// Authenticator whose user store cannot be reached.
pub struct UnavailableAuthenticator;

#[async_trait]
impl Authenticator for UnavailableAuthenticator {
    async fn user_check_password(&self, _username: &str, _password: &str) -> CoreResult<bool> {
        Err(CoreError::Config("user store unavailable".into()))
    }
}

// ===== Contexts =====

/// `admin` / `secret`
pub fn admin_authenticator() -> Arc<dyn Authenticator> {
    Arc::new(StaticAuthenticator::new(BTreeMap::from([(
        "admin".to_string(),
        hash_password("secret"),
    )])))
}

async fn scratch_registry() -> Arc<dyn BackendRegistry> {
    let registry = InMemoryBackendRegistry::new();
    registry
        .register("scratch".into(), MemoryZoneBackend::new("scratch"))
        .await;
    Arc::new(registry)
}

pub async fn context_with(
    authenticator: Arc<dyn Authenticator>,
    session: Arc<dyn SessionManager>,
) -> Arc<RouterContext> {
    Arc::new(RouterContext::new(
        scratch_registry().await,
        authenticator,
        session,
    ))
}

/// Nobody logged in; login through `status` works for `admin`.
pub async fn logged_out_context() -> Arc<RouterContext> {
    context_with(admin_authenticator(), Arc::new(InMemorySessionManager::new())).await
}

/// `admin` permanently logged in.
pub async fn logged_in_context() -> Arc<RouterContext> {
    context_with(admin_authenticator(), Arc::new(StaticSessionManager::new("admin"))).await
}
