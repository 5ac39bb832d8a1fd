//! Builds a [`RouterContext`] from a [`Configuration`].

use std::sync::Arc;

use zonedesk_backend::{create_backend, validate_registry};

use crate::adapters::{InMemorySessionManager, StaticAuthenticator, StaticSessionManager};
use crate::config::{AuthenticationConfig, AutologinConfig, Configuration};
use crate::context::RouterContext;
use crate::error::CoreResult;
use crate::traits::{
    Authenticator, BackendRegistry, InMemoryBackendRegistry, SessionManager,
};

/// Validate the record type registry, build every configured backend and
/// wire up authentication and session handling.
///
/// A backend whose options are rejected is logged and skipped; the others
/// stay available.
pub async fn build_context(config: &Configuration) -> CoreResult<RouterContext> {
    validate_registry()?;

    let registry = InMemoryBackendRegistry::new();
    let mut skipped = 0_usize;
    for (sysname, spec) in &config.zone {
        match create_backend(sysname, spec) {
            Ok(backend) => {
                log::debug!("[{sysname}] Registered {} backend", backend.module());
                registry.register(sysname.clone(), backend).await;
            }
            Err(e) => {
                skipped += 1;
                log::warn!("[{sysname}] Skipping backend: {e}");
            }
        }
    }
    log::info!(
        "Backend bootstrap complete: {} registered, {skipped} skipped",
        config.zone.len() - skipped
    );

    let AuthenticationConfig::Static { users } = &config.authentication;
    let authenticator: Arc<dyn Authenticator> = Arc::new(StaticAuthenticator::new(users.clone()));

    let session: Arc<dyn SessionManager> = match &config.autologin {
        AutologinConfig::Session => Arc::new(InMemorySessionManager::new()),
        AutologinConfig::Static { username } => Arc::new(StaticSessionManager::new(username)),
    };

    let registry: Arc<dyn BackendRegistry> = Arc::new(registry);
    Ok(RouterContext::new(registry, authenticator, session))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_backends_are_skipped() {
        let config = Configuration::from_toml_str(
            r#"
[zone.broken]
module = "json"
api_base = ""
server_sysname = "ns1"

[zone.unknown]
module = "bind"

[zone.scratch]
module = "memory"
"#,
        )
        .unwrap();

        let context = build_context(&config).await.unwrap();
        let names: Vec<_> = context
            .backend_registry
            .list()
            .await
            .iter()
            .map(|b| b.sysname().to_string())
            .collect();
        assert_eq!(names, ["scratch"]);
        assert!(context.get_backend("broken").await.is_err());
    }

    #[tokio::test]
    async fn autologin_selects_session_manager() {
        let config = Configuration::from_toml_str(
            "[autologin]\nmodule = \"static\"\nusername = \"ops\"\n",
        )
        .unwrap();
        let context = build_context(&config).await.unwrap();
        assert_eq!(context.require_user().await.unwrap().username, "ops");

        let context = build_context(&Configuration::default()).await.unwrap();
        assert!(context.require_user().await.is_err());
    }
}
