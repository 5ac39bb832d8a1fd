//! Top-level router.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use zonedesk_backend::{list_types, RecordType, SimpleType, ZoneBackend};

use super::{method_not_allowed, payload, require_get, RequestRouter, ServerRouter};
use crate::context::RouterContext;
use crate::error::{CoreError, CoreResult};
use crate::request::{Method, Request};
use crate::traits::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainHandler {
    RrTypes,
    SimpleTypes,
    Status,
    Servers,
}

/// Entry point of the router chain. Has no default handler.
pub struct MainRouter {
    context: Arc<RouterContext>,
}

impl MainRouter {
    #[must_use]
    pub fn new(context: Arc<RouterContext>) -> Self {
        Self { context }
    }

    /// `rrtypes` or `rrtypes/{TYPE}`
    fn rrtypes(request: &mut Request) -> CoreResult<Value> {
        require_get(request, "rrtypes")?;
        match request.path.next_segment() {
            None => Ok(payload::type_tags(list_types().iter().copied())),
            Some(tag) => {
                let record_type: RecordType = tag
                    .parse()
                    .map_err(|_| CoreError::NotFound(format!("record type '{tag}'")))?;
                Ok(payload::rrtype(record_type))
            }
        }
    }

    /// `simpletypes` or `simpletypes/{tag}`; POST checks a `value`.
    fn simpletypes(request: &mut Request) -> CoreResult<Value> {
        let Some(tag) = request.path.next_segment() else {
            require_get(request, "simpletypes")?;
            return Ok(SimpleType::ALL.iter().map(|t| json!(t.as_str())).collect());
        };
        let kind = SimpleType::from_tag(&tag)
            .ok_or_else(|| CoreError::NotFound(format!("simple type '{tag}'")))?;

        match request.method {
            Method::Get => Ok(json!({ "type": kind.as_str() })),
            Method::Post => {
                let raw = request
                    .param("value")
                    .ok_or_else(|| CoreError::InvalidParams("missing parameter 'value'".into()))?;
                let valid = kind
                    .coerce(raw)
                    .is_some_and(|value| kind.validate(&value).is_ok());
                Ok(json!({ "type": kind.as_str(), "value": raw, "valid": valid }))
            }
            _ => Err(method_not_allowed(request, "simpletypes")),
        }
    }

    /// `status`: login state, login and logout.
    async fn status(&self, request: &Request) -> CoreResult<Value> {
        match request.method {
            Method::Get => {}
            Method::Post => self.update_login(request).await?,
            _ => return Err(method_not_allowed(request, "status")),
        }

        Ok(match self.context.session.get_user().await {
            Some(user) => json!({ "loggedIn": true, "username": user.username }),
            None => json!({ "loggedIn": false }),
        })
    }

    async fn update_login(&self, request: &Request) -> CoreResult<()> {
        let Some(username) = request.param_str("username") else {
            return Ok(());
        };
        if username.is_empty() {
            self.context.session.notify_logout().await;
            return Ok(());
        }
        let Some(password) = request.param_str("password") else {
            return Ok(());
        };

        match self
            .context
            .authenticator
            .user_check_password(&username, &password)
            .await
        {
            Ok(true) => {
                self.context.session.notify_login(User::new(username)).await;
                Ok(())
            }
            Ok(false) => {
                log::warn!("Wrong password for user {username}");
                Ok(())
            }
            Err(CoreError::NoSuchUser(_)) => {
                log::warn!("Login attempt for unknown user {username}");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// `servers` or `servers/{sysname}/...`
    async fn servers(&self, request: &mut Request) -> CoreResult<Value> {
        self.context.require_user().await?;

        let Some(sysname) = request.path.next_segment() else {
            require_get(request, "servers")?;
            let backends = self.context.backend_registry.list().await;
            return Ok(backends
                .iter()
                .map(|b| json!({ "sysname": b.sysname(), "module": b.module() }))
                .collect());
        };

        let backend: Arc<dyn ZoneBackend> = self.context.get_backend(&sysname).await?;
        ServerRouter::new(backend).track(request).await
    }
}

#[async_trait]
impl RequestRouter for MainRouter {
    type Handler = MainHandler;

    fn name(&self) -> &str {
        "main"
    }

    fn resolve(&self, segment: &str) -> Option<MainHandler> {
        match segment {
            "rrtypes" => Some(MainHandler::RrTypes),
            "simpletypes" => Some(MainHandler::SimpleTypes),
            "status" => Some(MainHandler::Status),
            "servers" => Some(MainHandler::Servers),
            _ => None,
        }
    }

    async fn invoke(&self, handler: MainHandler, request: &mut Request) -> CoreResult<Value> {
        match handler {
            MainHandler::RrTypes => Self::rrtypes(request),
            MainHandler::SimpleTypes => Self::simpletypes(request),
            MainHandler::Status => self.status(request).await,
            MainHandler::Servers => self.servers(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySessionManager;
    use crate::test_utils::{
        context_with, logged_in_context, logged_out_context, UnavailableAuthenticator,
    };

    async fn dispatch(router: &MainRouter, request: Request) -> CoreResult<Value> {
        let mut request = request;
        router.track(&mut request).await
    }

    #[tokio::test]
    async fn empty_path_is_not_found() {
        let router = MainRouter::new(logged_in_context().await);
        let res = dispatch(&router, Request::get("/")).await;
        assert!(matches!(res, Err(CoreError::NotFound(_))));
        let res = dispatch(&router, Request::get("/nothing/here")).await;
        assert!(matches!(res, Err(CoreError::NotFound(p)) if p == "/nothing"));
    }

    #[tokio::test]
    async fn rrtypes_lists_and_describes() {
        let router = MainRouter::new(logged_out_context().await);

        let all = dispatch(&router, Request::get("rrtypes")).await.unwrap();
        assert_eq!(all.as_array().unwrap().len(), RecordType::ALL.len());
        assert_eq!(all[0], "A");

        let mx = dispatch(&router, Request::get("rrtypes/mx")).await.unwrap();
        assert_eq!(
            mx,
            json!({"type": "MX", "fields": {"priority": "uint16", "exchange": "hostname"}})
        );

        let res = dispatch(&router, Request::get("rrtypes/BOGUS")).await;
        assert!(matches!(res, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn simpletypes_validate_values() {
        let router = MainRouter::new(logged_out_context().await);

        let tags = dispatch(&router, Request::get("simpletypes")).await.unwrap();
        assert_eq!(tags.as_array().unwrap().len(), SimpleType::ALL.len());

        let ok = dispatch(
            &router,
            Request::post("simpletypes/ipv4").with_param("value", "192.0.2.1"),
        )
        .await
        .unwrap();
        assert_eq!(ok, json!({"type": "ipv4", "value": "192.0.2.1", "valid": true}));

        let bad = dispatch(
            &router,
            Request::post("simpletypes/uint8").with_param("value", "300"),
        )
        .await
        .unwrap();
        assert_eq!(bad["valid"], false);

        let res = dispatch(&router, Request::post("simpletypes/uint8")).await;
        assert!(matches!(res, Err(CoreError::InvalidParams(_))));
        let res = dispatch(&router, Request::get("simpletypes/colour")).await;
        assert!(matches!(res, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn status_login_and_logout() {
        let router = MainRouter::new(logged_out_context().await);

        let status = dispatch(&router, Request::get("status")).await.unwrap();
        assert_eq!(status, json!({"loggedIn": false}));

        let wrong = dispatch(
            &router,
            Request::post("status")
                .with_param("username", "admin")
                .with_param("password", "guess"),
        )
        .await
        .unwrap();
        assert_eq!(wrong["loggedIn"], false);

        let unknown = dispatch(
            &router,
            Request::post("status")
                .with_param("username", "mallory")
                .with_param("password", "secret"),
        )
        .await
        .unwrap();
        assert_eq!(unknown["loggedIn"], false);

        let login = dispatch(
            &router,
            Request::post("status")
                .with_param("username", "admin")
                .with_param("password", "secret"),
        )
        .await
        .unwrap();
        assert_eq!(login, json!({"loggedIn": true, "username": "admin"}));

        let logout = dispatch(&router, Request::post("status").with_param("username", ""))
            .await
            .unwrap();
        assert_eq!(logout, json!({"loggedIn": false}));

        let res = dispatch(&router, Request::delete("status")).await;
        assert!(matches!(res, Err(CoreError::MethodNotAllowed { .. })));
    }

    #[tokio::test]
    async fn status_propagates_authenticator_failure() {
        let context = context_with(
            Arc::new(UnavailableAuthenticator),
            Arc::new(InMemorySessionManager::new()),
        )
        .await;
        let router = MainRouter::new(context);
        let res = dispatch(
            &router,
            Request::post("status")
                .with_param("username", "admin")
                .with_param("password", "secret"),
        )
        .await;
        assert!(matches!(res, Err(CoreError::Config(_))));
    }

    #[tokio::test]
    async fn servers_require_login() {
        let router = MainRouter::new(logged_out_context().await);
        let res = dispatch(&router, Request::get("servers")).await;
        assert!(matches!(res, Err(CoreError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn servers_list_and_delegate() {
        let router = MainRouter::new(logged_in_context().await);

        let servers = dispatch(&router, Request::get("servers")).await.unwrap();
        assert_eq!(servers, json!([{"sysname": "scratch", "module": "memory"}]));

        let zones = dispatch(&router, Request::get("servers/scratch/zones"))
            .await
            .unwrap();
        assert_eq!(zones, json!([]));

        let res = dispatch(&router, Request::get("servers/elsewhere/zones")).await;
        assert!(matches!(res, Err(CoreError::NotFound(_))));
    }
}
