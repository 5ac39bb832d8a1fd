//! Request router chain: main → server → zone.
//!
//! Each router consumes at most one segment to pick a handler. Handlers may
//! read further segments as arguments and hand the rest of the path to a
//! nested router.

mod main_router;
mod payload;
mod server_router;
mod zone_router;

pub use main_router::{MainHandler, MainRouter};
pub use payload::error_payload;
pub use server_router::{ServerHandler, ServerRouter};
pub use zone_router::{ZoneHandler, ZoneRouter};

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::request::{Method, Request};

/// A router dispatching on the next path segment.
#[async_trait]
pub trait RequestRouter: Send + Sync {
    /// Handlers this router declares.
    type Handler: Copy + Debug + Send + Sync;

    /// Name used in log lines.
    fn name(&self) -> &str;

    /// Map a path segment to a handler.
    fn resolve(&self, segment: &str) -> Option<Self::Handler>;

    /// Handler for an empty path or an unmatched segment.
    fn default_handler(&self) -> Option<Self::Handler> {
        None
    }

    async fn invoke(&self, handler: Self::Handler, request: &mut Request) -> CoreResult<Value>;

    /// Dispatch `request` from its current cursor position.
    ///
    /// An unmatched segment stays consumed when the default handler takes
    /// over.
    async fn track(&self, request: &mut Request) -> CoreResult<Value> {
        let handler = match request.path.next_segment() {
            None => self.default_handler(),
            Some(segment) => self
                .resolve(&segment)
                .or_else(|| self.default_handler()),
        };
        let Some(handler) = handler else {
            let resolved = request.path.consumed().join("/");
            return Err(CoreError::NotFound(format!("/{resolved}")));
        };
        log::debug!(
            "[{}] {} {} -> {handler:?}",
            self.name(),
            request.method,
            request.path
        );
        self.invoke(handler, request).await
    }
}

pub(crate) fn method_not_allowed(request: &Request, resource: &str) -> CoreError {
    CoreError::MethodNotAllowed {
        method: request.method.to_string(),
        resource: resource.to_string(),
    }
}

/// Reject anything but GET.
pub(crate) fn require_get(request: &Request, resource: &str) -> CoreResult<()> {
    if request.method == Method::Get {
        Ok(())
    } else {
        Err(method_not_allowed(request, resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Probe {
        Alpha,
        Fallback,
    }

    struct ProbeRouter {
        with_default: bool,
    }

    #[async_trait]
    impl RequestRouter for ProbeRouter {
        type Handler = Probe;

        fn name(&self) -> &str {
            "probe"
        }

        fn resolve(&self, segment: &str) -> Option<Probe> {
            (segment == "alpha").then_some(Probe::Alpha)
        }

        fn default_handler(&self) -> Option<Probe> {
            self.with_default.then_some(Probe::Fallback)
        }

        async fn invoke(&self, handler: Probe, request: &mut Request) -> CoreResult<Value> {
            Ok(json!({
                "handler": format!("{handler:?}"),
                "rest": request.path.remaining(),
            }))
        }
    }

    async fn track(with_default: bool, path: &str) -> CoreResult<Value> {
        ProbeRouter { with_default }
            .track(&mut Request::get(path))
            .await
    }

    #[tokio::test]
    async fn empty_path_uses_default_handler() {
        let value = track(true, "").await.unwrap();
        assert_eq!(value["handler"], "Fallback");

        let res = track(false, "/").await;
        assert!(matches!(res, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn matched_segment_forwards_rest() {
        let value = track(false, "alpha/x/y").await.unwrap();
        assert_eq!(value, json!({"handler": "Alpha", "rest": ["x", "y"]}));
    }

    #[tokio::test]
    async fn unknown_segment_stays_consumed() {
        let value = track(true, "beta/x").await.unwrap();
        assert_eq!(value, json!({"handler": "Fallback", "rest": ["x"]}));

        let res = track(false, "beta/x").await;
        assert!(matches!(res, Err(CoreError::NotFound(p)) if p == "/beta"));
    }
}
