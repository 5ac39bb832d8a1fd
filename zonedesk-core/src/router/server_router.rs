//! Per-backend router.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use zonedesk_backend::{Outcome, ZoneBackend, ZoneBackendExt};

use super::{method_not_allowed, payload, require_get, RequestRouter, ZoneRouter};
use crate::error::{CoreError, CoreResult};
use crate::request::{Method, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerHandler {
    RrTypes,
    Features,
    Views,
    Zones,
}

/// Routes `servers/{sysname}/...`. Default handler is `zones`.
pub struct ServerRouter {
    backend: Arc<dyn ZoneBackend>,
}

impl ServerRouter {
    #[must_use]
    pub fn new(backend: Arc<dyn ZoneBackend>) -> Self {
        Self { backend }
    }

    async fn features(&self) -> CoreResult<Value> {
        let features = self.backend.features();
        Ok(json!({
            "dnssec": features.dnssec,
            "rrtypes": payload::type_tags(self.backend.supported_types()),
            "views": self.backend.has_views().await?,
        }))
    }

    async fn zone_list(&self) -> CoreResult<Value> {
        let zones = self.backend.list_zones().await?;
        Ok(payload::zone_list(&zones))
    }

    /// `zones` or `zones/{zone}/...`
    async fn zones(&self, request: &mut Request) -> CoreResult<Value> {
        let Some(name) = request.path.next_segment() else {
            match request.method {
                Method::Get => {}
                Method::Put => self.create_zone(request).await?,
                _ => return Err(method_not_allowed(request, "zones")),
            }
            return self.zone_list().await;
        };

        if request.method == Method::Delete && request.path.is_exhausted() {
            let zone = self.backend.zone(&name);
            match self.backend.zone_delete(&zone).await? {
                Outcome::Done(()) => {
                    log::info!("[{}] Deleted zone {name}", self.backend.sysname());
                }
                Outcome::NotFound => return Err(CoreError::ZoneNotFound(name)),
                Outcome::AlreadyExists => {
                    return Err(CoreError::BackendRejected(format!("zone {name}")));
                }
                Outcome::Rejected { message } => return Err(CoreError::BackendRejected(message)),
            }
            return self.zone_list().await;
        }

        if !self.backend.zone_exists(&name).await? {
            return Err(CoreError::ZoneNotFound(name));
        }
        ZoneRouter::new(self.backend.clone(), self.backend.zone(&name))
            .track(request)
            .await
    }

    async fn create_zone(&self, request: &Request) -> CoreResult<()> {
        let name = request.required_str("zonename")?;
        match self.backend.zone_create(&name).await? {
            Outcome::Done(zone) => {
                log::info!("[{}] Created zone {zone}", self.backend.sysname());
                Ok(())
            }
            Outcome::AlreadyExists => Err(CoreError::AlreadyExists(format!("zone {name}"))),
            Outcome::NotFound => Err(CoreError::BackendRejected(format!(
                "zone {name} could not be created"
            ))),
            Outcome::Rejected { message } => Err(CoreError::BackendRejected(message)),
        }
    }
}

#[async_trait]
impl RequestRouter for ServerRouter {
    type Handler = ServerHandler;

    fn name(&self) -> &str {
        self.backend.sysname()
    }

    fn resolve(&self, segment: &str) -> Option<ServerHandler> {
        match segment {
            "rrtypes" => Some(ServerHandler::RrTypes),
            "features" => Some(ServerHandler::Features),
            "views" => Some(ServerHandler::Views),
            "zones" => Some(ServerHandler::Zones),
            _ => None,
        }
    }

    fn default_handler(&self) -> Option<ServerHandler> {
        Some(ServerHandler::Zones)
    }

    async fn invoke(&self, handler: ServerHandler, request: &mut Request) -> CoreResult<Value> {
        match handler {
            ServerHandler::RrTypes => {
                require_get(request, "rrtypes")?;
                Ok(payload::type_tags(self.backend.supported_types()))
            }
            ServerHandler::Features => {
                require_get(request, "features")?;
                self.features().await
            }
            ServerHandler::Views => {
                require_get(request, "views")?;
                Ok(json!(self.backend.view_names().await?))
            }
            ServerHandler::Zones => self.zones(request).await,
        }
    }
}
