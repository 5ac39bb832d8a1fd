//! Per-zone router.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use zonedesk_backend::{
    Outcome, Page, RecordError, RecordFilter, RecordId, RecordType, ResourceRecord,
    StoredRecord, WireRecord, Zone, ZoneBackend, ZoneBackendExt,
};

use super::{method_not_allowed, payload, RequestRouter};
use crate::error::{CoreError, CoreResult};
use crate::request::{Method, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneHandler {
    Records,
    Serial,
}

/// Routes `servers/{sysname}/zones/{zone}/...`. Default handler is `records`.
pub struct ZoneRouter {
    backend: Arc<dyn ZoneBackend>,
    zone: Zone,
    name: String,
}

impl ZoneRouter {
    #[must_use]
    pub fn new(backend: Arc<dyn ZoneBackend>, zone: Zone) -> Self {
        let name = format!("{}/{}", backend.sysname(), zone.name());
        Self {
            backend,
            zone,
            name,
        }
    }

    /// `records` or `records/{id}`
    async fn records(&self, request: &mut Request) -> CoreResult<Value> {
        let Some(id) = request.path.next_segment() else {
            return match request.method {
                Method::Get => self.list_records(request).await,
                Method::Put => self.add_record(request).await,
                _ => Err(method_not_allowed(request, "records")),
            };
        };
        let id = RecordId::from(id);

        match request.method {
            Method::Get => match self.backend.get_record_by_id(&self.zone, &id).await? {
                Outcome::Done(stored) => Ok(payload::record(&stored)),
                other => Err(self.record_failure(&id, other)),
            },
            Method::Post => {
                let record = self.record_from_params(request)?;
                match self.backend.record_update(&self.zone, &id, &record).await? {
                    Outcome::Done(()) => {
                        log::info!("[{}] Updated record {id}", self.name);
                        Ok(payload::record(&StoredRecord::new(id, record)))
                    }
                    other => Err(self.record_failure(&id, other)),
                }
            }
            Method::Delete => match self.backend.record_delete(&self.zone, &id).await? {
                Outcome::Done(()) => {
                    log::info!("[{}] Deleted record {id}", self.name);
                    Ok(json!({ "id": id, "deleted": true }))
                }
                other => Err(self.record_failure(&id, other)),
            },
            Method::Put => Err(method_not_allowed(request, "records/{id}")),
        }
    }

    async fn list_records(&self, request: &Request) -> CoreResult<Value> {
        let record_type = request
            .param_str("type")
            .map(|tag| {
                tag.parse::<RecordType>()
                    .map_err(|e| CoreError::InvalidParams(e.to_string()))
            })
            .transpose()?;
        let filter = RecordFilter {
            name: request.param_str("name"),
            record_type,
        };
        let page = Page::new(
            request.param_u32("offset")?.unwrap_or(0),
            request.param_u32("limit")?,
        );

        let records = self
            .backend
            .list_records_by_filter(&self.zone, &filter, page)
            .await?;
        Ok(payload::record_list(&records))
    }

    async fn add_record(&self, request: &Request) -> CoreResult<Value> {
        let record = self.record_from_params(request)?;
        match self.backend.record_add(&self.zone, &record).await? {
            Outcome::Done(id) => {
                log::info!(
                    "[{}] Added {} record {id}",
                    self.name,
                    record.record_type()
                );
                Ok(json!({ "id": id }))
            }
            Outcome::AlreadyExists => Err(CoreError::AlreadyExists(format!(
                "{} record {}",
                record.record_type(),
                record.name()
            ))),
            Outcome::NotFound => Err(CoreError::ZoneNotFound(self.zone.name().to_string())),
            Outcome::Rejected { message } => Err(CoreError::BackendRejected(message)),
        }
    }

    /// Build a record from `{ type, name, fields, ttl, priority? }`.
    fn record_from_params(&self, request: &Request) -> CoreResult<ResourceRecord> {
        let tag = request.required_str("type")?;
        let record_type: RecordType = tag
            .parse()
            .map_err(|e: RecordError| CoreError::InvalidParams(e.to_string()))?;
        if !self.backend.supports(record_type) {
            return Err(CoreError::InvalidParams(format!(
                "server {} does not support {record_type} records",
                self.backend.sysname()
            )));
        }

        let fields = match request.param("fields") {
            None => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                return Err(CoreError::InvalidParams(format!(
                    "parameter 'fields' must be an object, got {other}"
                )));
            }
        };
        let ttl = request
            .param_u32("ttl")?
            .ok_or_else(|| CoreError::InvalidParams("missing parameter 'ttl'".into()))?;

        let wire = WireRecord {
            record_type: record_type.as_str().to_string(),
            name: request.required_str("name")?,
            fields,
            ttl,
            priority: request.param_u16("priority")?,
        };
        Ok(ResourceRecord::from_wire(&wire)?)
    }

    fn record_failure<T>(&self, id: &RecordId, outcome: Outcome<T>) -> CoreError {
        match outcome {
            Outcome::Rejected { message } => CoreError::BackendRejected(message),
            _ => CoreError::RecordNotFound(format!("{id} in zone {}", self.zone.name())),
        }
    }

    /// `serial`: read or bump the SOA serial.
    async fn serial(&self, request: &Request) -> CoreResult<Value> {
        match request.method {
            Method::Get => match self.backend.current_serial(&self.zone).await? {
                Some(serial) => Ok(json!({ "serial": serial })),
                None => Err(CoreError::NotFound(format!(
                    "SOA record of zone {}",
                    self.zone.name()
                ))),
            },
            Method::Post => match self.backend.increment_serial(&self.zone).await? {
                Some(serial) => {
                    log::info!("[{}] Serial is now {serial}", self.name);
                    Ok(json!({ "serial": serial }))
                }
                None => Err(CoreError::SerialNotUpdated(self.zone.name().to_string())),
            },
            _ => Err(method_not_allowed(request, "serial")),
        }
    }
}

#[async_trait]
impl RequestRouter for ZoneRouter {
    type Handler = ZoneHandler;

    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, segment: &str) -> Option<ZoneHandler> {
        match segment {
            "records" => Some(ZoneHandler::Records),
            "serial" => Some(ZoneHandler::Serial),
            _ => None,
        }
    }

    fn default_handler(&self) -> Option<ZoneHandler> {
        Some(ZoneHandler::Records)
    }

    async fn invoke(&self, handler: ZoneHandler, request: &mut Request) -> CoreResult<Value> {
        match handler {
            ZoneHandler::Records => self.records(request).await,
            ZoneHandler::Serial => self.serial(request).await,
        }
    }
}
