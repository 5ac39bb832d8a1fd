//! `ZoneBackend` implementation for the JSON zone API

use std::sync::Weak;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::{BackendError, Result};
use crate::record::{ResourceRecord, WireRecord};
use crate::rrtypes::PRIORITY_FIELD;
use crate::traits::{ZoneBackend, ZoneBackendExt};
use crate::types::{BackendFeatures, Outcome, Page, RecordFilter, RecordId, StoredRecord, Zone};

use super::types::keyed_entries;
use super::{JSON_MODULE, JsonEnvelope, JsonZoneBackend, RecordBody, ZoneBody};

impl JsonZoneBackend {
    fn parse_error(&self, detail: impl ToString) -> BackendError {
        BackendError::ParseError {
            backend: self.sysname.clone(),
            detail: detail.to_string(),
        }
    }

    /// Decode one record value through the type registry.
    ///
    /// The top-level `priority` is only honoured when `fields` carries one;
    /// servers commonly send `"priority": 0` on every record.
    fn decode_record(&self, id: Option<&str>, value: Value) -> Result<ResourceRecord> {
        let invalid = |detail: String| BackendError::InvalidRecord {
            backend: self.sysname.clone(),
            record_id: id.map(str::to_string),
            detail,
        };
        let mut wire: WireRecord =
            serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
        if !wire.fields.contains_key(PRIORITY_FIELD) {
            wire.priority = None;
        }
        ResourceRecord::from_wire(&wire).map_err(|e| invalid(e.to_string()))
    }

    /// `Done(())` on success, `Rejected` with the server's message otherwise.
    fn acknowledge(envelope: &JsonEnvelope, action: &str) -> Outcome<()> {
        if envelope.success {
            Outcome::Done(())
        } else {
            Outcome::rejected(envelope.error_message(&format!("{action} failed")))
        }
    }
}

#[async_trait]
impl ZoneBackend for JsonZoneBackend {
    fn sysname(&self) -> &str {
        &self.sysname
    }

    fn module(&self) -> &'static str {
        JSON_MODULE
    }

    fn downgrade(&self) -> Weak<dyn ZoneBackend> {
        self.this.clone()
    }

    fn features(&self) -> BackendFeatures {
        BackendFeatures::full()
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let envelope = self.call(Method::GET, &self.zones_url()).await?;
        if !envelope.success {
            return Ok(Vec::new());
        }
        let entries = keyed_entries(envelope.zones, "name").map_err(|e| self.parse_error(e))?;
        Ok(entries
            .into_iter()
            .map(|(name, _)| self.zone(&name))
            .collect())
    }

    async fn zone_exists(&self, name: &str) -> Result<bool> {
        let zones = self.list_zones().await?;
        Ok(zones.iter().any(|z| z.name() == name))
    }

    async fn zone_create(&self, name: &str) -> Result<Outcome<Zone>> {
        if self.zone_exists(name).await? {
            return Ok(Outcome::AlreadyExists);
        }
        let envelope = self
            .call_with_body(Method::PUT, &self.zones_url(), &ZoneBody { name })
            .await?;
        Ok(Self::acknowledge(&envelope, "zone creation").map(|()| self.zone(name)))
    }

    async fn zone_delete(&self, zone: &Zone) -> Result<Outcome<()>> {
        let envelope = self
            .call(Method::DELETE, &self.zone_url(zone.name()))
            .await?;
        Ok(Self::acknowledge(&envelope, "zone deletion"))
    }

    async fn list_records_by_filter(
        &self,
        zone: &Zone,
        filter: &RecordFilter,
        page: Page,
    ) -> Result<Vec<StoredRecord>> {
        let url = self.records_query_url(zone.name(), filter, page);
        let envelope = self.call(Method::GET, &url).await?;
        if !envelope.success {
            return Ok(Vec::new());
        }
        keyed_entries(envelope.records, "id")
            .map_err(|e| self.parse_error(e))?
            .into_iter()
            .map(|(id, value)| {
                let record = self.decode_record(Some(&id), value)?;
                Ok(StoredRecord::new(id, record))
            })
            .collect()
    }

    async fn get_record_by_id(&self, zone: &Zone, id: &RecordId) -> Result<Outcome<StoredRecord>> {
        let envelope = self
            .call(Method::GET, &self.record_url(zone.name(), id))
            .await?;
        if !envelope.success {
            return Ok(Outcome::NotFound);
        }
        let value = envelope
            .record
            .ok_or_else(|| self.parse_error("response is missing 'record'"))?;
        let record = self.decode_record(Some(id.as_str()), value)?;
        Ok(Outcome::Done(StoredRecord::new(id.clone(), record)))
    }

    async fn record_add(&self, zone: &Zone, record: &ResourceRecord) -> Result<Outcome<RecordId>> {
        let envelope = self
            .call_with_body(
                Method::PUT,
                &self.records_url(zone.name()),
                &RecordBody::from(record),
            )
            .await?;
        if !envelope.success {
            return Ok(Outcome::rejected(envelope.error_message("record creation failed")));
        }
        let id = envelope
            .record
            .as_ref()
            .and_then(|r| r.get("id"))
            .cloned()
            .ok_or_else(|| self.parse_error("response is missing 'record.id'"))?;
        let id: RecordId = serde_json::from_value(id).map_err(|e| self.parse_error(e))?;
        log::debug!("[{}] Created record {id} in {zone}", self.sysname);
        Ok(Outcome::Done(id))
    }

    async fn record_update(
        &self,
        zone: &Zone,
        id: &RecordId,
        record: &ResourceRecord,
    ) -> Result<Outcome<()>> {
        let envelope = self
            .call_with_body(
                Method::POST,
                &self.record_url(zone.name(), id),
                &RecordBody::from(record),
            )
            .await?;
        Ok(Self::acknowledge(&envelope, "record update"))
    }

    async fn record_delete(&self, zone: &Zone, id: &RecordId) -> Result<Outcome<()>> {
        let envelope = self
            .call(Method::DELETE, &self.record_url(zone.name(), id))
            .await?;
        Ok(Self::acknowledge(&envelope, "record deletion"))
    }
}
