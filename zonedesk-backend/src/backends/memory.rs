//! In-process zone backend
//!
//! Keeps zones and records in memory. Record ids are sequential integers,
//! unique across all zones of one backend. Useful for local runs and as the
//! backend behind router tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::record::ResourceRecord;
use crate::traits::{Views, ZoneBackend, ZoneBackendExt};
use crate::types::{BackendFeatures, Outcome, Page, RecordFilter, RecordId, StoredRecord, Zone};

/// Module name used in configuration.
pub const MEMORY_MODULE: &str = "memory";

#[derive(Default)]
struct MemoryState {
    /// zone name -> records in insertion order
    zones: BTreeMap<String, Vec<StoredRecord>>,
    next_id: u64,
}

impl MemoryState {
    fn allocate_id(&mut self) -> RecordId {
        self.next_id += 1;
        RecordId::from(self.next_id)
    }
}

/// Configured view names.
struct StaticViews(Vec<String>);

#[async_trait]
impl Views for StaticViews {
    async fn list_views(&self) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Zone backend keeping everything in process memory.
pub struct MemoryZoneBackend {
    sysname: String,
    state: RwLock<MemoryState>,
    views: Option<StaticViews>,
    this: Weak<Self>,
}

impl MemoryZoneBackend {
    /// Backend without the views capability.
    pub fn new(sysname: impl Into<String>) -> Arc<Self> {
        Self::build(sysname.into(), None)
    }

    /// Backend with the views capability, serving `views`.
    pub fn with_views(sysname: impl Into<String>, views: Vec<String>) -> Arc<Self> {
        Self::build(sysname.into(), Some(StaticViews(views)))
    }

    fn build(sysname: String, views: Option<StaticViews>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            sysname,
            state: RwLock::new(MemoryState::default()),
            views,
            this: this.clone(),
        })
    }
}

#[async_trait]
impl ZoneBackend for MemoryZoneBackend {
    fn sysname(&self) -> &str {
        &self.sysname
    }

    fn module(&self) -> &'static str {
        MEMORY_MODULE
    }

    fn downgrade(&self) -> Weak<dyn ZoneBackend> {
        self.this.clone()
    }

    fn features(&self) -> BackendFeatures {
        BackendFeatures::full()
    }

    fn views(&self) -> Option<&dyn Views> {
        self.views.as_ref().map(|v| v as &dyn Views)
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let state = self.state.read().await;
        Ok(state.zones.keys().map(|name| self.zone(name)).collect())
    }

    async fn zone_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state.read().await.zones.contains_key(name))
    }

    async fn zone_create(&self, name: &str) -> Result<Outcome<Zone>> {
        if name.is_empty() {
            return Ok(Outcome::rejected("zone name must not be empty"));
        }
        let mut state = self.state.write().await;
        if state.zones.contains_key(name) {
            return Ok(Outcome::AlreadyExists);
        }
        state.zones.insert(name.to_string(), Vec::new());
        log::debug!("[{}] Created zone {name}", self.sysname);
        Ok(Outcome::Done(self.zone(name)))
    }

    async fn zone_delete(&self, zone: &Zone) -> Result<Outcome<()>> {
        let mut state = self.state.write().await;
        Ok(match state.zones.remove(zone.name()) {
            Some(_) => Outcome::Done(()),
            None => Outcome::NotFound,
        })
    }

    async fn list_records_by_filter(
        &self,
        zone: &Zone,
        filter: &RecordFilter,
        page: Page,
    ) -> Result<Vec<StoredRecord>> {
        let state = self.state.read().await;
        let Some(records) = state.zones.get(zone.name()) else {
            return Ok(Vec::new());
        };
        Ok(page.apply(
            records
                .iter()
                .filter(|stored| filter.matches(&stored.record))
                .cloned(),
        ))
    }

    async fn get_record_by_id(&self, zone: &Zone, id: &RecordId) -> Result<Outcome<StoredRecord>> {
        let state = self.state.read().await;
        let found = state
            .zones
            .get(zone.name())
            .and_then(|records| records.iter().find(|stored| &stored.id == id));
        Ok(match found {
            Some(stored) => Outcome::Done(stored.clone()),
            None => Outcome::NotFound,
        })
    }

    async fn record_add(&self, zone: &Zone, record: &ResourceRecord) -> Result<Outcome<RecordId>> {
        let mut state = self.state.write().await;
        if !state.zones.contains_key(zone.name()) {
            return Ok(Outcome::NotFound);
        }
        let id = state.allocate_id();
        if let Some(records) = state.zones.get_mut(zone.name()) {
            records.push(StoredRecord::new(id.clone(), record.clone()));
        }
        Ok(Outcome::Done(id))
    }

    async fn record_update(
        &self,
        zone: &Zone,
        id: &RecordId,
        record: &ResourceRecord,
    ) -> Result<Outcome<()>> {
        let mut state = self.state.write().await;
        let slot = state
            .zones
            .get_mut(zone.name())
            .and_then(|records| records.iter_mut().find(|stored| &stored.id == id));
        Ok(match slot {
            Some(stored) => {
                stored.record = record.clone();
                Outcome::Done(())
            }
            None => Outcome::NotFound,
        })
    }

    async fn record_delete(&self, zone: &Zone, id: &RecordId) -> Result<Outcome<()>> {
        let mut state = self.state.write().await;
        let Some(records) = state.zones.get_mut(zone.name()) else {
            return Ok(Outcome::NotFound);
        };
        let before = records.len();
        records.retain(|stored| &stored.id != id);
        Ok(if records.len() < before {
            Outcome::Done(())
        } else {
            Outcome::NotFound
        })
    }
}
