use std::sync::Weak;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};

use crate::error::{BackendError, Result};
use crate::record::{FieldValue, ResourceRecord};
use crate::rrtypes::RecordType;
use crate::types::{BackendFeatures, Outcome, Page, RecordFilter, RecordId, StoredRecord, Zone};
use crate::utils::serial::next_serial;

/// Name of the SOA field holding the zone serial.
pub const SERIAL_FIELD: &str = "serial";

/// Views capability: the backend serves different record sets for the same
/// zone name to different query sources.
#[async_trait]
pub trait Views: Send + Sync {
    /// Names of the configured views.
    async fn list_views(&self) -> Result<Vec<String>>;
}

/// A DNS server that stores zones and records.
///
/// Implementors provide the primitives only. Everything that can be expressed
/// in terms of them lives in [`ZoneBackendExt`], which every backend gets for
/// free and never overrides.
///
/// Absence is not an error here: missing zones and records are reported
/// through [`Outcome`], `Option` or an empty listing. `Err` always means the
/// backend could not be reached or answered nonsense.
#[async_trait]
pub trait ZoneBackend: Send + Sync {
    /// Configured name of this backend instance.
    fn sysname(&self) -> &str;

    /// Adapter module name (`"json"`, `"memory"`).
    fn module(&self) -> &'static str;

    /// Weak handle on this backend, for building [`Zone`]s.
    fn downgrade(&self) -> Weak<dyn ZoneBackend>;

    /// Declared DNSSEC support and record types.
    fn features(&self) -> BackendFeatures;

    /// Views capability, if this backend has one.
    fn views(&self) -> Option<&dyn Views> {
        None
    }

    async fn list_zones(&self) -> Result<Vec<Zone>>;

    async fn zone_exists(&self, name: &str) -> Result<bool>;

    /// Create a zone. An existing zone yields [`Outcome::AlreadyExists`]
    /// without touching it.
    async fn zone_create(&self, name: &str) -> Result<Outcome<Zone>>;

    async fn zone_delete(&self, zone: &Zone) -> Result<Outcome<()>>;

    /// Records of `zone` matching `filter`, windowed by `page`, in backend order.
    async fn list_records_by_filter(
        &self,
        zone: &Zone,
        filter: &RecordFilter,
        page: Page,
    ) -> Result<Vec<StoredRecord>>;

    async fn get_record_by_id(&self, zone: &Zone, id: &RecordId) -> Result<Outcome<StoredRecord>>;

    async fn record_add(&self, zone: &Zone, record: &ResourceRecord) -> Result<Outcome<RecordId>>;

    async fn record_update(
        &self,
        zone: &Zone,
        id: &RecordId,
        record: &ResourceRecord,
    ) -> Result<Outcome<()>>;

    async fn record_delete(&self, zone: &Zone, id: &RecordId) -> Result<Outcome<()>>;
}

/// Operations derived from the [`ZoneBackend`] primitives.
#[async_trait]
pub trait ZoneBackendExt: ZoneBackend {
    /// Handle on zone `name` of this backend. Does not check existence.
    fn zone(&self, name: &str) -> Zone {
        Zone::new(name, self.downgrade())
    }

    async fn list_records(&self, zone: &Zone, page: Page) -> Result<Vec<StoredRecord>> {
        self.list_records_by_filter(zone, &RecordFilter::default(), page)
            .await
    }

    async fn list_records_by_name(
        &self,
        zone: &Zone,
        name: &str,
        page: Page,
    ) -> Result<Vec<StoredRecord>> {
        self.list_records_by_filter(zone, &RecordFilter::by_name(name), page)
            .await
    }

    async fn list_records_by_type(
        &self,
        zone: &Zone,
        record_type: RecordType,
        page: Page,
    ) -> Result<Vec<StoredRecord>> {
        self.list_records_by_filter(zone, &RecordFilter::by_type(record_type), page)
            .await
    }

    /// True only if the backend has the views capability *and* serves more
    /// than one distinct view.
    async fn has_views(&self) -> Result<bool> {
        Ok(distinct_views(self).await?.len() > 1)
    }

    /// Distinct view names, sorted, or nothing when
    /// [`has_views`](Self::has_views) is false.
    async fn view_names(&self) -> Result<Vec<String>> {
        let names = distinct_views(self).await?;
        if names.len() > 1 {
            Ok(names)
        } else {
            Ok(Vec::new())
        }
    }

    fn supports(&self, record_type: RecordType) -> bool {
        self.features().rrtypes.contains(&record_type)
    }

    /// Registered types this backend supports, in registry order.
    fn supported_types(&self) -> Vec<RecordType> {
        let features = self.features();
        RecordType::ALL
            .into_iter()
            .filter(|t| features.rrtypes.contains(t))
            .collect()
    }

    /// Serial of the zone's first SOA record.
    async fn current_serial(&self, zone: &Zone) -> Result<Option<u32>> {
        let soa = self
            .list_records_by_type(zone, RecordType::Soa, Page::default())
            .await?;
        Ok(soa
            .first()
            .and_then(|s| s.record.field(SERIAL_FIELD))
            .and_then(FieldValue::as_u64)
            .and_then(|n| u32::try_from(n).ok()))
    }

    /// Bump the SOA serial using today's local date.
    async fn increment_serial(&self, zone: &Zone) -> Result<Option<u32>> {
        self.increment_serial_on(zone, Local::now().date_naive())
            .await
    }

    /// Bump the SOA serial to `max(serial + 1, YYYYMMDD00)` for `date`.
    ///
    /// `Ok(None)` when the zone has no SOA record, the serial space is
    /// exhausted, or the backend did not accept the update.
    async fn increment_serial_on(&self, zone: &Zone, date: NaiveDate) -> Result<Option<u32>> {
        let soa = self
            .list_records_by_type(zone, RecordType::Soa, Page::default())
            .await?;
        let Some(stored) = soa.into_iter().next() else {
            log::warn!("[{}] Zone {zone} has no SOA record", self.sysname());
            return Ok(None);
        };

        let current = stored
            .record
            .field(SERIAL_FIELD)
            .and_then(FieldValue::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0);
        let Some(serial) = next_serial(current, date) else {
            log::warn!(
                "[{}] Serial of {zone} cannot be incremented past {current}",
                self.sysname()
            );
            return Ok(None);
        };

        let mut record = stored.record;
        record
            .set_field(SERIAL_FIELD, FieldValue::from(serial))
            .map_err(|e| BackendError::InvalidRecord {
                backend: self.sysname().to_string(),
                record_id: Some(stored.id.to_string()),
                detail: e.to_string(),
            })?;

        match self.record_update(zone, &stored.id, &record).await? {
            Outcome::Done(()) => {
                log::debug!("[{}] Serial of {zone}: {current} -> {serial}", self.sysname());
                Ok(Some(serial))
            }
            other => {
                log::warn!(
                    "[{}] SOA update for {zone} not applied: {other:?}",
                    self.sysname()
                );
                Ok(None)
            }
        }
    }
}

impl<T: ZoneBackend + ?Sized> ZoneBackendExt for T {}

async fn distinct_views<B: ZoneBackend + ?Sized>(backend: &B) -> Result<Vec<String>> {
    let Some(views) = backend.views() else {
        return Ok(Vec::new());
    };
    let mut names = views.list_views().await?;
    names.sort_unstable();
    names.dedup();
    Ok(names)
}
