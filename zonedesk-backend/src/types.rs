use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use serde::{Deserialize, Deserializer, Serialize};

use crate::record::ResourceRecord;
use crate::rrtypes::RecordType;
use crate::traits::ZoneBackend;

// ============ Zone ============

/// Handle on one zone of one backend.
///
/// Holds only a weak reference to its backend: a zone never keeps a backend
/// alive. Equality, hashing and ordering use the zone name only.
#[derive(Clone)]
pub struct Zone {
    name: String,
    backend: Weak<dyn ZoneBackend>,
}

impl Zone {
    pub fn new(name: impl Into<String>, backend: Weak<dyn ZoneBackend>) -> Self {
        Self {
            name: name.into(),
            backend,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning backend, or `None` once it has been dropped.
    pub fn backend(&self) -> Option<Arc<dyn ZoneBackend>> {
        self.backend.upgrade()
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zone")
            .field("name", &self.name)
            .field("backend_alive", &(self.backend.strong_count() > 0))
            .finish()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Zone {}

impl Hash for Zone {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Zone {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Zone {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

// ============ Records ============

/// Opaque record identifier assigned by a backend.
///
/// Remote APIs send ids as JSON strings or numbers; both decode to the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

/// A record together with the id its backend stores it under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: ResourceRecord,
}

impl StoredRecord {
    pub fn new(id: impl Into<RecordId>, record: ResourceRecord) -> Self {
        Self {
            id: id.into(),
            record,
        }
    }
}

// ============ Queries ============

/// Record listing filter. An absent criterion matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<RecordType>,
}

impl RecordFilter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            record_type: None,
        }
    }

    pub fn by_type(record_type: RecordType) -> Self {
        Self {
            name: None,
            record_type: Some(record_type),
        }
    }

    /// Whether `record` satisfies every present criterion.
    pub fn matches(&self, record: &ResourceRecord) -> bool {
        self.name.as_deref().is_none_or(|n| n == record.name())
            && self
                .record_type
                .is_none_or(|t| t == record.record_type())
    }
}

/// Offset/limit window over a listing.
///
/// # Default
///
/// `offset = 0`, no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub offset: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Page {
    pub fn new(offset: u32, limit: Option<u32>) -> Self {
        Self { offset, limit }
    }

    /// Apply the window to an already materialized listing.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skipped = items.into_iter().skip(self.offset as usize);
        match self.limit {
            Some(limit) => skipped.take(limit as usize).collect(),
            None => skipped.collect(),
        }
    }
}

// ============ Capabilities ============

/// What a backend declares it supports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendFeatures {
    pub dnssec: bool,
    pub rrtypes: BTreeSet<RecordType>,
}

impl BackendFeatures {
    /// Every registered record type, DNSSEC enabled.
    pub fn full() -> Self {
        Self {
            dnssec: true,
            rrtypes: RecordType::ALL.into_iter().collect(),
        }
    }
}

// ============ Outcomes ============

/// A backend's own answer to an operation.
///
/// Transport failures are not outcomes; they are
/// [`BackendError`](crate::BackendError)s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The operation took effect.
    Done(T),
    /// The addressed zone or record does not exist.
    NotFound,
    /// The zone or record to be created already exists.
    AlreadyExists,
    /// The backend refused the operation.
    Rejected { message: String },
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// The value of a `Done` outcome.
    pub fn done(self) -> Option<T> {
        match self {
            Self::Done(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Done(value) => Outcome::Done(f(value)),
            Self::NotFound => Outcome::NotFound,
            Self::AlreadyExists => Outcome::AlreadyExists,
            Self::Rejected { message } => Outcome::Rejected { message },
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    #[cfg(feature = "memory")]
    fn dangling() -> Weak<dyn ZoneBackend> {
        Weak::<crate::backends::memory::MemoryZoneBackend>::new()
    }

    #[cfg(feature = "memory")]
    #[test]
    fn zone_identity_is_name() {
        let a = Zone::new("example.com", dangling());
        let b = Zone::new("example.com", dangling());
        let c = Zone::new("example.org", dangling());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
        assert!(a.backend().is_none());
    }

    #[test]
    fn record_id_accepts_numbers_and_strings() {
        let a: RecordId = serde_json::from_str("42").unwrap();
        let b: RecordId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"42\"");
    }

    #[test]
    fn filter_matches_present_criteria_only() {
        let record = ResourceRecord::new(
            RecordType::A,
            "www",
            [("address", FieldValue::from("1.2.3.4"))],
            300,
            None,
        )
        .unwrap();
        assert!(RecordFilter::default().matches(&record));
        assert!(RecordFilter::by_name("www").matches(&record));
        assert!(!RecordFilter::by_name("mail").matches(&record));
        assert!(RecordFilter::by_type(RecordType::A).matches(&record));
        assert!(!RecordFilter::by_type(RecordType::Aaaa).matches(&record));
    }

    #[test]
    fn page_apply() {
        let items = 0..10;
        assert_eq!(Page::default().apply(items.clone()).len(), 10);
        assert_eq!(Page::new(8, None).apply(items.clone()), vec![8, 9]);
        assert_eq!(Page::new(2, Some(3)).apply(items.clone()), vec![2, 3, 4]);
        assert!(Page::new(20, Some(3)).apply(items).is_empty());
    }

    #[test]
    fn stored_record_flattens() {
        let record = ResourceRecord::new(
            RecordType::Txt,
            "@",
            [("text", FieldValue::from("hello"))],
            60,
            None,
        )
        .unwrap();
        let json = serde_json::to_value(StoredRecord::new("7", record)).unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["type"], "TXT");
        assert_eq!(json["fields"]["text"], "hello");
    }

    #[test]
    fn outcome_map_and_done() {
        let o: Outcome<u32> = Outcome::Done(1);
        assert_eq!(o.clone().map(|v| v + 1), Outcome::Done(2));
        assert_eq!(o.done(), Some(1));
        assert_eq!(Outcome::<u32>::rejected("no").done(), None);
    }
}
