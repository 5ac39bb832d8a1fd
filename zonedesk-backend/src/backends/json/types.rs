//! JSON zone API payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{ResourceRecord, WireRecord};

/// Response envelope shared by every endpoint.
///
/// `zones` and `records` are objects keyed by zone name / record id. Servers
/// that serialize an empty collection as `[]` are accepted too.
#[derive(Debug, Deserialize)]
pub struct JsonEnvelope {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub zones: Option<Value>,
    #[serde(default)]
    pub records: Option<Value>,
    #[serde(default)]
    pub record: Option<Value>,
}

impl JsonEnvelope {
    /// Server-provided failure message, or `fallback`.
    pub fn error_message(&self, fallback: &str) -> String {
        self.error
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Split a keyed collection into `(key, value)` pairs, keeping server order.
///
/// Arrays are accepted when each element carries its key in `key_field`.
pub fn keyed_entries(
    collection: Option<Value>,
    key_field: &str,
) -> Result<Vec<(String, Value)>, String> {
    match collection {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(map)) => Ok(map.into_iter().collect()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| {
                let key = match item.get(key_field) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    _ => return Err(format!("collection entry without '{key_field}'")),
                };
                Ok((key, item))
            })
            .collect(),
        Some(other) => Err(format!("expected object, got {other}")),
    }
}

/// Body of `PUT .../zones`.
#[derive(Debug, Serialize)]
pub struct ZoneBody<'a> {
    pub name: &'a str,
}

/// Body of record create/update requests.
#[derive(Debug, Serialize)]
pub struct RecordBody {
    #[serde(flatten)]
    pub record: WireRecord,
    /// Zone-file style rendering for servers that store RDATA as text.
    pub content: String,
}

impl From<&ResourceRecord> for RecordBody {
    fn from(record: &ResourceRecord) -> Self {
        Self {
            record: record.to_wire(),
            content: record.content_string(),
        }
    }
}
