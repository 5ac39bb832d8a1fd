//! JSON shapes returned by handlers.

use serde_json::{json, Map, Value};

use zonedesk_backend::{RecordType, StoredRecord, Zone};

use crate::error::CoreError;

pub(crate) fn zone_list(zones: &[Zone]) -> Value {
    zones.iter().map(|z| json!({ "name": z.name() })).collect()
}

/// `{ id, type, name, fields, ttl, priority? }`
pub(crate) fn record(stored: &StoredRecord) -> Value {
    let wire = stored.record.to_wire();
    let mut out = Map::new();
    out.insert("id".into(), json!(stored.id));
    out.insert("type".into(), json!(wire.record_type));
    out.insert("name".into(), json!(wire.name));
    out.insert("fields".into(), Value::Object(wire.fields));
    out.insert("ttl".into(), json!(wire.ttl));
    if let Some(priority) = wire.priority {
        out.insert("priority".into(), json!(priority));
    }
    Value::Object(out)
}

pub(crate) fn record_list(records: &[StoredRecord]) -> Value {
    records.iter().map(record).collect()
}

pub(crate) fn type_tags(types: impl IntoIterator<Item = RecordType>) -> Value {
    types.into_iter().map(|t| json!(t.as_str())).collect()
}

/// `{ type, fields: { name: simple-type } }` in schema order.
pub(crate) fn rrtype(record_type: RecordType) -> Value {
    let fields: Map<String, Value> = record_type
        .schema()
        .iter()
        .map(|spec| (spec.name.to_string(), json!(spec.kind.as_str())))
        .collect();
    json!({ "type": record_type.as_str(), "fields": fields })
}

/// `{ error, code }` for a failed dispatch.
pub fn error_payload(err: &CoreError) -> Value {
    let code = serde_json::to_value(err)
        .ok()
        .and_then(|v| v.get("code").cloned())
        .unwrap_or(Value::Null);
    json!({ "error": err.to_string(), "code": code })
}
