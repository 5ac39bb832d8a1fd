use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::rrtypes::{FieldSpec, PRIORITY_FIELD, RecordType};

/// A typed value stored in a record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer-typed fields (`uint8`, `uint16`, `uint32`).
    Integer(u64),
    /// Every other simple type.
    Text(String),
}

impl FieldValue {
    /// Integer content, if any.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Text content, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Integer(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        Self::Integer(n)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        Self::Integer(u64::from(n))
    }
}

impl From<u16> for FieldValue {
    fn from(n: u16) -> Self {
        Self::Integer(u64::from(n))
    }
}

/// A record that does not fit the type registry.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum RecordError {
    #[error("Unknown record type: {0}")]
    UnknownType(String),

    #[error("{record_type} schema is invalid: {detail}")]
    InvalidSchema {
        record_type: RecordType,
        detail: String,
    },

    #[error("{record_type} record is missing field '{field}'")]
    MissingField {
        record_type: RecordType,
        field: String,
    },

    #[error("{record_type} record does not declare field '{field}'")]
    UnexpectedField {
        record_type: RecordType,
        field: String,
    },

    #[error("{record_type} field '{field}' is invalid: {reason}")]
    InvalidValue {
        record_type: RecordType,
        field: String,
        reason: String,
    },

    #[error("{0} records do not carry a priority")]
    PriorityNotAllowed(RecordType),

    #[error("Record name must not be empty")]
    EmptyName,
}

/// One DNS resource record, validated against its type's schema.
///
/// Fields are kept in schema order. A `ResourceRecord` can only be obtained
/// through [`new`](Self::new) or [`from_wire`](Self::from_wire), so every
/// instance carries exactly the fields its type declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireRecord", into = "WireRecord")]
pub struct ResourceRecord {
    record_type: RecordType,
    name: String,
    fields: Vec<(&'static str, FieldValue)>,
    ttl: u32,
}

impl ResourceRecord {
    /// Build a record from a field mapping.
    ///
    /// `priority` fills (or overrides) the `priority` field for types that
    /// declare one and is rejected for every other type.
    pub fn new<I, K>(
        record_type: RecordType,
        name: impl Into<String>,
        fields: I,
        ttl: u32,
        priority: Option<u16>,
    ) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(RecordError::EmptyName);
        }

        let mut given: HashMap<String, FieldValue> =
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect();

        if let Some(priority) = priority {
            if !record_type.declares_priority() {
                return Err(RecordError::PriorityNotAllowed(record_type));
            }
            given.insert(PRIORITY_FIELD.to_string(), FieldValue::from(priority));
        }

        let schema = record_type.schema();
        let mut ordered = Vec::with_capacity(schema.len());
        for spec in schema {
            let value = given
                .remove(spec.name)
                .ok_or_else(|| RecordError::MissingField {
                    record_type,
                    field: spec.name.to_string(),
                })?;
            check_value(record_type, spec, &value)?;
            ordered.push((spec.name, value));
        }

        if let Some(extra) = given.into_keys().min() {
            return Err(RecordError::UnexpectedField {
                record_type,
                field: extra,
            });
        }

        Ok(Self {
            record_type,
            name,
            fields: ordered,
            ttl,
        })
    }

    /// Decode the backend-neutral wire form.
    ///
    /// Field values are coerced to their schema type first (so `"10"` is
    /// accepted for an integer field), then the usual construction rules apply.
    pub fn from_wire(wire: &WireRecord) -> Result<Self, RecordError> {
        let record_type: RecordType = wire.record_type.parse()?;
        let mut fields = Vec::with_capacity(wire.fields.len());
        for (key, raw) in &wire.fields {
            let spec = record_type
                .field(key)
                .ok_or_else(|| RecordError::UnexpectedField {
                    record_type,
                    field: key.clone(),
                })?;
            let value = spec
                .kind
                .coerce(raw)
                .ok_or_else(|| RecordError::InvalidValue {
                    record_type,
                    field: key.clone(),
                    reason: format!("expected {}, got {raw}", spec.kind),
                })?;
            fields.push((key.clone(), value));
        }
        Self::new(record_type, wire.name.clone(), fields, wire.ttl, wire.priority)
    }

    /// Encode to the wire form, iterating the schema rather than the record.
    pub fn to_wire(&self) -> WireRecord {
        let mut fields = Map::new();
        for spec in self.record_type.schema() {
            if let Some(value) = self.field(spec.name) {
                let json = match value {
                    FieldValue::Integer(n) => Value::from(*n),
                    FieldValue::Text(s) => Value::from(s.as_str()),
                };
                fields.insert(spec.name.to_string(), json);
            }
        }
        WireRecord {
            record_type: self.record_type.as_str().to_string(),
            name: self.name.clone(),
            fields,
            ttl: self.ttl,
            priority: self.priority(),
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Fields in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    /// Priority, for types whose schema declares one.
    pub fn priority(&self) -> Option<u16> {
        self.field(PRIORITY_FIELD)
            .and_then(FieldValue::as_u64)
            .and_then(|p| u16::try_from(p).ok())
    }

    /// Field values in schema order, space separated (zone file RDATA style).
    pub fn content_string(&self) -> String {
        self.fields
            .iter()
            .map(|(_, v)| v.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Replace the value of a declared field, re-validating it.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), RecordError> {
        let record_type = self.record_type;
        let spec = record_type
            .field(name)
            .ok_or_else(|| RecordError::UnexpectedField {
                record_type,
                field: name.to_string(),
            })?;
        check_value(record_type, spec, &value)?;
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        }
        Ok(())
    }
}

fn check_value(
    record_type: RecordType,
    spec: &FieldSpec,
    value: &FieldValue,
) -> Result<(), RecordError> {
    spec.kind
        .validate(value)
        .map_err(|reason| RecordError::InvalidValue {
            record_type,
            field: spec.name.to_string(),
            reason,
        })
}

/// Backend-neutral record representation:
/// `{ type, name, fields, ttl, priority? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    pub ttl: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

impl TryFrom<WireRecord> for ResourceRecord {
    type Error = RecordError;

    fn try_from(wire: WireRecord) -> Result<Self, Self::Error> {
        Self::from_wire(&wire)
    }
}

impl From<ResourceRecord> for WireRecord {
    fn from(record: ResourceRecord) -> Self {
        record.to_wire()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn a_record() -> ResourceRecord {
        ResourceRecord::new(
            RecordType::A,
            "www",
            [("address", FieldValue::from("1.2.3.4"))],
            3600,
            None,
        )
        .unwrap()
    }

    fn soa_fields(serial: u64) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("primary", "ns1.example.com.".into()),
            ("hostmaster", "hostmaster.example.com.".into()),
            ("serial", FieldValue::Integer(serial)),
            ("refresh", FieldValue::Integer(3600)),
            ("retry", FieldValue::Integer(900)),
            ("expire", FieldValue::Integer(604_800)),
            ("minimum", FieldValue::Integer(300)),
        ]
    }

    #[test]
    fn builds_a_record() {
        let r = a_record();
        assert_eq!(r.record_type(), RecordType::A);
        assert_eq!(r.name(), "www");
        assert_eq!(r.ttl(), 3600);
        assert_eq!(r.field("address"), Some(&FieldValue::from("1.2.3.4")));
        assert_eq!(r.priority(), None);
    }

    #[test]
    fn missing_field_is_rejected() {
        let res = ResourceRecord::new(
            RecordType::Mx,
            "@",
            [("exchange", FieldValue::from("mail.example.com."))],
            300,
            None,
        );
        assert_eq!(
            res,
            Err(RecordError::MissingField {
                record_type: RecordType::Mx,
                field: "priority".to_string(),
            })
        );
    }

    #[test]
    fn extra_field_is_rejected() {
        let res = ResourceRecord::new(
            RecordType::A,
            "www",
            [
                ("address", FieldValue::from("1.2.3.4")),
                ("comment", FieldValue::from("hi")),
            ],
            300,
            None,
        );
        assert!(matches!(
            res,
            Err(RecordError::UnexpectedField { ref field, .. }) if field == "comment"
        ));
    }

    #[test]
    fn invalid_value_is_rejected() {
        let res = ResourceRecord::new(
            RecordType::A,
            "www",
            [("address", FieldValue::from("not-an-ip"))],
            300,
            None,
        );
        assert!(matches!(res, Err(RecordError::InvalidValue { .. })));
    }

    #[test]
    fn empty_name_is_rejected() {
        let res = ResourceRecord::new(
            RecordType::A,
            "",
            [("address", FieldValue::from("1.2.3.4"))],
            300,
            None,
        );
        assert_eq!(res, Err(RecordError::EmptyName));
    }

    #[test]
    fn explicit_priority_fills_declared_field() {
        let r = ResourceRecord::new(
            RecordType::Mx,
            "@",
            [("exchange", FieldValue::from("mail.example.com."))],
            300,
            Some(10),
        )
        .unwrap();
        assert_eq!(r.priority(), Some(10));
        assert_eq!(r.fields().next().map(|(k, _)| k), Some("priority"));
    }

    #[test]
    fn explicit_priority_overrides_field() {
        let r = ResourceRecord::new(
            RecordType::Mx,
            "@",
            [
                ("priority", FieldValue::Integer(5)),
                ("exchange", FieldValue::from("mail.example.com.")),
            ],
            300,
            Some(20),
        )
        .unwrap();
        assert_eq!(r.priority(), Some(20));
    }

    #[test]
    fn explicit_priority_on_undeclared_type_is_rejected() {
        let res = ResourceRecord::new(
            RecordType::A,
            "www",
            [("address", FieldValue::from("1.2.3.4"))],
            300,
            Some(10),
        );
        assert_eq!(res, Err(RecordError::PriorityNotAllowed(RecordType::A)));
    }

    #[test]
    fn wire_form_follows_schema_order() {
        let r = ResourceRecord::new(RecordType::Soa, "@", soa_fields(1).into_iter().rev(), 86400, None)
            .unwrap();
        let wire = r.to_wire();
        let keys: Vec<_> = wire.fields.keys().cloned().collect();
        assert_eq!(
            keys,
            ["primary", "hostmaster", "serial", "refresh", "retry", "expire", "minimum"]
        );
        assert_eq!(wire.priority, None);
    }

    #[test]
    fn wire_round_trip_preserves_mx() {
        let r = ResourceRecord::new(
            RecordType::Mx,
            "@",
            [("exchange", FieldValue::from("mail.example.com."))],
            300,
            Some(10),
        )
        .unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["priority"], json!(10));
        assert_eq!(json["fields"]["priority"], json!(10));
        let back: ResourceRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
        assert_eq!(r.content_string(), "10 mail.example.com.");
    }

    #[test]
    fn from_wire_coerces_numeric_strings() {
        let wire: WireRecord = serde_json::from_value(json!({
            "type": "SRV",
            "name": "_sip._tcp",
            "fields": {"priority": "10", "weight": "5", "port": 5060, "target": "sip.example.com."},
            "ttl": 600
        }))
        .unwrap();
        let r = ResourceRecord::from_wire(&wire).unwrap();
        assert_eq!(r.priority(), Some(10));
        assert_eq!(r.field("port"), Some(&FieldValue::Integer(5060)));
    }

    #[test]
    fn from_wire_rejects_unknown_type() {
        let wire = WireRecord {
            record_type: "WKS".into(),
            name: "x".into(),
            fields: Map::new(),
            ttl: 1,
            priority: None,
        };
        assert_eq!(
            ResourceRecord::from_wire(&wire),
            Err(RecordError::UnknownType("WKS".into()))
        );
    }

    #[test]
    fn set_field_revalidates() {
        let mut r = ResourceRecord::new(RecordType::Soa, "@", soa_fields(7), 86400, None).unwrap();
        r.set_field("serial", FieldValue::Integer(8)).unwrap();
        assert_eq!(r.field("serial"), Some(&FieldValue::Integer(8)));
        assert!(r.set_field("serial", FieldValue::Integer(u64::MAX)).is_err());
        assert!(r.set_field("bogus", FieldValue::Integer(1)).is_err());
    }

    #[test]
    fn field_value_untagged_serde() {
        assert_eq!(serde_json::to_value(FieldValue::Integer(3)).unwrap(), json!(3));
        assert_eq!(serde_json::to_value(FieldValue::from("x")).unwrap(), json!("x"));
    }
}
