//! Resource record type registry.
//!
//! A read-only table from [`RecordType`] to its field schema. Every record is
//! built, validated and serialized through the schema of its type, so the
//! order and completeness of fields never depends on what a backend sent.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{FieldValue, RecordError};

/// Name of the field that carries the preference of MX/SRV-style records.
pub const PRIORITY_FIELD: &str = "priority";

/// Primitive value type a schema field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimpleType {
    /// Free text.
    Text,
    /// A DNS name, relative or absolute (`www`, `@`, `ns1.example.com.`).
    Hostname,
    /// A mailbox, either `user@example.com` or DNS form `user.example.com.`.
    Email,
    /// Dotted-quad IPv4 address.
    Ipv4,
    /// IPv6 address.
    Ipv6,
    /// Unsigned 8-bit integer.
    UInt8,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Unsigned 32-bit integer.
    UInt32,
}

impl SimpleType {
    /// All simple types, in presentation order.
    pub const ALL: [Self; 8] = [
        Self::Text,
        Self::Hostname,
        Self::Email,
        Self::Ipv4,
        Self::Ipv6,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
    ];

    /// Lower-case tag used on the wire and in schema listings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Hostname => "hostname",
            Self::Email => "email",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
        }
    }

    /// Look a simple type up by its tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(tag))
    }

    fn integer_max(self) -> Option<u64> {
        match self {
            Self::UInt8 => Some(u64::from(u8::MAX)),
            Self::UInt16 => Some(u64::from(u16::MAX)),
            Self::UInt32 => Some(u64::from(u32::MAX)),
            _ => None,
        }
    }

    /// Whether values of this type are integers.
    pub fn is_integer(self) -> bool {
        self.integer_max().is_some()
    }

    /// Check that `value` is acceptable for this type.
    pub fn validate(self, value: &FieldValue) -> Result<(), String> {
        match (self, value) {
            (_, FieldValue::Integer(n)) => match self.integer_max() {
                Some(max) if *n <= max => Ok(()),
                Some(max) => Err(format!("{n} exceeds {max}")),
                None => Err(format!("expected {}, got integer", self.as_str())),
            },
            (Self::Text, FieldValue::Text(_)) => Ok(()),
            (Self::Hostname, FieldValue::Text(s)) => validate_hostname(s),
            (Self::Email, FieldValue::Text(s)) => validate_mailbox(s),
            (Self::Ipv4, FieldValue::Text(s)) => s
                .parse::<Ipv4Addr>()
                .map(|_| ())
                .map_err(|_| format!("'{s}' is not an IPv4 address")),
            (Self::Ipv6, FieldValue::Text(s)) => s
                .parse::<Ipv6Addr>()
                .map(|_| ())
                .map_err(|_| format!("'{s}' is not an IPv6 address")),
            (_, FieldValue::Text(s)) => Err(format!("expected {}, got '{s}'", self.as_str())),
        }
    }

    /// Convert a loosely typed JSON value into a [`FieldValue`] of this type.
    ///
    /// Integers may arrive as JSON numbers or numeric strings (form-encoded
    /// clients send everything as text). Returns `None` when the value cannot
    /// be represented; range and syntax checks happen in [`validate`](Self::validate).
    pub fn coerce(self, raw: &Value) -> Option<FieldValue> {
        if self.is_integer() {
            match raw {
                Value::Number(n) => n.as_u64().map(FieldValue::Integer),
                Value::String(s) => s.trim().parse().ok().map(FieldValue::Integer),
                _ => None,
            }
        } else {
            match raw {
                Value::String(s) => Some(FieldValue::Text(s.clone())),
                Value::Number(n) => Some(FieldValue::Text(n.to_string())),
                _ => None,
            }
        }
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn validate_hostname(name: &str) -> Result<(), String> {
    if name == "@" {
        return Ok(());
    }
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    if trimmed.is_empty() || trimmed.len() > 253 {
        return Err(format!("'{name}' is not a valid hostname length"));
    }
    for label in trimmed.split('.') {
        let ok = !label.is_empty()
            && label.len() <= 63
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '*'));
        if !ok {
            return Err(format!("'{name}' contains an invalid label '{label}'"));
        }
    }
    Ok(())
}

fn validate_mailbox(mailbox: &str) -> Result<(), String> {
    match mailbox.split_once('@') {
        Some((local, domain)) => {
            if local.is_empty() || local.contains(char::is_whitespace) {
                return Err(format!("'{mailbox}' has an invalid local part"));
            }
            validate_hostname(domain)
        }
        None => validate_hostname(mailbox),
    }
}

/// One named, typed field of a record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name as it appears in `fields`.
    pub name: &'static str,
    /// Accepted value type.
    pub kind: SimpleType,
}

const fn field(name: &'static str, kind: SimpleType) -> FieldSpec {
    FieldSpec { name, kind }
}

use SimpleType::{Email, Hostname, Ipv4, Ipv6, Text, UInt8, UInt16, UInt32};

const SCHEMA_A: &[FieldSpec] = &[field("address", Ipv4)];
const SCHEMA_AAAA: &[FieldSpec] = &[field("address", Ipv6)];
const SCHEMA_AFSDB: &[FieldSpec] = &[field("subtype", UInt16), field("hostname", Hostname)];
const SCHEMA_CERT: &[FieldSpec] = &[
    field("certtype", UInt16),
    field("keytag", UInt16),
    field("algorithm", UInt8),
    field("certificate", Text),
];
const SCHEMA_CNAME: &[FieldSpec] = &[field("target", Hostname)];
const SCHEMA_DNSKEY: &[FieldSpec] = &[
    field("flags", UInt16),
    field("protocol", UInt8),
    field("algorithm", UInt8),
    field("publickey", Text),
];
const SCHEMA_DS: &[FieldSpec] = &[
    field("keytag", UInt16),
    field("algorithm", UInt8),
    field("digesttype", UInt8),
    field("digest", Text),
];
const SCHEMA_HINFO: &[FieldSpec] = &[field("cpu", Text), field("os", Text)];
const SCHEMA_KEY: &[FieldSpec] = &[
    field("flags", UInt16),
    field("protocol", UInt8),
    field("algorithm", UInt8),
    field("publickey", Text),
];
const SCHEMA_LOC: &[FieldSpec] = &[
    field("latitude", Text),
    field("longitude", Text),
    field("altitude", Text),
    field("size", Text),
    field("hprecision", Text),
    field("vprecision", Text),
];
const SCHEMA_MX: &[FieldSpec] = &[field(PRIORITY_FIELD, UInt16), field("exchange", Hostname)];
const SCHEMA_NAPTR: &[FieldSpec] = &[
    field("order", UInt16),
    field("preference", UInt16),
    field("flags", Text),
    field("service", Text),
    field("regexp", Text),
    field("replacement", Hostname),
];
const SCHEMA_NS: &[FieldSpec] = &[field("nameserver", Hostname)];
const SCHEMA_NSEC: &[FieldSpec] = &[field("next", Hostname), field("types", Text)];
const SCHEMA_NSEC3: &[FieldSpec] = &[
    field("algorithm", UInt8),
    field("flags", UInt8),
    field("iterations", UInt16),
    field("salt", Text),
    field("next", Text),
    field("types", Text),
];
const SCHEMA_PTR: &[FieldSpec] = &[field("target", Hostname)];
const SCHEMA_RP: &[FieldSpec] = &[field("mailbox", Email), field("txtdname", Hostname)];
const SCHEMA_RRSIG: &[FieldSpec] = &[
    field("typecovered", Text),
    field("algorithm", UInt8),
    field("labels", UInt8),
    field("originalttl", UInt32),
    field("expiration", Text),
    field("inception", Text),
    field("keytag", UInt16),
    field("signer", Hostname),
    field("signature", Text),
];
const SCHEMA_SOA: &[FieldSpec] = &[
    field("primary", Hostname),
    field("hostmaster", Email),
    field("serial", UInt32),
    field("refresh", UInt32),
    field("retry", UInt32),
    field("expire", UInt32),
    field("minimum", UInt32),
];
const SCHEMA_SPF: &[FieldSpec] = &[field("text", Text)];
const SCHEMA_SSHFP: &[FieldSpec] = &[
    field("algorithm", UInt8),
    field("fptype", UInt8),
    field("fingerprint", Text),
];
const SCHEMA_SRV: &[FieldSpec] = &[
    field(PRIORITY_FIELD, UInt16),
    field("weight", UInt16),
    field("port", UInt16),
    field("target", Hostname),
];
const SCHEMA_TXT: &[FieldSpec] = &[field("text", Text)];

/// Canonical record type tag.
///
/// Serialized as the upper-case mnemonic (`"A"`, `"AAAA"`, `"NSEC3"`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address.
    A,
    /// IPv6 address.
    Aaaa,
    /// AFS database location.
    Afsdb,
    /// Certificate.
    Cert,
    /// Canonical name.
    Cname,
    /// DNSSEC public key.
    Dnskey,
    /// Delegation signer.
    Ds,
    /// Host information.
    Hinfo,
    /// Legacy key record.
    Key,
    /// Location.
    Loc,
    /// Mail exchange.
    Mx,
    /// Naming authority pointer.
    Naptr,
    /// Name server.
    Ns,
    /// Next secure.
    Nsec,
    /// Next secure, hashed.
    Nsec3,
    /// Pointer.
    Ptr,
    /// Responsible person.
    Rp,
    /// DNSSEC signature.
    Rrsig,
    /// Start of authority.
    Soa,
    /// Sender policy framework.
    Spf,
    /// SSH key fingerprint.
    Sshfp,
    /// Service locator.
    Srv,
    /// Text.
    Txt,
}

impl RecordType {
    /// Every registered type, in registry order.
    pub const ALL: [Self; 23] = [
        Self::A,
        Self::Aaaa,
        Self::Afsdb,
        Self::Cert,
        Self::Cname,
        Self::Dnskey,
        Self::Ds,
        Self::Hinfo,
        Self::Key,
        Self::Loc,
        Self::Mx,
        Self::Naptr,
        Self::Ns,
        Self::Nsec,
        Self::Nsec3,
        Self::Ptr,
        Self::Rp,
        Self::Rrsig,
        Self::Soa,
        Self::Spf,
        Self::Sshfp,
        Self::Srv,
        Self::Txt,
    ];

    /// Upper-case mnemonic.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Afsdb => "AFSDB",
            Self::Cert => "CERT",
            Self::Cname => "CNAME",
            Self::Dnskey => "DNSKEY",
            Self::Ds => "DS",
            Self::Hinfo => "HINFO",
            Self::Key => "KEY",
            Self::Loc => "LOC",
            Self::Mx => "MX",
            Self::Naptr => "NAPTR",
            Self::Ns => "NS",
            Self::Nsec => "NSEC",
            Self::Nsec3 => "NSEC3",
            Self::Ptr => "PTR",
            Self::Rp => "RP",
            Self::Rrsig => "RRSIG",
            Self::Soa => "SOA",
            Self::Spf => "SPF",
            Self::Sshfp => "SSHFP",
            Self::Srv => "SRV",
            Self::Txt => "TXT",
        }
    }

    /// Ordered field schema of this type.
    pub fn schema(self) -> &'static [FieldSpec] {
        match self {
            Self::A => SCHEMA_A,
            Self::Aaaa => SCHEMA_AAAA,
            Self::Afsdb => SCHEMA_AFSDB,
            Self::Cert => SCHEMA_CERT,
            Self::Cname => SCHEMA_CNAME,
            Self::Dnskey => SCHEMA_DNSKEY,
            Self::Ds => SCHEMA_DS,
            Self::Hinfo => SCHEMA_HINFO,
            Self::Key => SCHEMA_KEY,
            Self::Loc => SCHEMA_LOC,
            Self::Mx => SCHEMA_MX,
            Self::Naptr => SCHEMA_NAPTR,
            Self::Ns => SCHEMA_NS,
            Self::Nsec => SCHEMA_NSEC,
            Self::Nsec3 => SCHEMA_NSEC3,
            Self::Ptr => SCHEMA_PTR,
            Self::Rp => SCHEMA_RP,
            Self::Rrsig => SCHEMA_RRSIG,
            Self::Soa => SCHEMA_SOA,
            Self::Spf => SCHEMA_SPF,
            Self::Sshfp => SCHEMA_SSHFP,
            Self::Srv => SCHEMA_SRV,
            Self::Txt => SCHEMA_TXT,
        }
    }

    /// Schema entry for `name`, if the type declares it.
    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.schema().iter().find(|f| f.name == name)
    }

    /// Whether records of this type carry a priority.
    pub fn declares_priority(self) -> bool {
        self.field(PRIORITY_FIELD).is_some()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RecordError::UnknownType(s.to_string()))
    }
}

/// All registered type tags, in registry order.
pub fn list_types() -> &'static [RecordType] {
    &RecordType::ALL
}

/// Resolve a type tag to its registered type and schema.
///
/// Every type shares one schema-driven constructor,
/// [`ResourceRecord::new`](crate::ResourceRecord::new); resolving the schema is
/// all that selecting a "constructor" requires.
pub fn schema_of(tag: &str) -> Result<(RecordType, &'static [FieldSpec]), RecordError> {
    let record_type: RecordType = tag.parse()?;
    Ok((record_type, record_type.schema()))
}

/// Check the static table once at startup so a broken schema fails fast.
pub fn validate_registry() -> Result<(), RecordError> {
    for record_type in RecordType::ALL {
        let schema = record_type.schema();
        if schema.is_empty() {
            return Err(RecordError::InvalidSchema {
                record_type,
                detail: "schema declares no fields".to_string(),
            });
        }
        for (i, spec) in schema.iter().enumerate() {
            if schema[..i].iter().any(|other| other.name == spec.name) {
                return Err(RecordError::InvalidSchema {
                    record_type,
                    detail: format!("field '{}' declared twice", spec.name),
                });
            }
        }
        if let Some(priority) = record_type.field(PRIORITY_FIELD)
            && priority.kind != SimpleType::UInt16
        {
            return Err(RecordError::InvalidSchema {
                record_type,
                detail: "priority must be uint16".to_string(),
            });
        }
    }
    Ok(())
}
