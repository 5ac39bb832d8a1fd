//! Request model shared by all routers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

/// Request method. Handlers branch on it: GET reads, PUT creates, POST
/// updates, DELETE removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(CoreError::InvalidParams(format!(
                "unsupported method '{other}'"
            ))),
        }
    }
}

/// Path segments with a cursor.
///
/// Segments are split on `/`, empty ones dropped and each percent-decoded.
/// The cursor only moves forward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingPath {
    segments: Vec<String>,
    cursor: usize,
}

impl RoutingPath {
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                urlencoding::decode(s).map_or_else(|_| s.to_string(), std::borrow::Cow::into_owned)
            })
            .collect();
        Self {
            segments,
            cursor: 0,
        }
    }

    /// Consume and return the next segment.
    pub fn next_segment(&mut self) -> Option<String> {
        let segment = self.segments.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(segment)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.segments.len()
    }

    pub fn remaining(&self) -> &[String] {
        &self.segments[self.cursor.min(self.segments.len())..]
    }

    pub fn consumed(&self) -> &[String] {
        &self.segments[..self.cursor.min(self.segments.len())]
    }
}

impl fmt::Display for RoutingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// One request travelling down the router chain.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: RoutingPath,
    pub params: Map<String, Value>,
}

impl Request {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: RoutingPath::parse(path),
            params: Map::new(),
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: &str) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::Delete, path)
    }

    #[must_use]
    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key).filter(|v| !v.is_null())
    }

    /// String parameter; numbers are rendered.
    pub fn param_str(&self, key: &str) -> Option<String> {
        match self.param(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn required_str(&self, key: &str) -> CoreResult<String> {
        self.param_str(key)
            .ok_or_else(|| CoreError::InvalidParams(format!("missing parameter '{key}'")))
    }

    /// Unsigned integer parameter. Numeric strings are accepted since form
    /// and query input arrives as text.
    pub fn param_u64(&self, key: &str) -> CoreResult<Option<u64>> {
        let Some(raw) = self.param(key) else {
            return Ok(None);
        };
        let parsed = match raw {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| invalid_integer(key, raw))
    }

    pub fn param_u32(&self, key: &str) -> CoreResult<Option<u32>> {
        self.param_u64(key)?
            .map(|n| u32::try_from(n).map_err(|_| out_of_range(key, n)))
            .transpose()
    }

    pub fn param_u16(&self, key: &str) -> CoreResult<Option<u16>> {
        self.param_u64(key)?
            .map(|n| u16::try_from(n).map_err(|_| out_of_range(key, n)))
            .transpose()
    }
}

fn invalid_integer(key: &str, raw: &Value) -> CoreError {
    CoreError::InvalidParams(format!("parameter '{key}' is not an unsigned integer: {raw}"))
}

fn out_of_range(key: &str, n: u64) -> CoreError {
    CoreError::InvalidParams(format!("parameter '{key}' is out of range: {n}"))
}
