//! Remote backend speaking the JSON zone API
//!
//! One HTTP request per operation against
//! `{api_base}/servers/{server_sysname}/zones[/{zone}[/records[/{id}]]]`.

mod backend;
mod http;
mod types;

use std::sync::{Arc, Weak};

use reqwest::Client;

use crate::error::ModuleConfigError;
use crate::http_client::{TransportPolicy, create_http_client};

pub(crate) use types::{JsonEnvelope, RecordBody, ZoneBody};

/// Module name used in configuration.
pub const JSON_MODULE: &str = "json";

/// Connection options of a [`JsonZoneBackend`].
#[derive(Debug, Clone)]
pub struct JsonBackendOptions {
    /// Base URL of the API, without the `/servers/...` suffix.
    pub api_base: url::Url,
    /// Server identifier on the remote side.
    pub server_sysname: String,
    pub policy: TransportPolicy,
}

/// Zone backend served by a remote JSON API.
pub struct JsonZoneBackend {
    pub(crate) client: Client,
    pub(crate) sysname: String,
    pub(crate) api_base: String,
    pub(crate) server: String,
    pub(crate) max_retries: u32,
    this: Weak<Self>,
}

impl JsonZoneBackend {
    pub fn new(
        sysname: impl Into<String>,
        options: JsonBackendOptions,
    ) -> Result<Arc<Self>, ModuleConfigError> {
        let client = create_http_client(JSON_MODULE, &options.policy)?;
        let api_base = options.api_base.as_str().trim_end_matches('/').to_string();
        let sysname = sysname.into();
        Ok(Arc::new_cyclic(|this| Self {
            client,
            sysname,
            api_base,
            server: options.server_sysname,
            max_retries: options.policy.max_retries,
            this: this.clone(),
        }))
    }
}
