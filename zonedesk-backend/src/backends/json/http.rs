//! JSON zone API request helpers

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Serialize;

use crate::error::{BackendError, Result};
use crate::http_client::HttpUtils;
use crate::types::{Page, RecordFilter, RecordId};

use super::{JsonEnvelope, JsonZoneBackend};

const CLIENT_AGENT: &str = concat!("zonedesk-json-client/", env!("CARGO_PKG_VERSION"));

impl JsonZoneBackend {
    /// `{api_base}/servers/{server}/zones`
    pub(crate) fn zones_url(&self) -> String {
        format!(
            "{}/servers/{}/zones",
            self.api_base,
            urlencoding::encode(&self.server)
        )
    }

    /// `.../zones/{zone}`
    pub(crate) fn zone_url(&self, zone: &str) -> String {
        format!("{}/{}", self.zones_url(), urlencoding::encode(zone))
    }

    /// `.../zones/{zone}/records`
    pub(crate) fn records_url(&self, zone: &str) -> String {
        format!("{}/records", self.zone_url(zone))
    }

    /// `.../zones/{zone}/records/{id}`
    pub(crate) fn record_url(&self, zone: &str, id: &RecordId) -> String {
        format!(
            "{}/{}",
            self.records_url(zone),
            urlencoding::encode(id.as_str())
        )
    }

    /// Records URL with `filter[name]`, `filter[type]`, `offset` and `limit`.
    pub(crate) fn records_query_url(&self, zone: &str, filter: &RecordFilter, page: Page) -> String {
        let mut query = Vec::new();
        if let Some(name) = &filter.name {
            query.push(format!("filter%5Bname%5D={}", urlencoding::encode(name)));
        }
        if let Some(record_type) = filter.record_type {
            query.push(format!("filter%5Btype%5D={record_type}"));
        }
        if page.offset > 0 {
            query.push(format!("offset={}", page.offset));
        }
        if let Some(limit) = page.limit {
            query.push(format!("limit={limit}"));
        }

        let base = self.records_url(zone);
        if query.is_empty() {
            base
        } else {
            format!("{base}?{}", query.join("&"))
        }
    }

    /// Send a bodiless request and decode the envelope.
    pub(crate) async fn call(&self, method: Method, url: &str) -> Result<JsonEnvelope> {
        let request = self
            .client
            .request(method.clone(), url)
            .header(USER_AGENT, CLIENT_AGENT);
        self.dispatch(request, &method, url).await
    }

    /// Send a request with a JSON body and decode the envelope.
    pub(crate) async fn call_with_body<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> Result<JsonEnvelope> {
        let payload = serde_json::to_vec(body).map_err(|e| BackendError::SerializationError {
            backend: self.sysname.clone(),
            detail: e.to_string(),
        })?;
        let request = self
            .client
            .request(method.clone(), url)
            .header(USER_AGENT, CLIENT_AGENT)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        self.dispatch(request, &method, url).await
    }

    async fn dispatch(
        &self,
        request: reqwest::RequestBuilder,
        method: &Method,
        url: &str,
    ) -> Result<JsonEnvelope> {
        let (_status, body) = HttpUtils::execute_request_with_retry(
            request,
            &self.sysname,
            method,
            url,
            self.max_retries,
        )
        .await?;
        let envelope: JsonEnvelope = HttpUtils::parse_json(&body, &self.sysname)?;
        if !envelope.success {
            log::debug!(
                "[{}] {method} {url} answered success=false: {}",
                self.sysname,
                envelope.error_message("no message")
            );
        }
        Ok(envelope)
    }
}
