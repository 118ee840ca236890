//! Stateless HTTP request builder and response parser for the record service.
//!
//! # Design
//! `RecordClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Record endpoints live under the versioned `/v1/items` segment; the health
//! check sits at the unversioned `/health`.

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ServiceError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ErrorDetail, Health, Record, RecordDraft, RecordPatch};

/// Versioned API segment appended to the base URL.
const API_VERSION: &str = "v1";

/// Stateless client for the record service.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct RecordClient {
    base_url: String,
}

impl RecordClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn items_url(&self) -> String {
        format!("{}/{API_VERSION}/items", self.base_url)
    }

    /// The id always lands in a single path segment, percent-encoded, so
    /// `?`, `#` or `/` inside it cannot address another resource.
    fn item_url(&self, id: &str) -> String {
        let segment = path_segment(id).unwrap_or_default();
        format!("{}/{API_VERSION}/items/{segment}", self.base_url)
    }

    pub fn build_list(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.items_url(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create(&self, draft: &RecordDraft) -> Result<HttpRequest, ServiceError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.items_url(),
            headers: json_headers(),
            body: Some(encode(draft)?),
        })
    }

    pub fn build_update(&self, id: &str, patch: &RecordPatch) -> Result<HttpRequest, ServiceError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: self.item_url(id),
            headers: json_headers(),
            body: Some(encode(patch)?),
        })
    }

    pub fn build_delete(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_health(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/health", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<Record>, ServiceError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<Record, ServiceError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<Record, ServiceError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<Record, ServiceError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// Any 2xx is success; the body (usually absent on 204) is ignored.
    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ServiceError> {
        check_status(&response)?;
        Ok(())
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<Health, ServiceError> {
        check_status(&response)?;
        decode(&response.body)
    }
}

/// Percent-encode `raw` as one URL path segment.
fn path_segment(raw: &str) -> Option<String> {
    let mut url = Url::parse("http://segment.invalid/").ok()?;
    url.path_segments_mut().ok()?.clear().push(raw);
    Some(url.path().trim_start_matches('/').to_string())
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn encode<T: Serialize>(value: &T) -> Result<String, ServiceError> {
    serde_json::to_string(value).map_err(|e| ServiceError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ServiceError> {
    serde_json::from_str(body).map_err(|e| ServiceError::Deserialization(e.to_string()))
}

/// Map non-2xx responses to `ServiceError::Status`.
///
/// The message comes from the `detail` field of a JSON error body when there
/// is one, else from the status code's reason phrase.
fn check_status(response: &HttpResponse) -> Result<(), ServiceError> {
    if response.is_success() {
        return Ok(());
    }
    let message = serde_json::from_str::<ErrorDetail>(&response.body)
        .map(|e| e.detail)
        .unwrap_or_else(|_| reason_phrase(response.status));
    Err(ServiceError::Status {
        status: response.status,
        message,
    })
}

fn reason_phrase(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}
