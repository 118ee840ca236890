//! The remote record service as the store sees it.
//!
//! `RecordService` is the capability the store depends on. `HttpRecordService`
//! is the production implementation: it pairs the sans-IO `RecordClient` with
//! a `Transport` that performs the round-trip.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::client::RecordClient;
use crate::config::StoreConfig;
use crate::error::ServiceError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Health, Record, RecordDraft, RecordPatch};

/// Remote system of record for `Record`s.
#[async_trait]
pub trait RecordService: Send + Sync {
    /// Fetch every record.
    async fn list(&self) -> Result<Vec<Record>, ServiceError>;

    /// Create a record. The service assigns `id`, `created_at` and `updated_at`.
    async fn create(&self, draft: &RecordDraft) -> Result<Record, ServiceError>;

    /// Apply a partial update to the record with the given id.
    async fn update(&self, id: &str, patch: &RecordPatch) -> Result<Record, ServiceError>;

    /// Delete the record with the given id.
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;
}

/// `RecordService` speaking HTTP through a `Transport`.
#[derive(Debug, Clone)]
pub struct HttpRecordService<T = ReqwestTransport> {
    client: RecordClient,
    transport: T,
}

impl HttpRecordService<ReqwestTransport> {
    /// Service at `base_url` using a default `reqwest` transport.
    pub fn connect(base_url: &str) -> Self {
        Self::new(RecordClient::new(base_url), ReqwestTransport::new())
    }

    /// Service at the configured `api_url`.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::connect(&config.api_url)
    }
}

impl<T: Transport> HttpRecordService<T> {
    pub fn new(client: RecordClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &RecordClient {
        &self.client
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ServiceError> {
        debug!(method = request.method.as_str(), path = %request.path, "sending request");
        self.transport.execute(request).await
    }

    /// Fetch a single record by id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Record, ServiceError> {
        let response = self.send(self.client.build_get(id)).await?;
        self.client.parse_get(response)
    }

    /// Query the service's health endpoint.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<Health, ServiceError> {
        let response = self.send(self.client.build_health()).await?;
        self.client.parse_health(response)
    }
}

#[async_trait]
impl<T: Transport> RecordService for HttpRecordService<T> {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Record>, ServiceError> {
        let response = self.send(self.client.build_list()).await?;
        self.client.parse_list(response)
    }

    #[instrument(skip(self, draft))]
    async fn create(&self, draft: &RecordDraft) -> Result<Record, ServiceError> {
        let response = self.send(self.client.build_create(draft)?).await?;
        self.client.parse_create(response)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, patch: &RecordPatch) -> Result<Record, ServiceError> {
        let response = self.send(self.client.build_update(id, patch)?).await?;
        self.client.parse_update(response)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let response = self.send(self.client.build_delete(id)).await?;
        self.client.parse_delete(response)
    }
}
