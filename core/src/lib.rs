//! Client-side record store with optimistic fallback.
//!
//! # Overview
//! Keeps an in-memory collection of records in step with a remote record
//! service and stays usable while that service is unreachable. The
//! `RecordStore` mediates every create/read/update/delete: it calls the
//! service, commits the server's answer, and on failure commits an
//! equivalent local change instead.
//!
//! # Design
//! - `RecordClient` is sans-IO: it builds `HttpRequest` values and parses
//!   `HttpResponse` values. A `Transport` executes the round-trip, so the
//!   client is deterministic and testable against recorded vectors.
//! - `RecordService` is the seam the store depends on. `HttpRecordService`
//!   implements it over any `Transport`; tests substitute in-memory fakes.
//! - `RecordStore` is an explicit context object. Build one at start-up and
//!   hand it (or an `Arc` of it) to whatever renders its state.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod service;
pub mod store;
pub mod transport;
pub mod types;

pub use client::RecordClient;
pub use config::{FallbackPolicy, StoreConfig};
pub use error::{ConfigError, ServiceError, StoreError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use service::{HttpRecordService, RecordService};
pub use store::{seed_records, CommitSource, OperationState, RecordStore, StoreState};
pub use transport::{ReqwestTransport, Transport};
pub use types::{ErrorDetail, Health, Record, RecordDraft, RecordPatch};
