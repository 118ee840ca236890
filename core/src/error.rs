//! Error types for the record service client and the record store.
//!
//! # Design
//! `ServiceError` covers everything that can go wrong between the client and
//! the remote service. Connectivity failures get their own variant so the
//! store can tell "we are offline" apart from "the server said no".
//! `StoreError` is what the store lets escape to its callers; most remote
//! failures never reach it because they are turned into fallback commits.
//! `ConfigError` reports environment values that do not parse.

use thiserror::Error;

/// Errors returned by the remote record service client.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The service could not be reached (connect failure, timeout, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ServiceError {
    /// Status code of a `Status` error, `None` for every other variant.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True when the failure says nothing about the request itself: the
    /// service was unreachable or failed on its side (5xx).
    pub fn is_connectivity(&self) -> bool {
        match self {
            ServiceError::Transport(_) => true,
            ServiceError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Transport(format!("request timed out: {err}"))
        } else if err.is_connect() {
            ServiceError::Transport(format!("connection failed: {err}"))
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

/// Errors the record store surfaces to its callers.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An update targeted an id that is not in the local collection.
    #[error("record not found: {id}")]
    NotFound { id: String },

    /// The service rejected the request and the fallback policy does not
    /// allow masking it with a local commit.
    #[error(transparent)]
    Rejected(#[from] ServiceError),
}

/// Errors from loading a `StoreConfig`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown fallback policy: {0}")]
    UnknownPolicy(String),

    #[error("{key} must be true or false, got {value:?}")]
    InvalidFlag { key: &'static str, value: String },
}
