//! Domain DTOs for the record service.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates. Timestamps
//! travel as RFC 3339 strings under camelCase keys (`createdAt`, `updatedAt`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single record held by the store and returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Apply the fields present in `patch` and stamp `updated_at`.
    ///
    /// `updated_at` never moves backwards, even if the wall clock does.
    pub fn apply(&self, patch: &RecordPatch, now: DateTime<Utc>) -> Record {
        Record {
            id: self.id.clone(),
            title: patch.title.clone().unwrap_or_else(|| self.title.clone()),
            description: patch
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            created_at: self.created_at,
            updated_at: now.max(self.updated_at),
        }
    }
}

/// Request payload for creating a new record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RecordDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Request payload for updating an existing record. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RecordPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
        }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self {
            title: None,
            description: Some(description.into()),
        }
    }
}

/// Structured error body the service sends alongside non-2xx statuses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub detail: String,
}

/// Response of the service's health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Health {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record() -> Record {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Record {
            id: "1".to_string(),
            title: "Original".to_string(),
            description: "Keep me".to_string(),
            created_at: t0,
            updated_at: t0,
        }
    }

    #[test]
    fn record_uses_camel_case_timestamps() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00Z");
        assert_eq!(json["updatedAt"], "2024-01-01T00:00:00Z");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn record_without_description_defaults_to_empty() {
        let parsed: Record = serde_json::from_str(
            r#"{"id":"x","title":"T","createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(parsed.description, "");
    }

    #[test]
    fn apply_keeps_unpatched_fields() {
        let before = record();
        let now = before.updated_at + Duration::seconds(5);
        let after = before.apply(&RecordPatch::title("New"), now);
        assert_eq!(after.title, "New");
        assert_eq!(after.description, "Keep me");
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.updated_at, now);
    }

    #[test]
    fn apply_never_moves_updated_at_backwards() {
        let before = record();
        let earlier = before.updated_at - Duration::hours(1);
        let after = before.apply(&RecordPatch::description("d"), earlier);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[test]
    fn draft_omits_missing_description() {
        let json = serde_json::to_value(RecordDraft::new("A")).unwrap();
        assert_eq!(json, serde_json::json!({"title": "A"}));
    }

    #[test]
    fn empty_patch_serializes_to_empty_object() {
        let json = serde_json::to_string(&RecordPatch::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
