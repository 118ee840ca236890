//! In-memory record collection kept in step with the remote service.
//!
//! # Overview
//! `RecordStore` owns the collection, the current selection and the shared
//! loading/error flags. Every CRUD operation calls the `RecordService` first
//! and commits the server's answer; when the call fails and the
//! `FallbackPolicy` allows it, an equivalent local change is committed
//! instead, so callers keep working while the service is unreachable.
//!
//! # Design
//! - State lives in a `tokio::sync::watch` channel. Mutations go through
//!   `send_modify`, which never spans an `.await`, and UI code can
//!   `subscribe()` to be told about every change.
//! - Operations are not sequenced. Two updates to the same id race and the
//!   last one to settle wins; the single `is_loading` flag is likewise
//!   last-write-wins across overlapping operations.
//! - A fallback commit returns the same shape as a remote one. Whether the
//!   last settled operation reached the server is exposed separately through
//!   `last_commit()`.

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{FallbackPolicy, StoreConfig};
use crate::error::{ServiceError, StoreError};
use crate::service::{HttpRecordService, RecordService};
use crate::types::{Record, RecordDraft, RecordPatch};

/// Where the most recent settled operation got its result from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitSource {
    Remote,
    Fallback,
}

/// Loading/error flags shared by every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationState {
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Everything the store exposes to its observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub items: Vec<Record>,
    pub selected: Option<Record>,
    pub operation: OperationState,
    pub last_commit: Option<CommitSource>,
}

/// Demo records a fresh store starts with.
pub fn seed_records() -> Vec<Record> {
    let now = Utc::now();
    vec![
        Record {
            id: "1".to_string(),
            title: "Sample Item 1".to_string(),
            description: "This is a sample item to demonstrate the CRUD functionality."
                .to_string(),
            created_at: now,
            updated_at: now,
        },
        Record {
            id: "2".to_string(),
            title: "Sample Item 2".to_string(),
            description: "Another sample item with some description text.".to_string(),
            created_at: now,
            updated_at: now,
        },
    ]
}

/// Client-side record store with optimistic fallback.
pub struct RecordStore<S> {
    service: S,
    fallback: FallbackPolicy,
    state: watch::Sender<StoreState>,
}

impl<S: RecordService> RecordStore<S> {
    /// Store seeded with the demo records and the default fallback policy.
    pub fn new(service: S) -> Self {
        Self::with_records(service, seed_records())
    }

    /// Store starting from an explicit collection.
    pub fn with_records(service: S, items: Vec<Record>) -> Self {
        let (state, _) = watch::channel(StoreState {
            items,
            ..StoreState::default()
        });
        Self {
            service,
            fallback: FallbackPolicy::default(),
            state,
        }
    }

    /// Store seeded and configured according to `config`.
    pub fn from_config(service: S, config: &StoreConfig) -> Self {
        let items = if config.seed { seed_records() } else { Vec::new() };
        Self::with_records(service, items).with_fallback(config.fallback)
    }

    /// Replace the fallback policy.
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// The underlying service, for calls the store does not wrap.
    pub fn service(&self) -> &S {
        &self.service
    }

    // ----- observers -----

    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    pub fn items(&self) -> Vec<Record> {
        self.state.borrow().items.clone()
    }

    pub fn get(&self, id: &str) -> Option<Record> {
        self.state.borrow().items.iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn selected(&self) -> Option<Record> {
        self.state.borrow().selected.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().operation.is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().operation.error.clone()
    }

    pub fn last_commit(&self) -> Option<CommitSource> {
        self.state.borrow().last_commit
    }

    // ----- setters -----

    pub fn set_selected_item(&self, record: Option<Record>) {
        self.state.send_modify(|s| s.selected = record);
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.operation.error = None);
    }

    // ----- operations -----

    /// Replace the collection with the service's list.
    ///
    /// On fallback the collection is left exactly as it was.
    pub async fn fetch_items(&self) -> Result<(), StoreError> {
        self.begin();
        match self.service.list().await {
            Ok(items) => {
                debug!(count = items.len(), "collection replaced from service");
                self.commit(CommitSource::Remote, |current| *current = items);
            }
            Err(err) => {
                self.fall_back("fetch", err)?;
                self.commit(CommitSource::Fallback, |_| {});
            }
        }
        Ok(())
    }

    /// Create a record and append it to the collection.
    ///
    /// On fallback the record gets a random id and `created_at == updated_at`.
    pub async fn create_item(&self, draft: RecordDraft) -> Result<Record, StoreError> {
        self.begin();
        let (record, source) = match self.service.create(&draft).await {
            Ok(record) => (record, CommitSource::Remote),
            Err(err) => {
                self.fall_back("create", err)?;
                (synthesize(draft), CommitSource::Fallback)
            }
        };
        debug!(id = %record.id, ?source, "record created");
        self.commit(source, |items| items.push(record.clone()));
        Ok(record)
    }

    /// Apply `patch` to the record with the given id.
    ///
    /// On fallback the patch is merged into the local copy; if there is no
    /// local copy the call fails with `StoreError::NotFound`. A remote 404
    /// always takes the local path, whatever the policy, since the record may
    /// exist only on this side.
    pub async fn update_item(&self, id: &str, patch: RecordPatch) -> Result<Record, StoreError> {
        self.begin();
        match self.service.update(id, &patch).await {
            Ok(record) => {
                debug!(id, "record updated from service");
                self.commit(CommitSource::Remote, |items| {
                    if let Some(entry) = items.iter_mut().find(|r| r.id == id) {
                        *entry = record.clone();
                    }
                });
                Ok(record)
            }
            Err(err) if err.is_not_found() => {
                debug!(id, "record unknown to service, merging locally");
                self.update_locally(id, &patch)
            }
            Err(err) => {
                self.fall_back("update", err)?;
                self.update_locally(id, &patch)
            }
        }
    }

    /// Remove the record with the given id. Unknown ids are a no-op.
    pub async fn delete_item(&self, id: &str) -> Result<(), StoreError> {
        self.begin();
        let source = match self.service.delete(id).await {
            Ok(()) => CommitSource::Remote,
            // The service already agrees the record is gone.
            Err(err) if err.is_not_found() => CommitSource::Remote,
            Err(err) => {
                self.fall_back("delete", err)?;
                CommitSource::Fallback
            }
        };
        let removed = self.commit(source, |items| {
            let before = items.len();
            items.retain(|r| r.id != id);
            before != items.len()
        });
        debug!(id, removed, ?source, "record deleted");
        Ok(())
    }

    // ----- internals -----

    fn begin(&self) {
        self.state.send_modify(|s| {
            s.operation.is_loading = true;
            s.operation.error = None;
        });
    }

    fn commit<R: Default>(
        &self,
        source: CommitSource,
        apply: impl FnOnce(&mut Vec<Record>) -> R,
    ) -> R {
        let mut out = R::default();
        self.state.send_modify(|s| {
            out = apply(&mut s.items);
            s.operation.is_loading = false;
            s.last_commit = Some(source);
        });
        out
    }

    fn fail(&self, err: &StoreError) {
        let message = err.to_string();
        self.state.send_modify(|s| {
            s.operation.is_loading = false;
            s.operation.error = Some(message);
        });
    }

    /// Decide whether a failed remote call may be masked by a local commit.
    fn fall_back(&self, operation: &'static str, err: ServiceError) -> Result<(), StoreError> {
        if self.fallback.allows(&err) {
            warn!(operation, error = %err, "service unavailable, committing locally");
            return Ok(());
        }
        warn!(operation, error = %err, "service rejected request");
        let err = StoreError::Rejected(err);
        self.fail(&err);
        Err(err)
    }

    fn update_locally(&self, id: &str, patch: &RecordPatch) -> Result<Record, StoreError> {
        let now = Utc::now();
        let mut updated = None;
        self.state.send_modify(|s| {
            if let Some(entry) = s.items.iter_mut().find(|r| r.id == id) {
                *entry = entry.apply(patch, now);
                updated = Some(entry.clone());
                s.last_commit = Some(CommitSource::Fallback);
            }
            s.operation.is_loading = false;
        });
        match updated {
            Some(record) => Ok(record),
            None => {
                let err = StoreError::NotFound { id: id.to_string() };
                self.fail(&err);
                Err(err)
            }
        }
    }
}

impl RecordStore<HttpRecordService> {
    /// Store talking HTTP to `config.api_url`, configured from `config`.
    pub fn connect(config: &StoreConfig) -> Self {
        Self::from_config(HttpRecordService::from_config(config), config)
    }
}

fn synthesize(draft: RecordDraft) -> Record {
    let now = Utc::now();
    Record {
        id: Uuid::new_v4().to_string(),
        title: draft.title,
        description: draft.description.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    }
}
