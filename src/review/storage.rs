//! Persistence seam for review items
//!
//! The session controller only talks to [`ReviewStore`]. Two backends ship
//! with the crate: [`MemoryReviewStore`] here and
//! [`FileReviewStore`](super::file_storage::FileReviewStore), which keeps one
//! JSON file per item.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::models::ReviewItem;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Review item not found: {0}")]
    NotFound(Uuid),

    #[error("Review item already exists: {0}")]
    DuplicateId(Uuid),

    #[error("Version mismatch on {id}: expected {expected}, stored {actual}")]
    VersionMismatch { id: Uuid, expected: u64, actual: u64 },

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Write abandoned by the caller")]
    Abandoned,

    #[error("Background task failed: {0}")]
    Background(String),

    #[error("Data directory not found")]
    DataDirNotFound,
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Background(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Where a write stands, as seen by both the writer and its caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteState {
    #[default]
    Pending,
    Committed,
    Abandoned,
}

/// Commit decision shared between a store write and the caller awaiting it.
///
/// A caller that stops waiting (on a timeout, say) calls [`abandon`](Self::abandon).
/// From then on the store refuses to publish the write, and the caller learns
/// whether it had already landed. Either way the caller's answer matches what
/// is stored.
#[derive(Debug, Clone, Default)]
pub struct WriteTicket {
    state: Arc<Mutex<WriteState>>,
}

impl WriteTicket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `publish` unless the caller has given up.
    ///
    /// The decision lock is held while `publish` runs, so `publish` must be
    /// the step that makes the write visible (a rename, a map insert).
    pub fn commit<T>(&self, publish: impl FnOnce() -> Result<T>) -> Result<T> {
        let mut state = self.state.lock().map_err(|_| StoreError::LockPoisoned)?;
        if *state == WriteState::Abandoned {
            return Err(StoreError::Abandoned);
        }
        let value = publish()?;
        *state = WriteState::Committed;
        Ok(value)
    }

    /// Stop waiting for the write and return its final state
    pub fn abandon(&self) -> WriteState {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *state == WriteState::Pending {
            *state = WriteState::Abandoned;
        }
        *state
    }

    pub fn state(&self) -> WriteState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Storage operations the scheduler needs
///
/// Writes are all-or-nothing. `update_item` is a compare-and-swap on
/// `version`: it must never overwrite an item whose stored version differs
/// from the one the caller read.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Point read by id
    async fn get_item(&self, id: Uuid) -> Result<Option<ReviewItem>>;

    /// All items (mastered or not) belonging to `owner_id`
    async fn list_items(&self, owner_id: Uuid) -> Result<Vec<ReviewItem>>;

    /// Insert a new item and return what is stored.
    ///
    /// If the owner already has an item for the same source question, that
    /// item is returned and nothing is written.
    async fn insert_item(&self, item: ReviewItem) -> Result<ReviewItem>;

    /// Replace the stored item if its version still equals
    /// `expected_version`. The stored copy gets `expected_version + 1`.
    async fn update_item(&self, item: ReviewItem, expected_version: u64) -> Result<ReviewItem> {
        self.commit_update(item, expected_version, WriteTicket::new())
            .await
    }

    /// `update_item` whose final publish step goes through `ticket`.
    ///
    /// Implementations must make the write visible only inside
    /// [`WriteTicket::commit`], so an abandoned ticket leaves the item as it was.
    async fn commit_update(
        &self,
        item: ReviewItem,
        expected_version: u64,
        ticket: WriteTicket,
    ) -> Result<ReviewItem>;

    /// Remove every item created from `source_question_ref`
    async fn delete_by_source(&self, source_question_ref: Uuid) -> Result<usize>;
}

/// In-process store backed by a map
#[derive(Default)]
pub struct MemoryReviewStore {
    items: RwLock<HashMap<Uuid, ReviewItem>>,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn get_item(&self, id: Uuid) -> Result<Option<ReviewItem>> {
        let items = self.items.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(items.get(&id).cloned())
    }

    async fn list_items(&self, owner_id: Uuid) -> Result<Vec<ReviewItem>> {
        let items = self.items.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(items
            .values()
            .filter(|item| item.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_item(&self, item: ReviewItem) -> Result<ReviewItem> {
        let mut items = self.items.write().map_err(|_| StoreError::LockPoisoned)?;

        if items.contains_key(&item.id) {
            return Err(StoreError::DuplicateId(item.id));
        }
        if let Some(existing) = items.values().find(|existing| {
            existing.owner_id == item.owner_id
                && existing.source_question_ref == item.source_question_ref
        }) {
            return Ok(existing.clone());
        }

        items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn commit_update(
        &self,
        mut item: ReviewItem,
        expected_version: u64,
        ticket: WriteTicket,
    ) -> Result<ReviewItem> {
        let mut items = self.items.write().map_err(|_| StoreError::LockPoisoned)?;

        let stored = items.get_mut(&item.id).ok_or(StoreError::NotFound(item.id))?;
        if stored.version != expected_version {
            return Err(StoreError::VersionMismatch {
                id: item.id,
                expected: expected_version,
                actual: stored.version,
            });
        }

        item.version = expected_version + 1;
        ticket.commit(|| {
            *stored = item.clone();
            Ok(())
        })?;
        Ok(item)
    }

    async fn delete_by_source(&self, source_question_ref: Uuid) -> Result<usize> {
        let mut items = self.items.write().map_err(|_| StoreError::LockPoisoned)?;
        let before = items.len();
        items.retain(|_, item| item.source_question_ref != source_question_ref);
        Ok(before - items.len())
    }
}
