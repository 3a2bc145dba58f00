//! JSON file backend for review items
//!
//! Directory structure:
//! ```text
//! {data_dir}/review_items/
//! └── {item-id}.json   # One file per review item
//! ```
//!
//! Files are written to `{item-id}.json.tmp` and renamed into place, so a
//! reader never sees a half-written item.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use super::models::ReviewItem;
use super::storage::{Result, ReviewStore, StoreError, WriteTicket};

/// Review store keeping one JSON file per item
#[derive(Clone)]
pub struct FileReviewStore {
    inner: Arc<ItemFiles>,
}

impl FileReviewStore {
    /// Open (creating if needed) the store under `data_dir`
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        let items_dir = data_dir.join("review_items");
        fs::create_dir_all(&items_dir)?;

        Ok(Self {
            inner: Arc::new(ItemFiles {
                items_dir,
                item_locks: Mutex::new(HashMap::new()),
                insert_lock: Mutex::new(()),
            }),
        })
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("recall"))
            .ok_or(StoreError::DataDirNotFound)
    }

    pub fn items_dir(&self) -> &Path {
        &self.inner.items_dir
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&ItemFiles) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || op(&inner)).await?
    }
}

#[async_trait]
impl ReviewStore for FileReviewStore {
    async fn get_item(&self, id: Uuid) -> Result<Option<ReviewItem>> {
        self.run(move |files| files.read_item(id)).await
    }

    async fn list_items(&self, owner_id: Uuid) -> Result<Vec<ReviewItem>> {
        self.run(move |files| {
            Ok(files
                .read_all()?
                .into_iter()
                .filter(|item| item.owner_id == owner_id)
                .collect())
        })
        .await
    }

    async fn insert_item(&self, item: ReviewItem) -> Result<ReviewItem> {
        self.run(move |files| files.insert(item)).await
    }

    async fn commit_update(
        &self,
        item: ReviewItem,
        expected_version: u64,
        ticket: WriteTicket,
    ) -> Result<ReviewItem> {
        self.run(move |files| files.compare_and_swap(item, expected_version, &ticket))
            .await
    }

    async fn delete_by_source(&self, source_question_ref: Uuid) -> Result<usize> {
        self.run(move |files| files.delete_by_source(source_question_ref))
            .await
    }
}

/// Blocking file operations, run off the async executor
struct ItemFiles {
    items_dir: PathBuf,
    /// One lock per item with a write in flight
    item_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
    /// Serialises inserts so the per-source uniqueness check holds
    insert_lock: Mutex<()>,
}

impl ItemFiles {
    /// Get the path for a specific item
    fn item_path(&self, id: Uuid) -> PathBuf {
        self.items_dir.join(format!("{}.json", id))
    }

    /// Missing files (including ones deleted mid-read) are `None`
    fn read_item(&self, id: Uuid) -> Result<Option<ReviewItem>> {
        let content = match fs::read_to_string(self.item_path(id)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let item: ReviewItem = serde_json::from_str(&content)?;
        Ok(Some(item))
    }

    /// Save an item using atomic write (write to .tmp then rename)
    fn write_item(&self, item: &ReviewItem) -> Result<()> {
        let tmp_path = self.stage_item(item)?;
        fs::rename(&tmp_path, self.item_path(item.id))?;
        Ok(())
    }

    /// Write the `.tmp` copy of an item, not yet visible to readers
    fn stage_item(&self, item: &ReviewItem) -> Result<PathBuf> {
        let tmp_path = self.item_path(item.id).with_extension("json.tmp");
        let json = serde_json::to_string_pretty(item)?;
        fs::write(&tmp_path, json)?;
        Ok(tmp_path)
    }

    /// Load every parseable item file
    fn read_all(&self) -> Result<Vec<ReviewItem>> {
        let mut items = Vec::new();

        if !self.items_dir.exists() {
            return Ok(items);
        }

        for entry in fs::read_dir(&self.items_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().map_or(false, |ext| ext == "json") {
                let parsed = fs::read_to_string(&path)
                    .map_err(StoreError::from)
                    .and_then(|content| Ok(serde_json::from_str::<ReviewItem>(&content)?));
                match parsed {
                    Ok(item) => items.push(item),
                    Err(e) => log::warn!("Skipping unreadable review item {:?}: {}", path, e),
                }
            }
        }

        Ok(items)
    }

    fn insert(&self, item: ReviewItem) -> Result<ReviewItem> {
        let _guard = self.insert_lock.lock().map_err(|_| StoreError::LockPoisoned)?;

        if self.item_path(item.id).exists() {
            return Err(StoreError::DuplicateId(item.id));
        }
        if let Some(existing) = self.read_all()?.into_iter().find(|existing| {
            existing.owner_id == item.owner_id
                && existing.source_question_ref == item.source_question_ref
        }) {
            return Ok(existing);
        }

        self.write_item(&item)?;
        Ok(item)
    }

    fn compare_and_swap(
        &self,
        mut item: ReviewItem,
        expected_version: u64,
        ticket: &WriteTicket,
    ) -> Result<ReviewItem> {
        self.with_item_lock(item.id, || {
            let stored = self
                .read_item(item.id)?
                .ok_or(StoreError::NotFound(item.id))?;
            if stored.version != expected_version {
                return Err(StoreError::VersionMismatch {
                    id: item.id,
                    expected: expected_version,
                    actual: stored.version,
                });
            }

            item.version = expected_version + 1;
            let tmp_path = self.stage_item(&item)?;
            let published = ticket.commit(|| Ok(fs::rename(&tmp_path, self.item_path(item.id))?));
            if published.is_err() {
                let _ = fs::remove_file(&tmp_path);
            }
            published?;
            Ok(item)
        })
    }

    fn delete_by_source(&self, source_question_ref: Uuid) -> Result<usize> {
        let doomed: Vec<Uuid> = self
            .read_all()?
            .into_iter()
            .filter(|item| item.source_question_ref == source_question_ref)
            .map(|item| item.id)
            .collect();

        let mut count = 0;
        for id in doomed {
            self.with_item_lock(id, || {
                match fs::remove_file(self.item_path(id)) {
                    Ok(()) => count += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
                Ok(())
            })?;
        }

        Ok(count)
    }

    /// Run `op` while holding the lock for `id`
    fn with_item_lock<T>(&self, id: Uuid, op: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = {
            let mut locks = self.item_locks.lock().map_err(|_| StoreError::LockPoisoned)?;
            Arc::clone(locks.entry(id).or_default())
        };

        let result = {
            let _guard = lock.lock().map_err(|_| StoreError::LockPoisoned)?;
            op()
        };

        // Drop the entry once nobody else is waiting on it
        let mut locks = self.item_locks.lock().map_err(|_| StoreError::LockPoisoned)?;
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&id);
        }

        result
    }
}
