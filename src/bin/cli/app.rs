use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use uuid::Uuid;

use recall_lib::review::{
    DueBatch, EnqueueRequest, FileReviewStore, ReviewItem, ReviewPreview, ReviewStats,
    SchedulerConfig, SessionController, SubmitReview,
};

/// Shared application state for CLI commands
pub struct App {
    pub config: SchedulerConfig,
    pub data_dir: PathBuf,
    owner: Option<Uuid>,
    controller: SessionController<FileReviewStore>,
}

impl App {
    /// Load config and open the file store
    pub fn new(config_path: Option<&Path>, data_dir: Option<PathBuf>, owner: Option<Uuid>) -> Result<Self> {
        let mut config = SchedulerConfig::load(config_path)
            .context("Failed to load configuration")?;
        if let Some(dir) = data_dir {
            config.store.data_dir = Some(dir);
        }

        let data_dir = match &config.store.data_dir {
            Some(dir) => dir.clone(),
            None => FileReviewStore::default_data_dir()
                .context("Failed to get data directory")?,
        };
        log::debug!("Using data directory {:?}", data_dir);

        let store = FileReviewStore::new(data_dir.clone())
            .context(format!("Failed to open review store in {:?}", data_dir))?;
        let controller = SessionController::new(store, config.clone());

        Ok(Self {
            config,
            data_dir,
            owner,
            controller,
        })
    }

    /// Owner from --owner / RECALL_OWNER
    pub fn owner(&self) -> Result<Uuid> {
        self.owner
            .context("No owner given. Pass --owner <uuid> or set RECALL_OWNER")
    }

    /// Enqueue a missed question for the current owner
    pub async fn enqueue(&self, request: EnqueueRequest) -> Result<ReviewItem> {
        let owner = self.owner()?;
        self.controller.enqueue(owner, request).await
            .context("Failed to enqueue question")
    }

    /// Fetch today's due batch
    pub async fn due_batch(&self) -> Result<DueBatch> {
        let owner = self.owner()?;
        self.controller.start(owner).await
            .context("Failed to load due items")
    }

    pub async fn stats(&self) -> Result<ReviewStats> {
        let owner = self.owner()?;
        self.controller.stats(owner).await
            .context("Failed to load stats")
    }

    /// Submit a graded review
    pub async fn submit(&self, request: SubmitReview) -> Result<ReviewItem> {
        let owner = self.owner()?;
        let item_id = request.item_id;
        self.controller.submit(owner, request).await
            .context(format!("Failed to review item {}", item_id))
    }

    pub async fn preview(&self, item_id: Uuid) -> Result<ReviewPreview> {
        let owner = self.owner()?;
        self.controller.preview(owner, item_id).await
            .context(format!("Failed to preview item {}", item_id))
    }

    /// Cascade delete for a removed source question
    pub async fn remove_source(&self, source: Uuid) -> Result<usize> {
        self.controller.remove_for_source(source).await
            .context(format!("Failed to remove items for question {}", source))
    }

    /// Effective configuration, including the resolved data directory
    pub fn config_toml(&self) -> Result<String> {
        let mut config = self.config.clone();
        config.store.data_dir = Some(self.data_dir.clone());
        config.to_toml_string().context("Failed to serialize configuration")
    }
}
