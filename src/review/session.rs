//! Review session orchestration
//!
//! Nothing about a session is stored between calls: the caller fetches a due
//! batch with [`SessionController::start`] and reports one answer at a time
//! with [`SessionController::review_one`]. Each call reads the clock once.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::algorithm::{calculate_next_review, preview_outcomes, ReviewResult, SchedulePolicy};
use super::clock::{Clock, SystemClock};
use super::config::SchedulerConfig;
use super::due::select_due;
use super::error::{Result, ReviewError};
use super::mastery;
use super::models::*;
use super::stats::aggregate;
use super::storage::{self, ReviewStore, WriteState, WriteTicket};

/// Apply one graded review to `item`, returning the state to persist.
///
/// Pure: preview and commit both go through here. The returned item keeps
/// the input `version`; the store bumps it on write.
pub fn apply_review(
    item: &ReviewItem,
    quality: Quality,
    now: DateTime<Utc>,
    today: NaiveDate,
    policy: &SchedulePolicy,
) -> ReviewItem {
    let result = calculate_next_review(&item.state(), quality, today, policy);
    apply_result(item, quality, &result, now, policy)
}

fn apply_result(
    item: &ReviewItem,
    quality: Quality,
    result: &ReviewResult,
    now: DateTime<Utc>,
    policy: &SchedulePolicy,
) -> ReviewItem {
    let mut updated = item.clone();
    updated.interval = result.state.interval;
    updated.repetition_count = result.state.repetition_count;
    updated.ease_factor = result.state.ease_factor;
    updated.next_review_date = result.next_review_date;
    updated.last_reviewed_at = Some(now);
    updated.mastered_at = mastery::classify(item.mastered_at, quality, &result.state, now, policy);
    updated
}

/// Entry point for fetching due work and recording answers
pub struct SessionController<S: ReviewStore> {
    store: S,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
}

impl<S: ReviewStore> SessionController<S> {
    pub fn new(store: S, config: SchedulerConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, config: SchedulerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Read the clock once for an operation
    fn now_and_today(&self) -> (DateTime<Utc>, NaiveDate) {
        let now = self.clock.now();
        (now, self.config.scheduling_day(now))
    }

    /// Due batch plus stats, both computed from a single snapshot
    pub async fn start(&self, owner_id: Uuid) -> Result<DueBatch> {
        require_id(owner_id, "owner id")?;
        let (_, today) = self.now_and_today();

        let snapshot = self.bounded(self.store.list_items(owner_id)).await?;
        let due_items = select_due(&snapshot, today, self.config.session.batch_size);
        let stats = aggregate(&snapshot, today);

        log::debug!(
            "Due batch for {} on {}: {} of {} due",
            owner_id,
            today,
            due_items.len(),
            stats.due_today
        );

        Ok(DueBatch {
            today,
            due_items,
            stats,
        })
    }

    pub async fn stats(&self, owner_id: Uuid) -> Result<ReviewStats> {
        require_id(owner_id, "owner id")?;
        let (_, today) = self.now_and_today();

        let snapshot = self.bounded(self.store.list_items(owner_id)).await?;
        Ok(aggregate(&snapshot, today))
    }

    /// Projected outcome of each answer against the item's current state
    pub async fn preview(&self, owner_id: Uuid, item_id: Uuid) -> Result<ReviewPreview> {
        require_id(owner_id, "owner id")?;
        require_id(item_id, "item id")?;
        let (now, today) = self.now_and_today();

        let item = self.load_owned(owner_id, item_id).await?;
        let policy = &self.config.policy;
        let [fail, hard, easy] = preview_outcomes(&item.state(), today, policy);
        let project = |quality: Quality, result: ReviewResult| {
            let next = apply_result(&item, quality, &result, now, policy);
            ProjectedOutcome {
                quality,
                interval: next.interval,
                repetition_count: next.repetition_count,
                ease_factor: next.ease_factor,
                next_review_date: next.next_review_date,
                mastered: next.is_mastered(),
            }
        };

        Ok(ReviewPreview {
            item_id,
            version: item.version,
            fail: project(Quality::Fail, fail),
            hard: project(Quality::Hard, hard),
            easy: project(Quality::Easy, easy),
        })
    }

    /// Record one answer and return the persisted item.
    ///
    /// With `expected_version`, a caller holding an outdated copy (for example
    /// a retried double submit) gets `ConcurrencyConflict` instead of a second
    /// review being applied.
    pub async fn review_one(
        &self,
        owner_id: Uuid,
        item_id: Uuid,
        quality: Quality,
        expected_version: Option<u64>,
    ) -> Result<ReviewItem> {
        require_id(owner_id, "owner id")?;
        require_id(item_id, "item id")?;
        let (now, today) = self.now_and_today();

        let item = self.load_owned(owner_id, item_id).await?;
        if let Some(expected) = expected_version {
            if expected != item.version {
                log::warn!(
                    "Rejected review of {}: caller saw version {}, stored {}",
                    item_id,
                    expected,
                    item.version
                );
                return Err(ReviewError::ConcurrencyConflict {
                    id: item_id,
                    expected,
                    actual: item.version,
                });
            }
        }

        let next = apply_review(&item, quality, now, today, &self.config.policy);
        let ticket = WriteTicket::new();
        let write = self
            .store
            .commit_update(next.clone(), item.version, ticket.clone());
        let stored = match self.bounded(write).await {
            Ok(stored) => stored,
            // The store may still be finishing the write; the ticket decides whether it counts
            Err(ReviewError::StoreUnavailable(reason)) => match ticket.abandon() {
                WriteState::Committed => {
                    log::warn!(
                        "Write to {} reported '{}' after it was committed",
                        item_id,
                        reason
                    );
                    ReviewItem {
                        version: item.version + 1,
                        ..next
                    }
                }
                _ => return Err(ReviewError::StoreUnavailable(reason)),
            },
            Err(e) => {
                if matches!(e, ReviewError::ConcurrencyConflict { .. }) {
                    log::warn!("Concurrent write on {}: {}", item_id, e);
                }
                return Err(e);
            }
        };

        if stored.is_mastered() != item.is_mastered() {
            log::info!(
                "Item {} {} mastery",
                item_id,
                if stored.is_mastered() { "reached" } else { "lost" }
            );
        }
        log::info!(
            "Reviewed {} as {}: interval {}d, ease {:.2}, next {}",
            item_id,
            quality,
            stored.interval,
            stored.ease_factor,
            stored.next_review_date
        );

        Ok(stored)
    }

    /// Validate a raw submission, then review it
    pub async fn submit(&self, owner_id: Uuid, request: SubmitReview) -> Result<ReviewItem> {
        let quality: Quality = request.quality.parse()?;
        self.review_one(owner_id, request.item_id, quality, request.expected_version)
            .await
    }

    /// Put a missed question into rotation, due tomorrow.
    ///
    /// Returns the existing item if the owner already has one for the same
    /// source question.
    pub async fn enqueue(&self, owner_id: Uuid, request: EnqueueRequest) -> Result<ReviewItem> {
        require_id(owner_id, "owner id")?;
        require_id(request.source_question_ref, "source question")?;
        let (now, today) = self.now_and_today();

        let item = ReviewItem::new(
            owner_id,
            request.source_question_ref,
            now,
            today,
            &self.config.policy,
        )
        .with_subject(request.subject_ref)
        .with_topic(request.topic_ref);
        let new_id = item.id;

        let stored = self.bounded(self.store.insert_item(item)).await?;
        if stored.id == new_id {
            log::info!(
                "Enqueued {} for question {}, due {}",
                stored.id,
                stored.source_question_ref,
                stored.next_review_date
            );
        } else {
            log::debug!(
                "Question {} already queued as {}",
                stored.source_question_ref,
                stored.id
            );
        }
        Ok(stored)
    }

    /// Cascade delete after the source question is removed
    pub async fn remove_for_source(&self, source_question_ref: Uuid) -> Result<usize> {
        require_id(source_question_ref, "source question")?;

        let removed = self
            .bounded(self.store.delete_by_source(source_question_ref))
            .await?;
        if removed > 0 {
            log::info!(
                "Removed {} review item(s) for deleted question {}",
                removed,
                source_question_ref
            );
        }
        Ok(removed)
    }

    async fn load_owned(&self, owner_id: Uuid, item_id: Uuid) -> Result<ReviewItem> {
        match self.bounded(self.store.get_item(item_id)).await? {
            Some(item) if item.owner_id == owner_id => Ok(item),
            _ => Err(ReviewError::ItemNotFound(item_id)),
        }
    }

    /// Run a store call under the configured timeout
    async fn bounded<T>(&self, op: impl Future<Output = storage::Result<T>>) -> Result<T> {
        let timeout = self.config.store_timeout();
        match tokio::time::timeout(timeout, op).await {
            Ok(result) => result.map_err(ReviewError::from),
            Err(_) => {
                log::warn!("Store call timed out after {:?}", timeout);
                Err(ReviewError::StoreUnavailable(format!(
                    "store call timed out after {} ms",
                    timeout.as_millis()
                )))
            }
        }
    }
}

fn require_id(id: Uuid, what: &str) -> Result<()> {
    if id.is_nil() {
        return Err(ReviewError::Validation(format!("{} is required", what)));
    }
    Ok(())
}
