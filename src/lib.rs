//! Spaced repetition review scheduler for re-studying missed exam questions.
//!
//! The capture side enqueues a missed question with
//! [`SessionController::enqueue`]; students then work through the due batch
//! returned by [`SessionController::start`] and grade each item with
//! [`SessionController::review_one`].

pub mod review;

pub use review::{
    Clock, DueBatch, EnqueueRequest, FileReviewStore, MemoryReviewStore, Quality, ReviewError,
    ReviewItem, ReviewPreview, ReviewStats, ReviewStore, SchedulePolicy, SchedulerConfig,
    SessionController, SubmitReview,
};
