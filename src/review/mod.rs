//! Spaced repetition scheduler for missed exam questions
//!
//! This module provides:
//! - The interval / ease update rule and its tunable policy
//! - Mastery classification
//! - Due queries and review stats over one owner's items
//! - Review item stores (in-memory and JSON files)
//! - The session controller tying them together

pub mod algorithm;
pub mod clock;
pub mod config;
pub mod due;
mod error;
pub mod file_storage;
pub mod mastery;
pub mod models;
pub mod session;
pub mod stats;
pub mod storage;

pub use algorithm::SchedulePolicy;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, SchedulerConfig};
pub use error::{Result, ReviewError};
pub use file_storage::FileReviewStore;
pub use models::*;
pub use session::SessionController;
pub use storage::{MemoryReviewStore, ReviewStore, StoreError, WriteState, WriteTicket};
