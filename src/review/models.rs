//! Data models for the review scheduler

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::algorithm::SchedulePolicy;
use super::error::ReviewError;

/// How well the student recalled a previously missed question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Answered wrong again; retest tomorrow
    #[serde(rename = "wrong", alias = "fail")]
    Fail,
    /// Correct, but with effort
    Hard,
    /// Correct and confident
    Easy,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Fail, Quality::Hard, Quality::Easy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Fail => "wrong",
            Quality::Hard => "hard",
            Quality::Easy => "easy",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wrong" | "fail" => Ok(Quality::Fail),
            "hard" => Ok(Quality::Hard),
            "easy" => Ok(Quality::Easy),
            _ => Err(ReviewError::InvalidQuality(s.to_string())),
        }
    }
}

/// The scheduling numbers the update function reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleState {
    /// Days until the next review
    pub interval: u32,
    /// Consecutive non-fail reviews
    pub repetition_count: u32,
    pub ease_factor: f64,
}

/// A previously missed question queued for spaced review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Wrong-answer record this item was created from (owned elsewhere)
    pub source_question_ref: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_ref: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_ref: Option<Uuid>,
    pub interval: u32,
    #[serde(default)]
    pub repetition_count: u32,
    pub ease_factor: f64,
    pub next_review_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mastered_at: Option<DateTime<Utc>>,
    /// Bumped by one on every persisted review
    #[serde(default)]
    pub version: u64,
}

impl ReviewItem {
    /// Create a fresh item, due the day after `today`
    pub fn new(
        owner_id: Uuid,
        source_question_ref: Uuid,
        created_at: DateTime<Utc>,
        today: NaiveDate,
        policy: &SchedulePolicy,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            source_question_ref,
            subject_ref: None,
            topic_ref: None,
            interval: 1,
            repetition_count: 0,
            ease_factor: policy.initial_ease,
            next_review_date: today.succ_opt().unwrap_or(NaiveDate::MAX),
            created_at,
            last_reviewed_at: None,
            mastered_at: None,
            version: 0,
        }
    }

    pub fn with_subject(mut self, subject_ref: Option<Uuid>) -> Self {
        self.subject_ref = subject_ref;
        self
    }

    pub fn with_topic(mut self, topic_ref: Option<Uuid>) -> Self {
        self.topic_ref = topic_ref;
        self
    }

    pub fn state(&self) -> ScheduleState {
        ScheduleState {
            interval: self.interval,
            repetition_count: self.repetition_count,
            ease_factor: self.ease_factor,
        }
    }

    pub fn is_mastered(&self) -> bool {
        self.mastered_at.is_some()
    }

    /// Whether the item should be shown on `today`
    pub fn is_due(&self, today: NaiveDate) -> bool {
        !self.is_mastered() && self.next_review_date <= today
    }

    /// Whole days past the scheduled date (negative when not yet due)
    pub fn overdue_days(&self, today: NaiveDate) -> i64 {
        (today - self.next_review_date).num_days()
    }
}

/// Counts over one owner's items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub due_today: usize,
    pub total_pending: usize,
    pub total_mastered: usize,
}

impl ReviewStats {
    pub fn total(&self) -> usize {
        self.total_pending + self.total_mastered
    }
}

/// The due batch and the stats computed from the same snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueBatch {
    pub today: NaiveDate,
    pub due_items: Vec<ReviewItem>,
    pub stats: ReviewStats,
}

/// Projected outcome of one quality choice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedOutcome {
    pub quality: Quality,
    pub interval: u32,
    pub repetition_count: u32,
    pub ease_factor: f64,
    pub next_review_date: NaiveDate,
    pub mastered: bool,
}

/// What each of the three answers would do to an item, computed read-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPreview {
    pub item_id: Uuid,
    pub version: u64,
    pub fail: ProjectedOutcome,
    pub hard: ProjectedOutcome,
    pub easy: ProjectedOutcome,
}

impl ReviewPreview {
    pub fn outcome(&self, quality: Quality) -> &ProjectedOutcome {
        match quality {
            Quality::Fail => &self.fail,
            Quality::Hard => &self.hard,
            Quality::Easy => &self.easy,
        }
    }
}

/// A review submission as it arrives from a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReview {
    pub item_id: Uuid,
    pub quality: String,
    /// Version the caller last saw; a mismatch is reported as a conflict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u64>,
}

/// Request from the capture side to put a missed question into rotation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueRequest {
    pub source_question_ref: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_ref: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_ref: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_quality_parsing() {
        assert_eq!("easy".parse::<Quality>().unwrap(), Quality::Easy);
        assert_eq!("HARD".parse::<Quality>().unwrap(), Quality::Hard);
        assert_eq!("wrong".parse::<Quality>().unwrap(), Quality::Fail);
        assert_eq!(" fail ".parse::<Quality>().unwrap(), Quality::Fail);

        let err = "good".parse::<Quality>().unwrap_err();
        assert!(matches!(err, ReviewError::InvalidQuality(ref q) if q == "good"));
    }

    #[test]
    fn test_quality_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Quality::Fail).unwrap(), "\"wrong\"");
        let q: Quality = serde_json::from_str("\"fail\"").unwrap();
        assert_eq!(q, Quality::Fail);
        assert!(serde_json::from_str::<Quality>("\"good\"").is_err());
    }

    #[test]
    fn test_new_item_defaults() {
        let created = DateTime::parse_from_rfc3339("2024-01-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let item = ReviewItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            created,
            date(2024, 1, 1),
            &SchedulePolicy::default(),
        );

        assert_eq!(item.interval, 1);
        assert_eq!(item.repetition_count, 0);
        assert_eq!(item.ease_factor, 2.5);
        assert_eq!(item.next_review_date, date(2024, 1, 2));
        assert_eq!(item.version, 0);
        assert!(item.last_reviewed_at.is_none());
        assert!(!item.is_due(date(2024, 1, 1)));
        assert!(item.is_due(date(2024, 1, 2)));
    }

    #[test]
    fn test_item_json_is_camel_case() {
        let item = ReviewItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Utc::now(),
            date(2024, 3, 1),
            &SchedulePolicy::default(),
        );
        let json = serde_json::to_value(&item).unwrap();

        assert!(json.get("sourceQuestionRef").is_some());
        assert!(json.get("nextReviewDate").is_some());
        assert!(json.get("easeFactor").is_some());
        assert!(json.get("masteredAt").is_none());
    }
}
