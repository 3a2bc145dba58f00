//! Mastery gate
//!
//! An item retires from rotation once it has both a streak of successful
//! reviews and a long interval. Requiring both keeps a lucky run on short
//! intervals from retiring an item that is still weak.

use chrono::{DateTime, Utc};

use super::algorithm::SchedulePolicy;
use super::models::{Quality, ScheduleState};

/// Whether a schedule state has crossed the mastery gate
pub fn qualifies(state: &ScheduleState, policy: &SchedulePolicy) -> bool {
    state.repetition_count >= policy.mastery_repetitions
        && state.interval >= policy.mastery_interval_days
}

/// New value of `mastered_at` after a review graded `quality`
///
/// A wrong answer always clears mastery. Otherwise an already mastered item
/// keeps its original timestamp and a newly qualifying one is stamped `now`.
pub fn classify(
    previous: Option<DateTime<Utc>>,
    quality: Quality,
    state: &ScheduleState,
    now: DateTime<Utc>,
    policy: &SchedulePolicy,
) -> Option<DateTime<Utc>> {
    if quality == Quality::Fail || !qualifies(state, policy) {
        return None;
    }
    Some(previous.unwrap_or(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn state(interval: u32, repetition_count: u32) -> ScheduleState {
        ScheduleState {
            interval,
            repetition_count,
            ease_factor: 2.5,
        }
    }

    #[test]
    fn test_gate_needs_both_thresholds() {
        let policy = SchedulePolicy::default();

        assert!(!qualifies(&state(100, 4), &policy));
        assert!(!qualifies(&state(20, 9), &policy));
        assert!(qualifies(&state(21, 5), &policy));
        assert!(qualifies(&state(60, 7), &policy));
    }

    #[test]
    fn test_newly_mastered_is_stamped() {
        let now = Utc::now();
        let mastered = classify(None, Quality::Easy, &state(21, 5), now, &SchedulePolicy::default());
        assert_eq!(mastered, Some(now));
    }

    #[test]
    fn test_existing_timestamp_is_kept() {
        let earlier = Utc::now() - Duration::days(30);
        let mastered = classify(
            Some(earlier),
            Quality::Hard,
            &state(40, 8),
            Utc::now(),
            &SchedulePolicy::default(),
        );
        assert_eq!(mastered, Some(earlier));
    }

    #[test]
    fn test_fail_clears_mastery() {
        let earlier = Utc::now() - Duration::days(30);
        let mastered = classify(
            Some(earlier),
            Quality::Fail,
            &state(1, 0),
            Utc::now(),
            &SchedulePolicy::default(),
        );
        assert_eq!(mastered, None);
    }

    #[test]
    fn test_custom_thresholds() {
        let policy = SchedulePolicy {
            mastery_repetitions: 2,
            mastery_interval_days: 7,
            ..SchedulePolicy::default()
        };
        assert!(qualifies(&state(7, 2), &policy));
        assert!(!qualifies(&state(6, 2), &policy));
    }
}
