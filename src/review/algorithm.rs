//! Interval / ease update rule
//!
//! A three-grade variant of SM-2 tuned for re-studying missed exam questions:
//! - wrong: back to a one day interval, ease drops by 0.2
//! - hard:  interval grows by 1.5x, ease drops by 0.05
//! - easy:  interval grows by the ease factor, ease rises by 0.05
//!
//! Ease stays within [1.3, 3.0]. Intervals are rounded half up to whole days.
//!
//! Everything here is pure. `today` is always passed in by the caller.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::models::{Quality, ScheduleState};

/// Tolerance applied before rounding so `10 * 2.55` rounds like the decimal value
const ROUNDING_EPSILON: f64 = 1e-9;

/// Ease factors are kept to four decimal places
const EASE_SCALE: f64 = 10_000.0;

/// Tunable constants of the update rule and the mastery gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulePolicy {
    pub initial_ease: f64,
    pub min_ease: f64,
    pub max_ease: f64,
    pub fail_ease_penalty: f64,
    pub hard_ease_penalty: f64,
    pub easy_ease_bonus: f64,
    pub hard_multiplier: f64,
    pub mastery_repetitions: u32,
    pub mastery_interval_days: u32,
    pub max_interval_days: u32,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            min_ease: 1.3,
            max_ease: 3.0,
            fail_ease_penalty: 0.2,
            hard_ease_penalty: 0.05,
            easy_ease_bonus: 0.05,
            hard_multiplier: 1.5,
            mastery_repetitions: 5,
            mastery_interval_days: 21,
            max_interval_days: 36_500,
        }
    }
}

/// Result of applying one quality report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewResult {
    pub state: ScheduleState,
    pub next_review_date: NaiveDate,
}

/// Calculate the state after a review graded `quality` on `today`
pub fn calculate_next_review(
    state: &ScheduleState,
    quality: Quality,
    today: NaiveDate,
    policy: &SchedulePolicy,
) -> ReviewResult {
    let max_interval = policy.max_interval_days.max(1);
    let interval = state.interval.clamp(1, max_interval);
    let ease = sanitize_ease(state.ease_factor, policy);

    let (interval, repetition_count, ease_factor) = match quality {
        Quality::Fail => (
            1,
            0,
            (ease - policy.fail_ease_penalty).max(policy.min_ease),
        ),
        Quality::Hard => (
            scale_interval(interval, policy.hard_multiplier, max_interval),
            state.repetition_count.saturating_add(1),
            (ease - policy.hard_ease_penalty).max(policy.min_ease),
        ),
        // Easy never schedules sooner than hard would, even on a worn-down ease
        Quality::Easy => (
            scale_interval(interval, ease.max(policy.hard_multiplier), max_interval),
            state.repetition_count.saturating_add(1),
            (ease + policy.easy_ease_bonus).min(policy.max_ease),
        ),
    };

    ReviewResult {
        state: ScheduleState {
            interval,
            repetition_count,
            ease_factor: normalize_ease(ease_factor).max(policy.min_ease),
        },
        next_review_date: add_days(today, interval),
    }
}

/// Projected results for every quality, in `Quality::ALL` order
pub fn preview_outcomes(
    state: &ScheduleState,
    today: NaiveDate,
    policy: &SchedulePolicy,
) -> [ReviewResult; 3] {
    Quality::ALL.map(|quality| calculate_next_review(state, quality, today, policy))
}

/// Round half up to a whole number of days
pub fn round_days(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let rounded = (value + 0.5 + ROUNDING_EPSILON).floor();
    if rounded >= u32::MAX as f64 {
        u32::MAX
    } else {
        rounded as u32
    }
}

/// `date + days`, saturating at the end of the calendar
pub fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(days as u64))
        .unwrap_or(NaiveDate::MAX)
}

fn scale_interval(interval: u32, multiplier: f64, max_interval: u32) -> u32 {
    round_days(interval as f64 * multiplier).clamp(1, max_interval)
}

fn sanitize_ease(ease: f64, policy: &SchedulePolicy) -> f64 {
    let ease = if ease.is_finite() {
        ease
    } else {
        policy.initial_ease
    };
    ease.clamp(policy.min_ease, policy.max_ease.max(policy.min_ease))
}

fn normalize_ease(ease: f64) -> f64 {
    (ease * EASE_SCALE).round() / EASE_SCALE
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{}d", days),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state(interval: u32, repetition_count: u32, ease_factor: f64) -> ScheduleState {
        ScheduleState {
            interval,
            repetition_count,
            ease_factor,
        }
    }

    fn review(s: ScheduleState, quality: Quality, today: NaiveDate) -> ReviewResult {
        calculate_next_review(&s, quality, today, &SchedulePolicy::default())
    }

    #[test]
    fn test_easy_grows_by_ease_before_bonus() {
        let result = review(state(1, 0, 2.5), Quality::Easy, date(2024, 1, 2));

        assert_eq!(result.state.interval, 3);
        assert_eq!(result.state.repetition_count, 1);
        assert_eq!(result.state.ease_factor, 2.55);
        assert_eq!(result.next_review_date, date(2024, 1, 5));
    }

    #[test]
    fn test_hard_grows_by_one_and_a_half() {
        let result = review(state(3, 1, 2.55), Quality::Hard, date(2024, 1, 5));

        // 3 * 1.5 = 4.5 rounds up
        assert_eq!(result.state.interval, 5);
        assert_eq!(result.state.repetition_count, 2);
        assert_eq!(result.state.ease_factor, 2.5);
        assert_eq!(result.next_review_date, date(2024, 1, 10));
    }

    #[test]
    fn test_fail_resets() {
        let result = review(state(5, 2, 2.5), Quality::Fail, date(2024, 1, 10));

        assert_eq!(result.state.interval, 1);
        assert_eq!(result.state.repetition_count, 0);
        assert_eq!(result.state.ease_factor, 2.3);
        assert_eq!(result.next_review_date, date(2024, 1, 11));
    }

    #[test]
    fn test_hard_on_first_interval() {
        let result = review(state(1, 0, 2.5), Quality::Hard, date(2024, 1, 1));
        assert_eq!(result.state.interval, 2);
    }

    #[test]
    fn test_ease_floor_and_ceiling() {
        let low = review(state(4, 3, 1.35), Quality::Fail, date(2024, 1, 1));
        assert_eq!(low.state.ease_factor, 1.3);

        let low_hard = review(state(4, 3, 1.3), Quality::Hard, date(2024, 1, 1));
        assert_eq!(low_hard.state.ease_factor, 1.3);

        let high = review(state(4, 3, 2.98), Quality::Easy, date(2024, 1, 1));
        assert_eq!(high.state.ease_factor, 3.0);
    }

    #[test]
    fn test_easy_not_shorter_than_hard_on_low_ease() {
        let s = state(10, 4, 1.3);
        let hard = review(s, Quality::Hard, date(2024, 1, 1));
        let easy = review(s, Quality::Easy, date(2024, 1, 1));

        assert_eq!(hard.state.interval, 15);
        assert_eq!(easy.state.interval, 15);
        assert_eq!(easy.state.ease_factor, 1.35);
    }

    #[test]
    fn test_rounding_is_half_up_on_decimal_value() {
        assert_eq!(round_days(7.5), 8);
        assert_eq!(round_days(7.49), 7);
        // 10 * 2.55 is 25.499999999999996 in binary
        assert_eq!(round_days(10.0 * 2.55), 26);
        assert_eq!(round_days(0.0), 0);
        assert_eq!(round_days(f64::NAN), 0);
    }

    #[test]
    fn test_degenerate_inputs_are_clamped() {
        let zero_interval = review(state(0, 0, 2.5), Quality::Easy, date(2024, 1, 1));
        assert_eq!(zero_interval.state.interval, 3);

        let nan_ease = review(state(2, 1, f64::NAN), Quality::Easy, date(2024, 1, 1));
        assert_eq!(nan_ease.state.interval, 5);
        assert_eq!(nan_ease.state.ease_factor, 2.55);

        let below_floor = review(state(2, 1, 0.4), Quality::Easy, date(2024, 1, 1));
        assert!(below_floor.state.ease_factor >= 1.3);
        assert!(below_floor.state.interval >= 2);
    }

    #[test]
    fn test_interval_capped_and_date_saturates() {
        let policy = SchedulePolicy::default();
        let result = calculate_next_review(
            &state(u32::MAX, 40, 3.0),
            Quality::Easy,
            date(2024, 1, 1),
            &policy,
        );
        assert_eq!(result.state.interval, policy.max_interval_days);

        let end = add_days(NaiveDate::MAX, 10);
        assert_eq!(end, NaiveDate::MAX);
    }

    #[test]
    fn test_preview_matches_individual_calls() {
        let s = state(6, 2, 2.1);
        let today = date(2024, 6, 1);
        let policy = SchedulePolicy::default();
        let [fail, hard, easy] = preview_outcomes(&s, today, &policy);

        assert_eq!(fail, calculate_next_review(&s, Quality::Fail, today, &policy));
        assert_eq!(hard, calculate_next_review(&s, Quality::Hard, today, &policy));
        assert_eq!(easy, calculate_next_review(&s, Quality::Easy, today, &policy));
    }

    #[test]
    fn test_custom_policy() {
        let policy = SchedulePolicy {
            hard_multiplier: 2.0,
            fail_ease_penalty: 0.3,
            ..SchedulePolicy::default()
        };
        let today = date(2024, 1, 1);

        let hard = calculate_next_review(&state(4, 1, 2.5), Quality::Hard, today, &policy);
        assert_eq!(hard.state.interval, 8);

        let fail = calculate_next_review(&state(4, 1, 2.5), Quality::Fail, today, &policy);
        assert_eq!(fail.state.ease_factor, 2.2);
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(5), "5d");
        assert_eq!(format_interval(7), "1w");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(30), "1mo");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(365), "1y");
        assert_eq!(format_interval(730), "2y");
    }

    fn arb_quality() -> impl Strategy<Value = Quality> {
        prop_oneof![Just(Quality::Fail), Just(Quality::Hard), Just(Quality::Easy)]
    }

    fn arb_state() -> impl Strategy<Value = ScheduleState> {
        (0u32..5_000, 0u32..200, 0.5f64..4.0).prop_map(|(interval, reps, ease)| ScheduleState {
            interval,
            repetition_count: reps,
            ease_factor: ease,
        })
    }

    fn arb_today() -> impl Strategy<Value = NaiveDate> {
        (0u64..40_000).prop_map(|offset| date(2000, 1, 1) + Days::new(offset))
    }

    proptest! {
        #[test]
        fn prop_deterministic(s in arb_state(), q in arb_quality(), today in arb_today()) {
            let policy = SchedulePolicy::default();
            let a = calculate_next_review(&s, q, today, &policy);
            let b = calculate_next_review(&s, q, today, &policy);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_invariants_hold(s in arb_state(), q in arb_quality(), today in arb_today()) {
            let policy = SchedulePolicy::default();
            let r = calculate_next_review(&s, q, today, &policy);
            prop_assert!(r.state.interval >= 1);
            prop_assert!(r.state.ease_factor >= policy.min_ease);
            prop_assert!(r.state.ease_factor <= policy.max_ease);
            prop_assert_eq!(r.next_review_date, add_days(today, r.state.interval));
        }

        #[test]
        fn prop_fail_always_resets(s in arb_state(), today in arb_today()) {
            let r = calculate_next_review(&s, Quality::Fail, today, &SchedulePolicy::default());
            prop_assert_eq!(r.state.interval, 1);
            prop_assert_eq!(r.state.repetition_count, 0);
            prop_assert_eq!(r.next_review_date, add_days(today, 1));
        }

        #[test]
        fn prop_growth_ordering(s in arb_state(), today in arb_today()) {
            let policy = SchedulePolicy::default();
            let [fail, hard, easy] = preview_outcomes(&s, today, &policy);
            prop_assert_eq!(fail.state.interval, 1);
            prop_assert!(hard.state.interval >= fail.state.interval);
            prop_assert!(easy.state.interval >= hard.state.interval);
        }
    }
}
