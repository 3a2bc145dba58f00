//! Due / pending / mastered counts
//!
//! Mastered items count only as mastered; everything else is pending, and
//! pending items on or past their date are also due.

use chrono::NaiveDate;

use super::models::{ReviewItem, ReviewStats};

/// Count due, pending and mastered items in one owner's snapshot
pub fn aggregate(items: &[ReviewItem], today: NaiveDate) -> ReviewStats {
    let mut stats = ReviewStats::default();

    for item in items {
        if item.is_mastered() {
            stats.total_mastered += 1;
            continue;
        }

        stats.total_pending += 1;
        if item.is_due(today) {
            stats.due_today += 1;
        }
    }

    stats
}
