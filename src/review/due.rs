//! Due query over one owner's snapshot

use std::cmp::Ordering;

use chrono::NaiveDate;

use super::models::ReviewItem;

/// Select the non-mastered items due on `today`, stalest and weakest first.
///
/// Order: most days overdue, then lowest ease factor, then oldest item, then
/// id. `limit == 0` returns every due item.
pub fn select_due(items: &[ReviewItem], today: NaiveDate, limit: usize) -> Vec<ReviewItem> {
    let mut due: Vec<ReviewItem> = items
        .iter()
        .filter(|item| item.is_due(today))
        .cloned()
        .collect();

    due.sort_by(|a, b| due_order(a, b, today));

    if limit > 0 {
        due.truncate(limit);
    }
    due
}

fn due_order(a: &ReviewItem, b: &ReviewItem, today: NaiveDate) -> Ordering {
    b.overdue_days(today)
        .cmp(&a.overdue_days(today))
        .then_with(|| a.ease_factor.total_cmp(&b.ease_factor))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}
