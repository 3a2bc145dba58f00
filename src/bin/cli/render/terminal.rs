use chrono::NaiveDate;
use uuid::Uuid;

use recall_lib::review::algorithm::format_interval;
use recall_lib::review::{Quality, ReviewItem, ReviewStats};

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
}

/// Wrap `text` in `color` when colors are on
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

pub fn quality_label(quality: Quality, use_color: bool) -> String {
    let color = match quality {
        Quality::Fail => Color::RED,
        Quality::Hard => Color::YELLOW,
        Quality::Easy => Color::GREEN,
    };
    paint(quality.as_str(), color, use_color)
}

/// "3 days overdue", "due today", "in 4 days"
pub fn due_phrase(next_review_date: NaiveDate, today: NaiveDate) -> String {
    let days = (today - next_review_date).num_days();
    match days {
        0 => "due today".to_string(),
        1 => "1 day overdue".to_string(),
        d if d > 1 => format!("{} days overdue", d),
        -1 => "tomorrow".to_string(),
        d => format!("in {} days", -d),
    }
}

pub fn stats_line(stats: &ReviewStats, use_color: bool) -> String {
    format!(
        "{} due today, {} pending, {} mastered",
        paint(&stats.due_today.to_string(), Color::BOLD, use_color),
        stats.total_pending,
        stats.total_mastered
    )
}

/// One item as a table of its scheduling fields
pub fn item_details(item: &ReviewItem, use_color: bool) -> Vec<String> {
    let mut lines = vec![
        format!("  ID:           {}", item.id),
        format!("  Question:     {}", item.source_question_ref),
        format!(
            "  Interval:     {} ({})",
            item.interval,
            format_interval(item.interval)
        ),
        format!("  Repetitions:  {}", item.repetition_count),
        format!("  Ease:         {:.2}", item.ease_factor),
        format!("  Next review:  {}", item.next_review_date),
        format!("  Version:      {}", item.version),
    ];
    if let Some(mastered_at) = item.mastered_at {
        lines.push(paint(
            &format!("  Mastered:     {}", mastered_at.format("%Y-%m-%d")),
            Color::GREEN,
            use_color,
        ));
    }
    lines
}

/// First block of a UUID, enough to tell items apart on screen
pub fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}
