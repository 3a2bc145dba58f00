use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{due_phrase, paint, short_id, stats_line, Color};
use crate::OutputFormat;

pub async fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let batch = app.due_batch().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&batch)?);
        }
        OutputFormat::Plain => {
            println!("{}", stats_line(&batch.stats, use_color));

            if batch.due_items.is_empty() {
                println!("Nothing to review on {}.", batch.today);
                return Ok(());
            }

            println!();
            println!("{:<10} {:<18} {:>8} {:>6} {:>5}",
                "Item", "Due", "Interval", "Ease", "Reps");
            println!("{} {} {} {} {}",
                "\u{2500}".repeat(10),
                "\u{2500}".repeat(18),
                "\u{2500}".repeat(8),
                "\u{2500}".repeat(6),
                "\u{2500}".repeat(5));

            for item in &batch.due_items {
                let due = format!("{:<18}", due_phrase(item.next_review_date, batch.today));
                println!("{:<10} {} {:>7}d {:>6.2} {:>5}",
                    short_id(item.id),
                    paint(&due, Color::DIM, use_color),
                    item.interval,
                    item.ease_factor,
                    item.repetition_count);
            }

            if batch.due_items.len() < batch.stats.due_today {
                println!("\nShowing {} of {} due items", batch.due_items.len(), batch.stats.due_today);
            }
        }
    }

    Ok(())
}
