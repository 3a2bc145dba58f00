use anyhow::Result;
use uuid::Uuid;

use recall_lib::review::algorithm::format_interval;
use recall_lib::review::Quality;

use crate::app::App;
use crate::render::terminal::{paint, quality_label, Color};
use crate::OutputFormat;

pub async fn run(app: &App, item_id: Uuid, format: &OutputFormat, use_color: bool) -> Result<()> {
    let preview = app.preview(item_id).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&preview)?);
        }
        OutputFormat::Plain => {
            println!("Item {} (version {})", preview.item_id, preview.version);
            for quality in Quality::ALL {
                let outcome = preview.outcome(quality);
                let mastered = if outcome.mastered {
                    paint(" mastered", Color::GREEN, use_color)
                } else {
                    String::new()
                };
                println!("  {:<5} -> {:>4}  next {}  ease {:.2}{}",
                    quality_label(quality, use_color),
                    format_interval(outcome.interval),
                    outcome.next_review_date,
                    outcome.ease_factor,
                    mastered);
            }
        }
    }

    Ok(())
}
