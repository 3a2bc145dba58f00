use anyhow::Result;
use uuid::Uuid;

use recall_lib::review::EnqueueRequest;

use crate::app::App;
use crate::render::terminal::{item_details, paint, Color};
use crate::OutputFormat;

pub async fn run(
    app: &App,
    source: Uuid,
    subject: Option<Uuid>,
    topic: Option<Uuid>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let item = app
        .enqueue(EnqueueRequest {
            source_question_ref: source,
            subject_ref: subject,
            topic_ref: topic,
        })
        .await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        OutputFormat::Plain => {
            println!(
                "{} question {}",
                paint("Queued", Color::BOLD, use_color),
                item.source_question_ref
            );
            for line in item_details(&item, use_color) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
