use anyhow::Result;
use uuid::Uuid;

use recall_lib::review::{Quality, SubmitReview};

use crate::app::App;
use crate::render::terminal::{item_details, paint, quality_label, Color};
use crate::OutputFormat;

pub async fn run(
    app: &App,
    item_id: Uuid,
    quality: &str,
    expected_version: Option<u64>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let request = SubmitReview {
        item_id,
        quality: quality.to_string(),
        expected_version,
    };
    let item = app.submit(request).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        OutputFormat::Plain => {
            // Parsing already succeeded inside submit
            let label = quality
                .parse::<Quality>()
                .map(|q| quality_label(q, use_color))
                .unwrap_or_else(|_| quality.to_string());
            println!("{} as {}", paint("Reviewed", Color::BOLD, use_color), label);
            for line in item_details(&item, use_color) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
