use anyhow::Result;
use uuid::Uuid;

use crate::app::App;
use crate::OutputFormat;

pub async fn run(app: &App, source: Uuid, format: &OutputFormat) -> Result<()> {
    let removed = app.remove_source(source).await?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "sourceQuestionRef": source.to_string(),
                "removed": removed,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if removed == 0 {
                println!("No review items for question {}.", source);
            } else {
                println!("Removed {} review item(s) for question {}.", removed, source);
            }
        }
    }

    Ok(())
}
