use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub async fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let stats = app.stats().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Plain => {
            println!("Due today:  {}", stats.due_today);
            println!("Pending:    {}", stats.total_pending);
            println!("Mastered:   {}", stats.total_mastered);
            println!("Total:      {}", stats.total());
        }
    }

    Ok(())
}
