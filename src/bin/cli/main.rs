mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "recall-cli", about = "Spaced review of missed exam questions", version)]
struct Cli {
    /// Student whose items to work on (or set RECALL_OWNER)
    #[arg(long, global = true, env = "RECALL_OWNER")]
    owner: Option<Uuid>,

    /// Config file (default: <config dir>/recall/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory from the config
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Queue a missed question for spaced review
    Enqueue {
        /// Id of the wrong-answer record
        source: Uuid,
        /// Subject the question belongs to
        #[arg(long)]
        subject: Option<Uuid>,
        /// Topic the question belongs to
        #[arg(long)]
        topic: Option<Uuid>,
    },

    /// Show today's due items and counts
    Due,

    /// Grade one item: easy, hard or wrong
    Review {
        /// Review item id
        item: Uuid,
        /// easy | hard | wrong
        quality: String,
        /// Version you last saw; rejects the review if the item changed since
        #[arg(long)]
        expected_version: Option<u64>,
    },

    /// Show what each grade would schedule, without saving
    Preview {
        /// Review item id
        item: Uuid,
    },

    /// Due / pending / mastered counts
    Stats,

    /// Drop review items after their source question was deleted
    RemoveSource {
        /// Id of the deleted wrong-answer record
        source: Uuid,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();

    let app = app::App::new(cli.config.as_deref(), cli.data_dir, cli.owner)?;

    match cli.command {
        Command::Enqueue { source, subject, topic } => {
            commands::enqueue::run(&app, source, subject, topic, &cli.format, use_color).await?;
        }
        Command::Due => {
            commands::due::run(&app, &cli.format, use_color).await?;
        }
        Command::Review { item, quality, expected_version } => {
            commands::review::run(&app, item, &quality, expected_version, &cli.format, use_color)
                .await?;
        }
        Command::Preview { item } => {
            commands::preview::run(&app, item, &cli.format, use_color).await?;
        }
        Command::Stats => {
            commands::stats::run(&app, &cli.format).await?;
        }
        Command::RemoveSource { source } => {
            commands::remove::run(&app, source, &cli.format).await?;
        }
        Command::Config => {
            print!("{}", app.config_toml()?);
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal()
}
