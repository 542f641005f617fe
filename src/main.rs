use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

use quick_compare::coordinator::DEFAULT_MAX_CARDS;
use quick_compare::{ScrapeCoordinator, ScraperConfig, report};

/// Compare grocery prices across quick-commerce storefronts
#[derive(Debug, Parser)]
#[command(name = "quick-compare", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search for a product and compare its prices
    Search {
        /// Product to search for, e.g. "milk" or "eggs 12"
        #[arg(required = true)]
        query: Vec<String>,

        /// Maximum number of products to return (1-20)
        #[arg(short, long, default_value_t = DEFAULT_MAX_CARDS)]
        max_cards: usize,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Show the browser window
        #[arg(long)]
        headful: bool,
    },
    /// Check whether browser automation is available
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ScraperConfig::from_env();

    match cli.command {
        Command::Search {
            query,
            max_cards,
            json,
            headful,
        } => {
            if headful {
                config.headless = false;
            }

            let coordinator = ScrapeCoordinator::new(config)?;
            let result = coordinator.search(&query.join(" "), max_cards).await?;

            let output = if json {
                report::render_json(&result)?
            } else {
                report::render_text(&result)
            };
            println!("{output}");
        }
        Command::Health => {
            info!("Checking browser automation");

            let coordinator = ScrapeCoordinator::new(config)?;
            let available = coordinator.browser_available().await;

            let status = json!({
                "status": if available { "healthy" } else { "partial" },
                "browser_available": available,
                "message": if available {
                    "Browser automation is available"
                } else {
                    "Browser automation unavailable; searches will return sample data"
                },
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}
