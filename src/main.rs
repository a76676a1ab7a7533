use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ferry::app::AppContext;
use ferry::cli::{commands, Cli, Commands};
use ferry::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config, cli.database)?;

    match cli.command {
        Commands::Scrape { url } => {
            commands::scrape_url(&ctx, &url).await?;
        }
        Commands::Import { url, brand } => {
            commands::import_url(&ctx, &url, brand).await?;
        }
        Commands::Batch {
            urls,
            file,
            brand,
            json,
        } => {
            commands::batch_import(&ctx, urls, file.as_deref(), brand, json).await?;
        }
        Commands::List => {
            commands::list_products(&ctx)?;
        }
        Commands::History { limit } => {
            commands::show_history(&ctx, limit)?;
        }
    }

    Ok(())
}
