pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ferry")]
#[command(about = "Scrape storefront product pages into a local catalog", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/ferry/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the catalog database
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape a product page and print the result as JSON
    Scrape {
        /// URL of the product page
        url: String,
    },
    /// Scrape a product page and import it into the catalog
    Import {
        /// URL of the product page
        url: String,

        /// Brand assigned to the imported product
        #[arg(short, long)]
        brand: Option<String>,
    },
    /// Import many product pages, one after another
    Batch {
        /// Product page URLs
        urls: Vec<String>,

        /// File with one URL per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Brand assigned to every imported product
        #[arg(short, long)]
        brand: Option<String>,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List products in the catalog
    List,
    /// Show recently imported products
    History {
        /// Maximum number of entries
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}
