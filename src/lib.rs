//! # Ferry
//!
//! Scrapes WooCommerce product pages and imports them into a local catalog.
//!
//! ## Architecture
//!
//! ```text
//! URL → Fetcher → Dom → ProductExtractor → ProductDocument → Importer → Catalog
//! ```
//!
//! - [`fetcher`]: HTTP client used for pages and images
//! - [`scrape`]: HTML parsing and product extraction
//! - [`importer`]: Create-or-update reconciliation by SKU
//! - [`store`]: SQLite catalog
//!
//! ## Quick Start
//!
//! ```bash
//! # Inspect what would be imported
//! ferry scrape https://www.d8austin.com/product/delta-8-gummies/
//!
//! # Import one product
//! ferry import https://www.d8austin.com/product/delta-8-gummies/ --brand "D8 Austin"
//!
//! # Import a list of products
//! ferry batch --file urls.txt
//!
//! # Show what was imported
//! ferry history
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the catalog,
/// fetcher and configuration.
pub mod app;

/// Sequential batch imports with pacing between requests.
pub mod batch;

/// Command-line interface using clap.
///
/// - `scrape <url>` - Print the extracted product as JSON
/// - `import <url>` - Scrape and import one product
/// - `batch [urls...] [--file]` - Import many products
/// - `list` - List catalog products
/// - `history` - Show recent imports
pub mod cli;

/// Configuration loaded from `~/.config/ferry/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`ProductDocument`](domain::ProductDocument): What a product page yields
/// - [`CatalogProduct`](domain::CatalogProduct): A stored catalog entry
/// - [`BatchReport`](domain::BatchReport): Outcome of a batch import
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for fetching URLs
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Reconciles scraped products into the catalog.
pub mod importer;

/// Product page scraping.
pub mod scrape;

/// SQLite catalog.
///
/// - [`Catalog`](store::Catalog): Trait defining catalog operations
/// - [`SqliteCatalog`](store::SqliteCatalog): SQLite implementation
pub mod store;
