use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::Result;
use crate::batch::{BatchRunner, RatePolicy};
use crate::config::{Config, ConfigError};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::importer::{ImportOptions, Importer};
use crate::scrape::ProductScraper;
use crate::store::sqlite::SqliteCatalog;

pub struct AppContext {
    pub catalog: Arc<SqliteCatalog>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub config: Config,
}

impl AppContext {
    /// Opens the catalog at `db_path`, falling back to the configured path
    /// and then to the default data directory.
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path.or_else(|| config.catalog.database_path.clone()) {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        tracing::debug!("Opening catalog at {}", db_path.display());
        let catalog = Arc::new(SqliteCatalog::new(&db_path)?);
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetcher)?);

        Ok(Self {
            catalog,
            fetcher,
            config,
        })
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let catalog = Arc::new(SqliteCatalog::in_memory()?);
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetcher)?);

        Ok(Self {
            catalog,
            fetcher,
            config,
        })
    }

    pub fn scraper(&self) -> ProductScraper {
        ProductScraper::new(self.fetcher.clone(), self.config.scraper.clone())
    }

    pub fn importer(&self, options: ImportOptions) -> Importer<SqliteCatalog> {
        Importer::new(self.catalog.clone(), self.fetcher.clone()).with_options(options)
    }

    pub fn batch_runner(&self, options: ImportOptions) -> BatchRunner<SqliteCatalog> {
        BatchRunner::new(self.scraper(), self.importer(options))
            .with_rate(RatePolicy::from(&self.config.batch))
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        let ferry_dir = data_dir.join("ferry");
        std::fs::create_dir_all(&ferry_dir)?;
        Ok(ferry_dir.join("ferry.db"))
    }
}
