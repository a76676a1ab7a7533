//! Sequential scrape-and-import over a list of URLs.
//!
//! Every URL is attempted exactly once, in input order. A failing URL is
//! recorded in the [`BatchReport`] and the run moves on.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::app::ErrorKind;
use crate::domain::{BatchReport, ImportFailure, ImportResult, ImportSuccess};
use crate::importer::Importer;
use crate::scrape::ProductScraper;
use crate::store::Catalog;

pub const DEFAULT_MIN_INTERVAL_MS: u64 = 500;

/// `[batch]` section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Minimum time between the start of two consecutive imports.
    pub min_interval_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
        }
    }
}

impl BatchConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// Pacing between requests to the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub min_interval: Duration,
}

impl RatePolicy {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval }
    }

    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Waits until `min_interval` has passed since `last_start`.
    async fn pace(&self, last_start: Option<Instant>) {
        if self.min_interval.is_zero() {
            return;
        }
        if let Some(last) = last_start {
            let ready_at = last + self.min_interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
    }
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_MIN_INTERVAL_MS))
    }
}

impl From<&BatchConfig> for RatePolicy {
    fn from(config: &BatchConfig) -> Self {
        Self::new(config.min_interval())
    }
}

/// Progress notification emitted after each URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub processed: usize,
    pub total: usize,
    pub url: String,
    pub succeeded: bool,
}

pub struct BatchRunner<C: Catalog> {
    scraper: ProductScraper,
    importer: Importer<C>,
    rate: RatePolicy,
}

impl<C: Catalog> BatchRunner<C> {
    pub fn new(scraper: ProductScraper, importer: Importer<C>) -> Self {
        Self {
            scraper,
            importer,
            rate: RatePolicy::default(),
        }
    }

    pub fn with_rate(mut self, rate: RatePolicy) -> Self {
        self.rate = rate;
        self
    }

    /// Scrapes and imports a single URL, capturing any failure.
    pub async fn import_url(&self, url: &str) -> ImportResult {
        let doc = match self.scraper.scrape_product(url).await {
            Ok(doc) => doc,
            Err(e) => return failure(url, ErrorKind::from(&e), e.to_string()),
        };

        match self.importer.import_product(&doc).await {
            Ok(catalog_id) => ImportResult::Success(ImportSuccess {
                url: url.to_string(),
                catalog_id,
                title: doc.title,
            }),
            Err(e) => failure(url, ErrorKind::from(&e), e.to_string()),
        }
    }

    /// Imports every non-blank URL, calling `on_progress` after each one.
    pub async fn run<I, S, F>(&self, urls: I, mut on_progress: F) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(&BatchProgress),
    {
        let urls: Vec<String> = urls
            .into_iter()
            .map(|u| u.as_ref().trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();

        let mut report = BatchReport {
            total: urls.len(),
            ..Default::default()
        };
        tracing::info!("Starting batch import of {} URLs", report.total);

        let mut last_start = None;
        for url in &urls {
            self.rate.pace(last_start).await;
            last_start = Some(Instant::now());

            let result = self.import_url(url).await;
            let succeeded = result.is_success();
            match &result {
                ImportResult::Success(s) => {
                    tracing::info!("Imported {} as product {}", s.url, s.catalog_id)
                }
                ImportResult::Failure(f) => {
                    tracing::warn!("Failed to import {} ({}): {}", f.url, f.kind, f.message)
                }
            }

            let progress = BatchProgress {
                processed: report.processed() + 1,
                total: report.total,
                url: result.url().to_string(),
                succeeded,
            };
            report.record(result);
            tracing::debug!("Progress {}/{}", progress.processed, progress.total);
            on_progress(&progress);
        }

        tracing::info!(
            "Batch import finished: {} succeeded, {} failed",
            report.successes.len(),
            report.failures.len()
        );
        report
    }
}

fn failure(url: &str, kind: ErrorKind, message: String) -> ImportResult {
    ImportResult::Failure(ImportFailure {
        url: url.to_string(),
        kind,
        message,
    })
}
