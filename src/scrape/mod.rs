//! Product page scraping.
//!
//! # Architecture
//!
//! ```text
//! URL → Fetcher → raw HTML → Dom → ProductExtractor (+ VariationDecoder) → ProductDocument
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use ferry::scrape::{ProductScraper, ScraperConfig};
//!
//! let scraper = ProductScraper::new(fetcher, ScraperConfig::default());
//! let doc = scraper.scrape_product("https://www.d8austin.com/product/gummies/").await?;
//! ```

mod config;
pub mod dom;
#[cfg(test)]
pub mod fixtures;
pub mod extractor;
pub mod selectors;
pub mod variations;

pub use config::ScraperConfig;
pub use dom::Dom;
pub use extractor::ProductExtractor;
pub use variations::VariationDecoder;

use std::sync::Arc;

use url::Url;

use crate::app::ScrapeError;
use crate::domain::ProductDocument;
use crate::fetcher::Fetcher;

/// Fetches a product page and turns it into a [`ProductDocument`].
pub struct ProductScraper {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    config: ScraperConfig,
    extractor: ProductExtractor,
}

impl ProductScraper {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, config: ScraperConfig) -> Self {
        Self {
            fetcher,
            config,
            extractor: ProductExtractor::new(),
        }
    }

    pub async fn scrape_product(&self, url: &str) -> Result<ProductDocument, ScrapeError> {
        let parsed = Url::parse(url).map_err(|source| ScrapeError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        if !self.config.allows(&parsed) {
            return Err(ScrapeError::DisallowedDomain(url.to_string()));
        }

        let body = self.fetcher.fetch(url).await?;
        let html = String::from_utf8_lossy(&body);
        if html.trim().is_empty() {
            return Err(ScrapeError::NotAProductPage(url.to_string()));
        }

        let dom = Dom::parse(&html);
        let doc = self.extractor.extract(&dom, &html, url);

        tracing::info!(
            "Scraped {} ({}, sku {}, {} images, {} variations)",
            doc.title,
            doc.product_type(),
            doc.sku,
            doc.images.len(),
            doc.variations.len()
        );

        Ok(doc)
    }
}
