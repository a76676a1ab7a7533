pub mod config;
pub mod http_fetcher;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;

use crate::app::FetchError;

pub use config::FetcherConfig;
pub use http_fetcher::HttpFetcher;

/// Retrieves raw bytes for a URL: product pages and gallery images alike.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
