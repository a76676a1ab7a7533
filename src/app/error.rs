use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;

/// Network-level failure while retrieving a page or an image.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {0} timed out")]
    Timeout(String),

    #[error("Could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

impl FetchError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(url.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else if err.is_connect() {
            FetchError::Connect {
                url: url.to_string(),
                reason: err.to_string(),
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("URL {0} is not on an allowed storefront domain")]
    DisallowedDomain(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{0} did not return a product page")]
    NotAProductPage(String),
}

/// Catalog storage failures.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("Catalog lock poisoned: {0}")]
    Lock(String),

    #[error("Corrupt catalog record: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid product data: {0}")]
    InvalidData(String),

    #[error("Failed to save product: {0}")]
    Persistence(#[from] CatalogError),

    #[error("Product {0} not found")]
    NotFound(i64),
}

#[derive(Error, Debug)]
pub enum FerryError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FerryError>;

/// Coarse classification of a failed import, reported per URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Fetch,
    InvalidUrl,
    DisallowedDomain,
    NotAProductPage,
    InvalidData,
    Persistence,
    NotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Fetch => "fetch",
            ErrorKind::InvalidUrl => "invalid_url",
            ErrorKind::DisallowedDomain => "disallowed_domain",
            ErrorKind::NotAProductPage => "not_a_product_page",
            ErrorKind::InvalidData => "invalid_data",
            ErrorKind::Persistence => "persistence",
            ErrorKind::NotFound => "not_found",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ScrapeError> for ErrorKind {
    fn from(err: &ScrapeError) -> Self {
        match err {
            ScrapeError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            ScrapeError::DisallowedDomain(_) => ErrorKind::DisallowedDomain,
            ScrapeError::Fetch(_) => ErrorKind::Fetch,
            ScrapeError::NotAProductPage(_) => ErrorKind::NotAProductPage,
        }
    }
}

impl From<&ImportError> for ErrorKind {
    fn from(err: &ImportError) -> Self {
        match err {
            ImportError::InvalidData(_) => ErrorKind::InvalidData,
            ImportError::Persistence(_) => ErrorKind::Persistence,
            ImportError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}
