use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{ProductType, StockStatus};

/// Product page URL the entity was scraped from.
pub const META_SOURCE_URL: &str = "_source_url";
/// Set once, when the entity is first created by an import.
pub const META_IMPORTED_AT: &str = "_imported_date";
/// Refreshed on every import that updates an existing entity.
pub const META_UPDATED_AT: &str = "_updated_date";
/// The storefront's own id for a variation.
pub const META_SOURCE_VARIATION_ID: &str = "_source_variation_id";

/// Timestamp format used for the import/update metadata values.
pub const META_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Simple,
    Variable,
    Variation,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Simple => "simple",
            CatalogKind::Variable => "variable",
            CatalogKind::Variation => "variation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "simple" => Some(CatalogKind::Simple),
            "variable" => Some(CatalogKind::Variable),
            "variation" => Some(CatalogKind::Variation),
            _ => None,
        }
    }

    /// The document type this catalog entity corresponds to, if it is a parent product.
    pub fn product_type(&self) -> Option<ProductType> {
        match self {
            CatalogKind::Simple => Some(ProductType::Simple),
            CatalogKind::Variable => Some(ProductType::Variable),
            CatalogKind::Variation => None,
        }
    }
}

impl From<ProductType> for CatalogKind {
    fn from(kind: ProductType) -> Self {
        match kind {
            ProductType::Simple => CatalogKind::Simple,
            ProductType::Variable => CatalogKind::Variable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Draft,
    Publish,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Publish => "publish",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ProductStatus::Draft),
            "publish" => Some(ProductStatus::Publish),
            _ => None,
        }
    }
}

/// A product or variation as stored in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: i64,
    pub kind: CatalogKind,
    pub parent_id: Option<i64>,
    pub status: ProductStatus,
    pub name: String,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub regular_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub description: String,
    pub short_description: String,
    pub stock_status: StockStatus,
    pub image_id: Option<i64>,
    pub gallery_ids: Vec<i64>,
    pub brand: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogProduct {
    pub fn display_sku(&self) -> &str {
        self.sku.as_deref().unwrap_or("-")
    }
}

/// Writable fields of a parent product.
///
/// `None` prices leave the stored value unchanged on update.
#[derive(Debug, Clone, Default)]
pub struct ProductFields {
    pub name: String,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub regular_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub description: String,
    pub short_description: String,
}

/// Writable fields of a single variation.
#[derive(Debug, Clone)]
pub struct VariationFields {
    pub name: String,
    pub sku: Option<String>,
    pub price: Decimal,
    pub regular_price: Decimal,
    pub stock_status: StockStatus,
    pub image_id: Option<i64>,
    pub attribute_values: BTreeMap<String, String>,
}

/// A binary asset (image) to be stored in the catalog.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub alt_text: String,
    pub source_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub filename: String,
    pub alt_text: String,
    pub source_url: String,
    pub content_hash: String,
    pub size: usize,
    pub created_at: DateTime<Utc>,
}
