use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const UNTITLED_PRODUCT: &str = "Untitled Product";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Simple,
    Variable,
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductType::Simple => f.write_str("simple"),
            ProductType::Variable => f.write_str("variable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    InStock,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "instock",
            StockStatus::OutOfStock => "outofstock",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "instock" => Some(StockStatus::InStock),
            "outofstock" => Some(StockStatus::OutOfStock),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub alt_text: String,
}

impl ImageRef {
    pub fn new(url: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt_text: alt_text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeOption {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    pub slug: String,
    pub options: Vec<AttributeOption>,
    pub visible: bool,
    pub variation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationDef {
    /// Attribute slug → selected option slug
    pub attribute_values: BTreeMap<String, String>,
    pub sku: String,
    pub price: Decimal,
    pub regular_price: Decimal,
    pub stock_status: StockStatus,
    pub image: Option<ImageRef>,
    pub original_variation_id: Option<i64>,
    pub display_name: Option<String>,
}

/// Canonical product record scraped from a single storefront page.
///
/// The product type is derived from the variation set, so a document can
/// never claim to be variable without variations (or the reverse).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDocument {
    pub title: String,
    pub source_url: String,
    pub sku: String,
    pub price: Decimal,
    pub regular_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub description: String,
    pub short_description: String,
    pub images: Vec<ImageRef>,
    pub attributes: Vec<AttributeDef>,
    pub variations: Vec<VariationDef>,
}

impl ProductDocument {
    /// A simple product with no prices, text, or images.
    pub fn new(title: impl Into<String>, source_url: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
            sku: sku.into(),
            price: Decimal::ZERO,
            regular_price: Decimal::ZERO,
            sale_price: None,
            description: String::new(),
            short_description: String::new(),
            images: Vec::new(),
            attributes: Vec::new(),
            variations: Vec::new(),
        }
    }

    pub fn product_type(&self) -> ProductType {
        if self.variations.is_empty() {
            ProductType::Simple
        } else {
            ProductType::Variable
        }
    }

    pub fn is_variable(&self) -> bool {
        self.product_type() == ProductType::Variable
    }
}
