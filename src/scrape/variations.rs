//! Decoding of variable-product data.
//!
//! WooCommerce embeds every purchasable combination as an entity-encoded
//! JSON array in the `data-product_variations` attribute of the cart form.
//! The matching `<select name="attribute_…">` elements carry the human
//! labels and option names. Anything missing or malformed decodes to an
//! empty set, which makes the page a simple product.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::LazyLock;

use html_escape::decode_html_entities;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::domain::{AttributeDef, AttributeOption, ImageRef, StockStatus, VariationDef};
use crate::scrape::dom::{attr, text_of, Dom};
use crate::scrape::extractor::parse_price;
use crate::scrape::selectors;

const ATTRIBUTE_PREFIX: &str = "attribute_";

static VARIATIONS_PAYLOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)data-product_variations=(?:"([^"]+)"|'([^']+)')"#).unwrap()
});

#[derive(Clone, Default)]
pub struct VariationDecoder;

impl VariationDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode_variations(&self, raw_html: &str) -> Vec<VariationDef> {
        let Some(caps) = VARIATIONS_PAYLOAD.captures(raw_html) else {
            return Vec::new();
        };
        let Some(encoded) = caps.get(1).or_else(|| caps.get(2)) else {
            return Vec::new();
        };

        let json = decode_html_entities(encoded.as_str());
        let payload: Value = match serde_json::from_str(&json) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!("Ignoring unparsable variation payload: {}", e);
                return Vec::new();
            }
        };

        // WooCommerce writes `false` when the set is too large to inline
        let Some(entries) = payload.as_array() else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(Value::as_object)
            .map(decode_entry)
            .collect()
    }

    /// Attribute definitions for a variable product; empty when `variations` is.
    pub fn decode_attributes(&self, dom: &Dom, variations: &[VariationDef]) -> Vec<AttributeDef> {
        if variations.is_empty() {
            return Vec::new();
        }

        let mut labels: HashMap<&str, String> = HashMap::new();
        for label in dom.select(&selectors::LABEL) {
            if let Some(target) = attr(label, "for") {
                labels.entry(target).or_insert_with(|| text_of(label));
            }
        }

        let mut attributes: Vec<AttributeDef> = Vec::new();
        for select in dom.select(&selectors::ATTRIBUTE_SELECT) {
            let Some(name) = attr(select, "name") else {
                continue;
            };
            let slug = attribute_slug(name);
            if attributes.iter().any(|a| a.slug == slug) {
                continue;
            }

            let label = attr(select, "id")
                .and_then(|id| labels.get(id))
                .filter(|l| !l.is_empty())
                .cloned()
                .unwrap_or_else(|| slug.clone());

            let options: Vec<AttributeOption> = select
                .select(&selectors::OPTION)
                .filter_map(|option| {
                    attr(option, "value").map(|value| AttributeOption {
                        slug: value.to_string(),
                        name: text_of(option),
                    })
                })
                .collect();

            if options.is_empty() {
                continue;
            }

            attributes.push(AttributeDef {
                name: label,
                slug,
                options,
                visible: true,
                variation: true,
            });
        }

        synthesize_missing(&mut attributes, variations);
        attributes
    }
}

/// Adds a definition for every variation key that has no selector markup,
/// so each variation only references known attribute slugs.
fn synthesize_missing(attributes: &mut Vec<AttributeDef>, variations: &[VariationDef]) {
    for variation in variations {
        for slug in variation.attribute_values.keys() {
            if attributes.iter().any(|a| &a.slug == slug) {
                continue;
            }

            let mut options: Vec<AttributeOption> = Vec::new();
            for value in variations.iter().filter_map(|v| v.attribute_values.get(slug)) {
                if !value.is_empty() && !options.iter().any(|o| &o.slug == value) {
                    options.push(AttributeOption {
                        slug: value.clone(),
                        name: value.clone(),
                    });
                }
            }

            attributes.push(AttributeDef {
                name: slug.clone(),
                slug: slug.clone(),
                options,
                visible: true,
                variation: true,
            });
        }
    }
}

fn attribute_slug(name: &str) -> String {
    name.replace(ATTRIBUTE_PREFIX, "")
}

fn decode_entry(entry: &Map<String, Value>) -> VariationDef {
    let attribute_values: BTreeMap<String, String> = entry
        .get("attributes")
        .and_then(Value::as_object)
        .map(|attrs| {
            attrs
                .iter()
                .map(|(key, value)| (attribute_slug(key), scalar_text(value)))
                .collect()
        })
        .unwrap_or_default();

    let image = entry
        .get("image")
        .and_then(|image| {
            let url = image.get("url").and_then(Value::as_str)?;
            let alt = image.get("alt").and_then(Value::as_str).unwrap_or_default();
            Some((url, alt))
        })
        .filter(|(url, _)| !url.is_empty())
        .map(|(url, alt)| ImageRef::new(url, alt));

    let stock_status = if entry.get("is_in_stock").and_then(Value::as_bool).unwrap_or(false) {
        StockStatus::InStock
    } else {
        StockStatus::OutOfStock
    };

    VariationDef {
        attribute_values,
        sku: entry
            .get("sku")
            .map(scalar_text)
            .unwrap_or_default(),
        price: decimal_field(entry.get("display_price")),
        regular_price: decimal_field(entry.get("display_regular_price")),
        stock_status,
        image,
        original_variation_id: entry
            .get("variation_id")
            .and_then(Value::as_i64)
            .filter(|id| *id > 0),
        display_name: entry
            .get("display_name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(String::from),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn decimal_field(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .unwrap_or(Decimal::ZERO),
        Some(Value::String(s)) => parse_price(s).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}
