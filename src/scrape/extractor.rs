//! Field extractors for storefront product pages.
//!
//! Every extractor falls back on its own; a page missing a field still
//! produces a document with that field's default.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use url::Url;

use crate::domain::product::UNTITLED_PRODUCT;
use crate::domain::{ImageRef, ProductDocument};
use crate::scrape::dom::{attr, first_within, Dom};
use crate::scrape::selectors;
use crate::scrape::variations::VariationDecoder;

pub const MAX_SKU_LEN: usize = 20;
pub const SHORT_DESCRIPTION_LIMIT: usize = 300;
const SHORT_DESCRIPTION_CUT: usize = SHORT_DESCRIPTION_LIMIT - 3;

static PRICE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\d,.]+").unwrap());
static SITE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" - .*$").unwrap());
static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap());
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style>").unwrap());
static EMPTY_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(\w+)[^>]*>\s*</(\w+)>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Builds a [`ProductDocument`] from a parsed product page.
#[derive(Clone, Default)]
pub struct ProductExtractor {
    variations: VariationDecoder,
}

impl ProductExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `raw_html` is the unparsed page; the variation payload is read from it directly.
    pub fn extract(&self, dom: &Dom, raw_html: &str, source_url: &str) -> ProductDocument {
        let variations = self.variations.decode_variations(raw_html);
        let attributes = self.variations.decode_attributes(dom, &variations);

        let sale_price = extract_sale_price(dom);
        let regular_price = extract_regular_price(dom);

        ProductDocument {
            title: extract_title(dom),
            source_url: source_url.to_string(),
            sku: sku_from_url(source_url),
            price: sale_price.unwrap_or(regular_price),
            regular_price,
            sale_price,
            description: extract_description(dom),
            short_description: extract_short_description(dom),
            images: extract_images(dom),
            attributes,
            variations,
        }
    }
}

pub fn extract_title(dom: &Dom) -> String {
    if let Some(title) = dom.first_text(&selectors::H1).filter(|t| !t.is_empty()) {
        return title;
    }

    if let Some(title) = dom.first_text(&selectors::TITLE) {
        let title = SITE_SUFFIX.replace(&title, "").trim().to_string();
        if !title.is_empty() {
            return title;
        }
    }

    UNTITLED_PRODUCT.to_string()
}

/// First number in a price label, commas dropped: `"$1,299.00"` → `1299.00`.
pub fn parse_price(text: &str) -> Option<Decimal> {
    let number = PRICE_NUMBER.find(text)?.as_str().replace(',', "");
    Decimal::from_str(&number).ok()
}

pub fn extract_sale_price(dom: &Dom) -> Option<Decimal> {
    dom.first_text(&selectors::SALE_PRICE)
        .and_then(|text| parse_price(&text))
}

/// Struck-through price when on sale, else the plain price; zero when absent.
pub fn extract_regular_price(dom: &Dom) -> Decimal {
    dom.first_text(&selectors::STRUCK_PRICE)
        .and_then(|text| parse_price(&text))
        .or_else(|| {
            dom.first_text(&selectors::PRICE)
                .and_then(|text| parse_price(&text))
        })
        .unwrap_or(Decimal::ZERO)
}

pub fn extract_description(dom: &Dom) -> String {
    dom.first(&selectors::DESCRIPTION)
        .map(|block| clean_html(&block.inner_html()))
        .unwrap_or_default()
}

pub fn extract_short_description(dom: &Dom) -> String {
    dom.first_text(&selectors::DESCRIPTION_PARAGRAPH)
        .map(|text| truncate_with_ellipsis(&text))
        .unwrap_or_default()
}

fn truncate_with_ellipsis(text: &str) -> String {
    if text.chars().count() <= SHORT_DESCRIPTION_LIMIT {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(SHORT_DESCRIPTION_CUT).collect();
    cut.push_str("...");
    cut
}

/// Strips scripts, styles and empty tag pairs, then collapses whitespace.
pub fn clean_html(html: &str) -> String {
    let html = SCRIPT_BLOCK.replace_all(html, "");
    let html = STYLE_BLOCK.replace_all(&html, "");
    let html = EMPTY_PAIR.replace_all(&html, |caps: &regex::Captures<'_>| {
        if caps[1] == caps[2] {
            String::new()
        } else {
            caps[0].to_string()
        }
    });
    WHITESPACE.replace_all(&html, " ").trim().to_string()
}

pub fn extract_images(dom: &Dom) -> Vec<ImageRef> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for link in dom.select(&selectors::GALLERY_LINK) {
        let Some(img) = first_within(link, &selectors::IMG) else {
            continue;
        };

        let url = attr(link, "href")
            .or_else(|| attr(img, "data-large_image"))
            .or_else(|| attr(img, "src"));

        let Some(url) = url.filter(|u| is_absolute_url(u)) else {
            continue;
        };

        if seen.insert(url.to_string()) {
            images.push(ImageRef::new(url, img.value().attr("alt").unwrap_or_default()));
        }
    }

    images
}

fn is_absolute_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|u| u.host_str().is_some())
        .unwrap_or(false)
}

/// Deterministic SKU: the URL's last path segment, alphanumerics only,
/// upper-cased, at most 20 characters.
pub fn sku_from_url(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    let slug = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();

    slug.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(MAX_SKU_LEN)
        .collect()
}
