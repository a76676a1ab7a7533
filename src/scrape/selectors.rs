//! CSS selectors for the storefront's WooCommerce/Divi product template.
//!
//! Update this file when the storefront changes its markup.

use scraper::Selector;
use std::sync::LazyLock;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e}"))
}

pub static H1: LazyLock<Selector> = LazyLock::new(|| selector("h1"));

pub static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));

/// Sale tier: the replacement price shown next to a struck-through one.
pub static SALE_PRICE: LazyLock<Selector> =
    LazyLock::new(|| selector("p.price ins span.woocommerce-Price-amount.amount"));

/// Regular tier while on sale: the struck-through price.
pub static STRUCK_PRICE: LazyLock<Selector> =
    LazyLock::new(|| selector("p.price del span.woocommerce-Price-amount.amount"));

/// Any price amount in the container; the regular tier when not on sale.
pub static PRICE: LazyLock<Selector> =
    LazyLock::new(|| selector("p.price span.woocommerce-Price-amount.amount"));

pub static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector("div.et_pb_wc_description div.et_pb_module_inner"));

pub static DESCRIPTION_PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| selector("div.et_pb_wc_description p"));

pub static GALLERY_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector("div.woocommerce-product-gallery__image a"));

pub static IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));

pub static ATTRIBUTE_SELECT: LazyLock<Selector> =
    LazyLock::new(|| selector("select[name*=\"attribute_\"]"));

pub static OPTION: LazyLock<Selector> = LazyLock::new(|| selector("option"));

pub static LABEL: LazyLock<Selector> = LazyLock::new(|| selector("label[for]"));
