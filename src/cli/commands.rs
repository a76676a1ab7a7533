use std::path::Path;

use crate::app::{AppContext, FerryError, Result};
use crate::domain::{CatalogProduct, META_IMPORTED_AT, META_SOURCE_URL};
use crate::importer::ImportOptions;
use crate::store::Catalog;

/// Scrape a single page and print the extracted document as JSON
pub async fn scrape_url(ctx: &AppContext, url: &str) -> Result<()> {
    let doc = ctx.scraper().scrape_product(url).await?;
    let json = serde_json::to_string_pretty(&doc)
        .map_err(|e| FerryError::Other(format!("Could not serialize product: {}", e)))?;
    println!("{}", json);
    Ok(())
}

pub async fn import_url(ctx: &AppContext, url: &str, brand: Option<String>) -> Result<()> {
    let doc = ctx.scraper().scrape_product(url).await?;
    let id = ctx
        .importer(ImportOptions { brand })
        .import_product(&doc)
        .await?;

    println!("Imported {} as product {} ({})", doc.title, id, doc.product_type());
    if doc.is_variable() {
        println!("  {} variations", doc.variations.len());
    }
    Ok(())
}

pub async fn batch_import(
    ctx: &AppContext,
    mut urls: Vec<String>,
    file: Option<&Path>,
    brand: Option<String>,
    json: bool,
) -> Result<()> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)?;
        urls.extend(parse_url_list(&content));
    }

    if urls.iter().all(|u| u.trim().is_empty()) {
        println!("No URLs to import");
        return Ok(());
    }

    let runner = ctx.batch_runner(ImportOptions { brand });
    let report = runner
        .run(&urls, |progress| {
            if !json {
                let marker = if progress.succeeded { "+" } else { "!" };
                println!(
                    "  {} [{}/{}] {}",
                    marker, progress.processed, progress.total, progress.url
                );
            }
        })
        .await;

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| FerryError::Other(format!("Could not serialize report: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    for failure in &report.failures {
        eprintln!("  ! {} - {}: {}", failure.url, failure.kind, failure.message);
    }
    println!(
        "\nBatch complete: {} imported, {} failed, {} total",
        report.successes.len(),
        report.failures.len(),
        report.total
    );
    Ok(())
}

pub fn list_products(ctx: &AppContext) -> Result<()> {
    let products = ctx.catalog.list_products()?;

    if products.is_empty() {
        println!("No products");
        return Ok(());
    }

    for product in products {
        println!(
            "#{} {} [{} {}] sku {} {}",
            product.id,
            product.name,
            product.kind.as_str(),
            product.status.as_str(),
            product.display_sku(),
            price_label(&product)
        );
    }

    Ok(())
}

pub fn show_history(ctx: &AppContext, limit: usize) -> Result<()> {
    let products = ctx.catalog.imported_history(limit)?;

    if products.is_empty() {
        println!("No imports yet");
        return Ok(());
    }

    for product in products {
        let imported = ctx
            .catalog
            .get_metadata(product.id, META_IMPORTED_AT)?
            .unwrap_or_default();
        let source = ctx
            .catalog
            .get_metadata(product.id, META_SOURCE_URL)?
            .unwrap_or_default();
        println!("{} #{} {}\n  {}", imported, product.id, product.name, source);
    }

    Ok(())
}

/// One URL per line; blank lines and `#` comments are ignored
fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

fn price_label(product: &CatalogProduct) -> String {
    match (product.min_price, product.max_price, product.price) {
        (Some(min), Some(max), _) if min != max => format!("${} - ${}", min, max),
        (_, _, Some(price)) => format!("${}", price),
        _ => "no price".to_string(),
    }
}
