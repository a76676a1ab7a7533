//! Image assets for imported products.
//!
//! Images are keyed by their source URL: an image already stored under the
//! same URL is reused instead of being downloaded again. A failed download
//! or store only skips that image.

use url::Url;

use crate::domain::{ImageRef, NewAsset};
use crate::fetcher::Fetcher;
use crate::store::Catalog;

const FALLBACK_FILENAME: &str = "image";

/// Returns the asset id for `image`, downloading and storing it when new.
pub async fn import_image<C: Catalog + ?Sized>(
    catalog: &C,
    fetcher: &(dyn Fetcher + Send + Sync),
    image: &ImageRef,
) -> Option<i64> {
    match catalog.find_asset_id_by_source_url(&image.url) {
        Ok(Some(id)) => {
            tracing::debug!("Reusing asset {} for {}", id, image.url);
            return Some(id);
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("Asset lookup failed for {}: {}", image.url, e);
            return None;
        }
    }

    let bytes = match fetcher.fetch(&image.url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to download image {}: {}", image.url, e);
            return None;
        }
    };

    let asset = NewAsset {
        bytes,
        filename: filename_from_url(&image.url),
        alt_text: image.alt_text.clone(),
        source_url: image.url.clone(),
    };

    match catalog.store_asset(&asset) {
        Ok(id) => {
            tracing::debug!("Stored {} as asset {}", image.url, id);
            Some(id)
        }
        Err(e) => {
            tracing::warn!("Failed to store image {}: {}", image.url, e);
            None
        }
    }
}

/// Imports every image in order, skipping the ones that fail.
pub async fn import_images<C: Catalog + ?Sized>(
    catalog: &C,
    fetcher: &(dyn Fetcher + Send + Sync),
    images: &[ImageRef],
) -> Vec<i64> {
    let mut ids = Vec::with_capacity(images.len());
    for image in images {
        if let Some(id) = import_image(catalog, fetcher, image).await {
            ids.push(id);
        }
    }
    ids
}

/// Last path segment of the image URL.
pub fn filename_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(String::from))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}
