//! Reconciles scraped products into the catalog.
//!
//! A [`ProductDocument`] is matched against the catalog by SKU. Unknown SKUs
//! are created as drafts, known ones are updated in place. When the product
//! type changed between imports the old entity is deleted and recreated.

pub mod images;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::app::ImportError;
use crate::domain::{
    ProductDocument, ProductFields, ProductStatus, VariationDef, VariationFields, META_IMPORTED_AT,
    META_SOURCE_URL, META_SOURCE_VARIATION_ID, META_TIMESTAMP_FORMAT, META_UPDATED_AT,
};
use crate::fetcher::Fetcher;
use crate::store::Catalog;

/// Per-run import settings.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Brand label assigned to every imported product.
    pub brand: Option<String>,
}

pub struct Importer<C: Catalog> {
    catalog: Arc<C>,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    options: ImportOptions,
}

impl<C: Catalog> Importer<C> {
    pub fn new(catalog: Arc<C>, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self {
            catalog,
            fetcher,
            options: ImportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// Creates or updates the catalog entry for `doc`, returning its id.
    pub async fn import_product(&self, doc: &ProductDocument) -> Result<i64, ImportError> {
        if doc.title.trim().is_empty() {
            return Err(ImportError::InvalidData(
                "Product title is required".to_string(),
            ));
        }

        let existing = if doc.sku.is_empty() {
            None
        } else {
            self.catalog.find_product_id_by_sku(&doc.sku)?
        };

        let Some(id) = existing else {
            return self.create(doc).await;
        };

        let product = self
            .catalog
            .get_product(id)?
            .ok_or(ImportError::NotFound(id))?;

        match product.kind.product_type() {
            None => Err(ImportError::InvalidData(format!(
                "SKU {} already belongs to variation {}",
                doc.sku, id
            ))),
            Some(kind) if kind == doc.product_type() => self.update(id, doc).await,
            Some(kind) => {
                tracing::warn!(
                    "Product {} changed from {} to {}, recreating",
                    id,
                    kind,
                    doc.product_type()
                );
                self.catalog.delete_product(id)?;
                self.create(doc).await
            }
        }
    }

    /// Creates a draft product. When a later step fails the new product is
    /// deleted again so a failed import leaves nothing behind.
    async fn create(&self, doc: &ProductDocument) -> Result<i64, ImportError> {
        let fields = product_fields(doc);
        let id = self
            .catalog
            .create_product(doc.product_type(), ProductStatus::Draft, &fields)?;
        tracing::info!("Created {} product {} ({})", doc.product_type(), id, doc.title);

        if let Err(e) = self.populate(id, doc).await {
            tracing::warn!("Import of {} failed, removing product {}: {}", doc.title, id, e);
            if let Err(cleanup) = self.catalog.delete_product(id) {
                tracing::error!("Failed to remove product {}: {}", id, cleanup);
            }
            return Err(e);
        }

        Ok(id)
    }

    async fn populate(&self, id: i64, doc: &ProductDocument) -> Result<(), ImportError> {
        self.attach_images(id, doc).await?;
        if doc.is_variable() {
            self.write_variations(id, doc).await?;
        }
        self.apply_options(id)?;
        self.stamp(id, doc, META_IMPORTED_AT)
    }

    async fn update(&self, id: i64, doc: &ProductDocument) -> Result<i64, ImportError> {
        let fields = product_fields(doc);
        self.catalog.update_product(id, &fields)?;
        tracing::info!("Updated {} product {} ({})", doc.product_type(), id, doc.title);

        if doc.is_variable() {
            self.write_variations(id, doc).await?;
        }
        if !doc.images.is_empty() {
            self.attach_images(id, doc).await?;
        }
        self.apply_options(id)?;
        self.stamp(id, doc, META_UPDATED_AT)?;

        Ok(id)
    }

    /// First image becomes the primary one, the rest the gallery.
    async fn attach_images(&self, id: i64, doc: &ProductDocument) -> Result<(), ImportError> {
        if doc.images.is_empty() {
            return Ok(());
        }

        let ids = images::import_images(self.catalog.as_ref(), self.fetcher.as_ref(), &doc.images).await;
        match ids.split_first() {
            Some((primary, gallery)) => self.catalog.set_images(id, Some(*primary), gallery)?,
            None => tracing::warn!("No images could be imported for product {}", id),
        }
        Ok(())
    }

    /// Replaces attributes and variations of a variable product.
    async fn write_variations(&self, id: i64, doc: &ProductDocument) -> Result<(), ImportError> {
        self.catalog.set_attributes(id, &doc.attributes)?;

        let stale = self.catalog.variation_ids(id)?;
        for variation_id in &stale {
            self.catalog.delete_variation(*variation_id)?;
        }
        if !stale.is_empty() {
            tracing::debug!("Removed {} variations of product {}", stale.len(), id);
        }

        let mut claimed = HashSet::new();
        for variation in &doc.variations {
            let sku = self.claim_variation_sku(&variation.sku, &mut claimed)?;
            let image_id = match &variation.image {
                Some(image) => {
                    images::import_image(self.catalog.as_ref(), self.fetcher.as_ref(), image).await
                }
                None => None,
            };

            let fields = VariationFields {
                name: variation_name(&doc.title, variation),
                sku,
                price: variation.price,
                regular_price: variation.regular_price,
                stock_status: variation.stock_status,
                image_id,
                attribute_values: variation.attribute_values.clone(),
            };
            let variation_id = self.catalog.create_variation(id, &fields)?;

            if let Some(source_id) = variation.original_variation_id {
                self.catalog.set_metadata(
                    variation_id,
                    META_SOURCE_VARIATION_ID,
                    &source_id.to_string(),
                )?;
            }
        }

        self.catalog.recompute_parent_aggregates(id)?;
        tracing::debug!("Wrote {} variations for product {}", doc.variations.len(), id);
        Ok(())
    }

    /// Variation SKU to store, or `None` when it repeats within the document
    /// or is already owned by another catalog entry.
    fn claim_variation_sku(
        &self,
        sku: &str,
        claimed: &mut HashSet<String>,
    ) -> Result<Option<String>, ImportError> {
        let Some(sku) = non_empty(sku) else {
            return Ok(None);
        };
        if !claimed.insert(sku.clone()) {
            tracing::warn!("Variation SKU {} repeats within the product, dropping it", sku);
            return Ok(None);
        }
        if let Some(owner) = self.catalog.find_product_id_by_sku(&sku)? {
            tracing::warn!("Variation SKU {} already belongs to product {}, dropping it", sku, owner);
            return Ok(None);
        }
        Ok(Some(sku))
    }

    fn apply_options(&self, id: i64) -> Result<(), ImportError> {
        if let Some(brand) = self.options.brand.as_deref().map(str::trim) {
            if !brand.is_empty() {
                self.catalog.set_brand(id, brand)?;
            }
        }
        Ok(())
    }

    fn stamp(&self, id: i64, doc: &ProductDocument, key: &str) -> Result<(), ImportError> {
        if !doc.source_url.is_empty() {
            self.catalog.set_metadata(id, META_SOURCE_URL, &doc.source_url)?;
        }
        let now = Utc::now().format(META_TIMESTAMP_FORMAT).to_string();
        self.catalog.set_metadata(id, key, &now)?;
        Ok(())
    }
}

/// Parent fields for `doc`. Variable products get their prices from the
/// variation roll-up, and missing price tiers stay unset.
fn product_fields(doc: &ProductDocument) -> ProductFields {
    let mut fields = ProductFields {
        name: doc.title.trim().to_string(),
        sku: non_empty(&doc.sku),
        description: doc.description.clone(),
        short_description: doc.short_description.clone(),
        ..ProductFields::default()
    };

    if !doc.is_variable() {
        fields.regular_price = positive(doc.regular_price);
        fields.sale_price = doc.sale_price.and_then(positive);
        fields.price = positive(doc.price);
    }
    fields
}

fn variation_name(title: &str, variation: &VariationDef) -> String {
    if let Some(name) = variation.display_name.as_deref().filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    if variation.attribute_values.is_empty() {
        return title.trim().to_string();
    }
    let values: Vec<&str> = variation
        .attribute_values
        .values()
        .map(String::as_str)
        .collect();
    format!("{} - {}", title.trim(), values.join(", "))
}

fn positive(value: Decimal) -> Option<Decimal> {
    (value > Decimal::ZERO).then_some(value)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CatalogError;
    use crate::domain::{
        Asset, AttributeDef, AttributeOption, CatalogKind, CatalogProduct, ImageRef, NewAsset,
        ProductType, StockStatus,
    };
    use crate::fetcher::testing::StaticFetcher;
    use crate::store::{Result as CatalogResult, SqliteCatalog};
    use std::collections::BTreeMap;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    const FRONT: &str = "https://cdn.example.com/front.jpg";
    const BACK: &str = "https://cdn.example.com/back.jpg";

    fn setup(fetcher: StaticFetcher) -> (Arc<SqliteCatalog>, Arc<StaticFetcher>, Importer<SqliteCatalog>) {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let fetcher = Arc::new(fetcher);
        let importer = Importer::new(catalog.clone(), fetcher.clone());
        (catalog, fetcher, importer)
    }

    fn images_fetcher() -> StaticFetcher {
        StaticFetcher::new()
            .with_page(FRONT, b"front-bytes".to_vec())
            .with_page(BACK, b"back-bytes".to_vec())
    }

    fn simple_doc(title: &str) -> ProductDocument {
        let mut doc = ProductDocument::new(title, "https://example.com/product/abc123/", "ABC123");
        doc.regular_price = money(2499);
        doc.sale_price = Some(money(1999));
        doc.price = money(1999);
        doc.description = "<p>Soft cotton.</p>".to_string();
        doc.short_description = "Soft cotton.".to_string();
        doc
    }

    fn variation(size: &str, price: Decimal, stock: StockStatus, source_id: i64) -> VariationDef {
        VariationDef {
            attribute_values: BTreeMap::from([("pa_size".to_string(), size.to_string())]),
            sku: format!("ABC123-{}", size.to_uppercase()),
            price,
            regular_price: price,
            stock_status: stock,
            image: None,
            original_variation_id: Some(source_id),
            display_name: None,
        }
    }

    fn variable_doc(sizes: &[(&str, Decimal, StockStatus)]) -> ProductDocument {
        let mut doc = ProductDocument::new("Gummies", "https://example.com/product/abc123/", "ABC123");
        doc.attributes = vec![AttributeDef {
            name: "Size".to_string(),
            slug: "pa_size".to_string(),
            options: sizes
                .iter()
                .map(|(s, _, _)| AttributeOption {
                    slug: s.to_string(),
                    name: s.to_uppercase(),
                })
                .collect(),
            visible: true,
            variation: true,
        }];
        doc.variations = sizes
            .iter()
            .enumerate()
            .map(|(i, (s, p, st))| variation(s, *p, *st, 100 + i as i64))
            .collect();
        doc
    }

    #[tokio::test]
    async fn test_create_simple_product() {
        let (catalog, _, importer) = setup(images_fetcher());
        let mut doc = simple_doc("Classic Tee");
        doc.images = vec![ImageRef::new(FRONT, "Front"), ImageRef::new(BACK, "Back")];

        let id = importer.import_product(&doc).await.unwrap();
        let product = catalog.get_product(id).unwrap().unwrap();

        assert_eq!(product.kind, CatalogKind::Simple);
        assert_eq!(product.status, ProductStatus::Draft);
        assert_eq!(product.name, "Classic Tee");
        assert_eq!(product.sku.as_deref(), Some("ABC123"));
        assert_eq!(product.regular_price, Some(money(2499)));
        assert_eq!(product.sale_price, Some(money(1999)));
        assert_eq!(product.price, Some(money(1999)));
        assert!(product.image_id.is_some());
        assert_eq!(product.gallery_ids.len(), 1);

        assert_eq!(
            catalog.get_metadata(id, META_SOURCE_URL).unwrap().as_deref(),
            Some("https://example.com/product/abc123/")
        );
        assert!(catalog.get_metadata(id, META_IMPORTED_AT).unwrap().is_some());
        assert!(catalog.get_metadata(id, META_UPDATED_AT).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_prices_are_left_unset() {
        let (catalog, _, importer) = setup(StaticFetcher::new());
        let doc = ProductDocument::new("Mystery Box", "https://example.com/product/box/", "BOX");

        let id = importer.import_product(&doc).await.unwrap();
        let product = catalog.get_product(id).unwrap().unwrap();
        assert_eq!(product.price, None);
        assert_eq!(product.regular_price, None);
        assert_eq!(product.sale_price, None);
    }

    #[tokio::test]
    async fn test_reimport_updates_same_product() {
        let (catalog, _, importer) = setup(StaticFetcher::new());

        let first = importer.import_product(&simple_doc("Classic Tee")).await.unwrap();
        let mut doc = simple_doc("Classic Tee v2");
        doc.sale_price = None;
        doc.price = money(2499);
        let second = importer.import_product(&doc).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(catalog.list_products().unwrap().len(), 1);

        let product = catalog.get_product(first).unwrap().unwrap();
        assert_eq!(product.name, "Classic Tee v2");
        assert_eq!(product.status, ProductStatus::Draft);
        assert_eq!(product.sale_price, None);
        assert_eq!(product.price, Some(money(2499)));
        assert!(catalog.get_metadata(first, META_IMPORTED_AT).unwrap().is_some());
        assert!(catalog.get_metadata(first, META_UPDATED_AT).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_empty_sku_always_creates() {
        let (catalog, _, importer) = setup(StaticFetcher::new());
        let doc = ProductDocument::new("No Sku", "https://example.com/", "");

        let a = importer.import_product(&doc).await.unwrap();
        let b = importer.import_product(&doc).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(catalog.list_products().unwrap().len(), 2);
        assert_eq!(catalog.get_product(a).unwrap().unwrap().sku, None);
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected_before_mutation() {
        let (catalog, fetcher, importer) = setup(images_fetcher());
        let mut doc = simple_doc("   ");
        doc.images = vec![ImageRef::new(FRONT, "")];

        let err = importer.import_product(&doc).await.unwrap_err();
        assert!(matches!(err, ImportError::InvalidData(_)));
        assert!(catalog.list_products().unwrap().is_empty());
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_create_variable_product() {
        let (catalog, _, importer) = setup(StaticFetcher::new());
        let doc = variable_doc(&[
            ("small", money(1000), StockStatus::OutOfStock),
            ("large", money(1850), StockStatus::InStock),
        ]);

        let id = importer.import_product(&doc).await.unwrap();
        let parent = catalog.get_product(id).unwrap().unwrap();
        assert_eq!(parent.kind, CatalogKind::Variable);
        assert_eq!(parent.min_price, Some(money(1000)));
        assert_eq!(parent.max_price, Some(money(1850)));
        assert_eq!(parent.price, Some(money(1000)));
        assert_eq!(parent.stock_status, StockStatus::InStock);
        assert_eq!(catalog.get_attributes(id).unwrap().len(), 1);

        let variations = catalog.variation_ids(id).unwrap();
        assert_eq!(variations.len(), 2);

        let small = catalog.get_product(variations[0]).unwrap().unwrap();
        assert_eq!(small.kind, CatalogKind::Variation);
        assert_eq!(small.parent_id, Some(id));
        assert_eq!(small.name, "Gummies - small");
        assert_eq!(small.sku.as_deref(), Some("ABC123-SMALL"));
        assert_eq!(
            catalog.get_metadata(variations[0], META_SOURCE_VARIATION_ID).unwrap().as_deref(),
            Some("100")
        );
        assert_eq!(
            catalog.variation_attributes(variations[0]).unwrap().get("pa_size").map(String::as_str),
            Some("small")
        );
    }

    #[tokio::test]
    async fn test_variable_update_replaces_variations() {
        let (catalog, _, importer) = setup(StaticFetcher::new());
        let first = variable_doc(&[
            ("small", money(1000), StockStatus::InStock),
            ("large", money(1850), StockStatus::InStock),
        ]);
        let id = importer.import_product(&first).await.unwrap();

        let second = variable_doc(&[("medium", money(1400), StockStatus::OutOfStock)]);
        let again = importer.import_product(&second).await.unwrap();

        assert_eq!(id, again);
        let variations = catalog.variation_ids(id).unwrap();
        assert_eq!(variations.len(), 1);
        let parent = catalog.get_product(id).unwrap().unwrap();
        assert_eq!(parent.min_price, Some(money(1400)));
        assert_eq!(parent.max_price, Some(money(1400)));
        assert_eq!(parent.stock_status, StockStatus::OutOfStock);
    }

    #[tokio::test]
    async fn test_type_change_recreates_product() {
        let (catalog, _, importer) = setup(StaticFetcher::new());
        let old = importer.import_product(&simple_doc("Gummies")).await.unwrap();

        let doc = variable_doc(&[
            ("small", money(1000), StockStatus::InStock),
            ("large", money(1850), StockStatus::InStock),
        ]);
        let new = importer.import_product(&doc).await.unwrap();

        assert_ne!(old, new);
        assert!(catalog.get_product(old).unwrap().is_none());
        assert_eq!(catalog.find_product_id_by_sku("ABC123").unwrap(), Some(new));
        assert_eq!(
            catalog.get_product(new).unwrap().unwrap().kind,
            CatalogKind::Variable
        );
        assert_eq!(catalog.variation_ids(new).unwrap().len(), 2);

        let back = importer.import_product(&simple_doc("Gummies")).await.unwrap();
        assert!(catalog.get_product(new).unwrap().is_none());
        let parents: Vec<_> = catalog
            .list_products()
            .unwrap()
            .into_iter()
            .filter(|p| p.parent_id.is_none())
            .collect();
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].id, back);
    }

    #[tokio::test]
    async fn test_sku_owned_by_variation_is_rejected() {
        let (_, _, importer) = setup(StaticFetcher::new());
        importer
            .import_product(&variable_doc(&[("small", money(1000), StockStatus::InStock)]))
            .await
            .unwrap();

        let mut doc = simple_doc("Small Gummies");
        doc.sku = "ABC123-SMALL".to_string();
        let err = importer.import_product(&doc).await.unwrap_err();
        assert!(matches!(err, ImportError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_images_shared_across_products_are_downloaded_once() {
        let (catalog, fetcher, importer) = setup(images_fetcher());

        let mut a = simple_doc("Tee A");
        a.sku = "TEEA".to_string();
        a.images = vec![ImageRef::new(FRONT, "Front")];
        let mut b = simple_doc("Tee B");
        b.sku = "TEEB".to_string();
        b.images = vec![ImageRef::new(FRONT, "Front")];

        let a_id = importer.import_product(&a).await.unwrap();
        let b_id = importer.import_product(&b).await.unwrap();

        assert_eq!(fetcher.request_count(FRONT), 1);
        assert_eq!(catalog.asset_count().unwrap(), 1);
        assert_eq!(
            catalog.get_product(a_id).unwrap().unwrap().image_id,
            catalog.get_product(b_id).unwrap().unwrap().image_id
        );
    }

    #[tokio::test]
    async fn test_failed_image_download_does_not_fail_import() {
        let (catalog, _, importer) = setup(StaticFetcher::new());
        let mut doc = simple_doc("Classic Tee");
        doc.images = vec![ImageRef::new("https://cdn.example.com/gone.jpg", "")];

        let id = importer.import_product(&doc).await.unwrap();
        let product = catalog.get_product(id).unwrap().unwrap();
        assert_eq!(product.image_id, None);
        assert!(product.gallery_ids.is_empty());
    }

    #[tokio::test]
    async fn test_variation_image_is_attached() {
        let (catalog, _, importer) = setup(images_fetcher());
        let mut doc = variable_doc(&[("small", money(1000), StockStatus::InStock)]);
        doc.variations[0].image = Some(ImageRef::new(BACK, "Small"));

        let id = importer.import_product(&doc).await.unwrap();
        let variation_id = catalog.variation_ids(id).unwrap()[0];
        let variation = catalog.get_product(variation_id).unwrap().unwrap();
        let asset = catalog.get_asset(variation.image_id.unwrap()).unwrap().unwrap();
        assert_eq!(asset.source_url, BACK);
    }

    #[tokio::test]
    async fn test_brand_option_is_applied() {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let importer = Importer::new(catalog.clone(), Arc::new(StaticFetcher::new())).with_options(
            ImportOptions {
                brand: Some("D8 Austin".to_string()),
            },
        );

        let id = importer.import_product(&simple_doc("Classic Tee")).await.unwrap();
        assert_eq!(
            catalog.get_product(id).unwrap().unwrap().brand.as_deref(),
            Some("D8 Austin")
        );
    }

    #[test]
    fn test_variation_name() {
        let mut v = variation("small", money(100), StockStatus::InStock, 1);
        assert_eq!(variation_name("Gummies", &v), "Gummies - small");

        v.display_name = Some("Small Pack".to_string());
        assert_eq!(variation_name("Gummies", &v), "Small Pack");

        v.display_name = None;
        v.attribute_values.clear();
        assert_eq!(variation_name("Gummies", &v), "Gummies");
    }

    #[tokio::test]
    async fn test_variations_sharing_a_sku_import_once() {
        let (catalog, _, importer) = setup(StaticFetcher::new());
        let mut doc = variable_doc(&[
            ("small", money(1000), StockStatus::InStock),
            ("large", money(1850), StockStatus::InStock),
        ]);
        for variation in &mut doc.variations {
            variation.sku = "D8-GUM".to_string();
        }

        let id = importer.import_product(&doc).await.unwrap();
        let variations = catalog.variation_ids(id).unwrap();
        assert_eq!(variations.len(), 2);

        let skus: Vec<Option<String>> = variations
            .iter()
            .map(|v| catalog.get_product(*v).unwrap().unwrap().sku)
            .collect();
        assert_eq!(skus, vec![Some("D8-GUM".to_string()), None]);
        assert!(catalog.get_metadata(id, META_IMPORTED_AT).unwrap().is_some());

        let again = importer.import_product(&doc).await.unwrap();
        assert_eq!(again, id);
        assert_eq!(catalog.variation_ids(id).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_variation_sku_owned_elsewhere_is_dropped() {
        let (catalog, _, importer) = setup(StaticFetcher::new());
        let mut other = simple_doc("Other Tee");
        other.sku = "ABC123-SMALL".to_string();
        let other_id = importer.import_product(&other).await.unwrap();

        let mut doc = variable_doc(&[
            ("small", money(1000), StockStatus::InStock),
            ("large", money(1850), StockStatus::InStock),
        ]);
        doc.variations[1].sku = "ABC123".to_string();

        let id = importer.import_product(&doc).await.unwrap();
        let variations = catalog.variation_ids(id).unwrap();
        assert_eq!(variations.len(), 2);
        for variation_id in variations {
            assert_eq!(catalog.get_product(variation_id).unwrap().unwrap().sku, None);
        }
        assert_eq!(catalog.find_product_id_by_sku("ABC123-SMALL").unwrap(), Some(other_id));
        assert_eq!(catalog.find_product_id_by_sku("ABC123").unwrap(), Some(id));
    }

    /// Catalog whose variation writes always fail.
    struct BrokenVariations(SqliteCatalog);

    impl Catalog for BrokenVariations {
        fn find_product_id_by_sku(&self, sku: &str) -> CatalogResult<Option<i64>> {
            self.0.find_product_id_by_sku(sku)
        }
        fn get_product(&self, id: i64) -> CatalogResult<Option<CatalogProduct>> {
            self.0.get_product(id)
        }
        fn list_products(&self) -> CatalogResult<Vec<CatalogProduct>> {
            self.0.list_products()
        }
        fn imported_history(&self, limit: usize) -> CatalogResult<Vec<CatalogProduct>> {
            self.0.imported_history(limit)
        }
        fn create_product(
            &self,
            kind: ProductType,
            status: ProductStatus,
            fields: &ProductFields,
        ) -> CatalogResult<i64> {
            self.0.create_product(kind, status, fields)
        }
        fn update_product(&self, id: i64, fields: &ProductFields) -> CatalogResult<()> {
            self.0.update_product(id, fields)
        }
        fn delete_product(&self, id: i64) -> CatalogResult<()> {
            self.0.delete_product(id)
        }
        fn set_brand(&self, id: i64, brand: &str) -> CatalogResult<()> {
            self.0.set_brand(id, brand)
        }
        fn set_images(&self, id: i64, primary: Option<i64>, gallery: &[i64]) -> CatalogResult<()> {
            self.0.set_images(id, primary, gallery)
        }
        fn set_attributes(&self, id: i64, attributes: &[AttributeDef]) -> CatalogResult<()> {
            self.0.set_attributes(id, attributes)
        }
        fn get_attributes(&self, id: i64) -> CatalogResult<Vec<AttributeDef>> {
            self.0.get_attributes(id)
        }
        fn variation_ids(&self, parent_id: i64) -> CatalogResult<Vec<i64>> {
            self.0.variation_ids(parent_id)
        }
        fn create_variation(&self, _parent_id: i64, _fields: &VariationFields) -> CatalogResult<i64> {
            Err(CatalogError::Corrupt("disk full".to_string()))
        }
        fn delete_variation(&self, id: i64) -> CatalogResult<()> {
            self.0.delete_variation(id)
        }
        fn recompute_parent_aggregates(&self, parent_id: i64) -> CatalogResult<()> {
            self.0.recompute_parent_aggregates(parent_id)
        }
        fn find_asset_id_by_source_url(&self, url: &str) -> CatalogResult<Option<i64>> {
            self.0.find_asset_id_by_source_url(url)
        }
        fn store_asset(&self, asset: &NewAsset) -> CatalogResult<i64> {
            self.0.store_asset(asset)
        }
        fn get_asset(&self, id: i64) -> CatalogResult<Option<Asset>> {
            self.0.get_asset(id)
        }
        fn set_metadata(&self, id: i64, key: &str, value: &str) -> CatalogResult<()> {
            self.0.set_metadata(id, key, value)
        }
        fn get_metadata(&self, id: i64, key: &str) -> CatalogResult<Option<String>> {
            self.0.get_metadata(id, key)
        }
    }

    #[tokio::test]
    async fn test_failed_create_leaves_no_product_behind() {
        let catalog = Arc::new(BrokenVariations(SqliteCatalog::in_memory().unwrap()));
        let importer = Importer::new(catalog.clone(), Arc::new(StaticFetcher::new()));
        let doc = variable_doc(&[("small", money(1000), StockStatus::InStock)]);

        let err = importer.import_product(&doc).await.unwrap_err();
        assert!(matches!(err, ImportError::Persistence(_)));
        assert!(catalog.list_products().unwrap().is_empty());
        assert_eq!(catalog.find_product_id_by_sku("ABC123").unwrap(), None);
    }
}
