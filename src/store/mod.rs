pub mod sqlite;

use crate::app::CatalogError;
use crate::domain::{
    Asset, AttributeDef, CatalogProduct, NewAsset, ProductFields, ProductStatus, ProductType,
    VariationFields,
};

pub use sqlite::SqliteCatalog;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// The product catalog the importer writes into.
pub trait Catalog {
    // Product operations
    fn find_product_id_by_sku(&self, sku: &str) -> Result<Option<i64>>;
    fn get_product(&self, id: i64) -> Result<Option<CatalogProduct>>;
    fn list_products(&self) -> Result<Vec<CatalogProduct>>;
    /// Parent products carrying an import timestamp, newest first.
    fn imported_history(&self, limit: usize) -> Result<Vec<CatalogProduct>>;
    fn create_product(
        &self,
        kind: ProductType,
        status: ProductStatus,
        fields: &ProductFields,
    ) -> Result<i64>;
    fn update_product(&self, id: i64, fields: &ProductFields) -> Result<()>;
    /// Deletes the product together with its variations, gallery and metadata.
    fn delete_product(&self, id: i64) -> Result<()>;
    fn set_brand(&self, id: i64, brand: &str) -> Result<()>;
    fn set_images(&self, id: i64, primary: Option<i64>, gallery: &[i64]) -> Result<()>;

    // Attribute and variation operations
    fn set_attributes(&self, id: i64, attributes: &[AttributeDef]) -> Result<()>;
    fn get_attributes(&self, id: i64) -> Result<Vec<AttributeDef>>;
    fn variation_ids(&self, parent_id: i64) -> Result<Vec<i64>>;
    fn create_variation(&self, parent_id: i64, fields: &VariationFields) -> Result<i64>;
    fn delete_variation(&self, id: i64) -> Result<()>;
    /// Rolls variation prices and stock up into the parent product.
    fn recompute_parent_aggregates(&self, parent_id: i64) -> Result<()>;

    // Asset operations
    fn find_asset_id_by_source_url(&self, url: &str) -> Result<Option<i64>>;
    fn store_asset(&self, asset: &NewAsset) -> Result<i64>;
    fn get_asset(&self, id: i64) -> Result<Option<Asset>>;

    // Metadata operations
    fn set_metadata(&self, id: i64, key: &str, value: &str) -> Result<()>;
    fn get_metadata(&self, id: i64, key: &str) -> Result<Option<String>>;
}
