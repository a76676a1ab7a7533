pub mod catalog;
pub mod product;
pub mod report;

pub use catalog::{
    Asset, CatalogKind, CatalogProduct, NewAsset, ProductFields, ProductStatus, VariationFields,
    META_IMPORTED_AT, META_SOURCE_URL, META_SOURCE_VARIATION_ID, META_TIMESTAMP_FORMAT,
    META_UPDATED_AT,
};
pub use product::{
    AttributeDef, AttributeOption, ImageRef, ProductDocument, ProductType, StockStatus,
    VariationDef,
};
pub use report::{BatchReport, ImportFailure, ImportResult, ImportSuccess};
