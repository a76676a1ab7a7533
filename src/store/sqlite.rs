use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::app::CatalogError;
use crate::domain::catalog::META_IMPORTED_AT;
use crate::domain::{
    Asset, AttributeDef, AttributeOption, CatalogKind, CatalogProduct, NewAsset, ProductFields,
    ProductStatus, ProductType, StockStatus, VariationFields,
};
use crate::store::{Catalog, Result};

const PRODUCT_COLUMNS: &str = "id, kind, parent_id, status, name, sku, price, regular_price, \
     sale_price, min_price, max_price, description, short_description, stock_status, image_id, \
     brand, created_at, updated_at";

pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

/// Raw column values of a `products` row, validated after the query.
struct ProductRow {
    id: i64,
    kind: String,
    parent_id: Option<i64>,
    status: String,
    name: String,
    sku: Option<String>,
    prices: [Option<String>; 5],
    description: String,
    short_description: String,
    stock_status: String,
    image_id: Option<i64>,
    brand: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ProductRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            parent_id: row.get(2)?,
            status: row.get(3)?,
            name: row.get(4)?,
            sku: row.get(5)?,
            prices: [row.get(6)?, row.get(7)?, row.get(8)?, row.get(9)?, row.get(10)?],
            description: row.get(11)?,
            short_description: row.get(12)?,
            stock_status: row.get(13)?,
            image_id: row.get(14)?,
            brand: row.get(15)?,
            created_at: row.get(16)?,
            updated_at: row.get(17)?,
        })
    }

    fn into_product(self, gallery_ids: Vec<i64>) -> Result<CatalogProduct> {
        let kind = CatalogKind::parse(&self.kind)
            .ok_or_else(|| CatalogError::Corrupt(format!("product {} kind {}", self.id, self.kind)))?;
        let status = ProductStatus::parse(&self.status).ok_or_else(|| {
            CatalogError::Corrupt(format!("product {} status {}", self.id, self.status))
        })?;
        let stock_status = StockStatus::parse(&self.stock_status).ok_or_else(|| {
            CatalogError::Corrupt(format!("product {} stock {}", self.id, self.stock_status))
        })?;

        let [price, regular_price, sale_price, min_price, max_price] = self.prices;

        Ok(CatalogProduct {
            id: self.id,
            kind,
            parent_id: self.parent_id,
            status,
            name: self.name,
            sku: self.sku,
            price: parse_decimal(price)?,
            regular_price: parse_decimal(regular_price)?,
            sale_price: parse_decimal(sale_price)?,
            min_price: parse_decimal(min_price)?,
            max_price: parse_decimal(max_price)?,
            description: self.description,
            short_description: self.short_description,
            stock_status,
            image_id: self.image_id,
            gallery_ids,
            brand: self.brand,
            created_at: parse_datetime(&self.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_datetime(&self.updated_at).unwrap_or_else(Utc::now),
        })
    }
}

fn parse_decimal(value: Option<String>) -> Result<Option<Decimal>> {
    value
        .map(|s| {
            Decimal::from_str(&s).map_err(|e| CatalogError::Corrupt(format!("price {}: {}", s, e)))
        })
        .transpose()
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| s.parse::<DateTime<Utc>>().ok())
}

fn price_text(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_string())
}

impl SqliteCatalog {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let catalog = Self {
            conn: Mutex::new(conn),
        };
        catalog.run_migrations()?;
        Ok(catalog)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let catalog = Self {
            conn: Mutex::new(conn),
        };
        catalog.run_migrations()?;
        Ok(catalog)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| CatalogError::Lock(e.to_string()))
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations.to_latest(&mut conn)?;

        Ok(())
    }

    fn load_product(conn: &Connection, id: i64) -> Result<Option<CatalogProduct>> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS),
                params![id],
                ProductRow::from_row,
            )
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare("SELECT asset_id FROM product_gallery WHERE product_id = ?1 ORDER BY position")?;
        let gallery = stmt
            .query_map(params![id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;

        row.into_product(gallery).map(Some)
    }

    fn load_products(conn: &Connection, ids: Vec<i64>) -> Result<Vec<CatalogProduct>> {
        let mut products = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(product) = Self::load_product(conn, id)? {
                products.push(product);
            }
        }
        Ok(products)
    }

    /// Attribute values recorded for a variation, keyed by attribute slug.
    pub fn variation_attributes(&self, variation_id: i64) -> Result<BTreeMap<String, String>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT slug, value FROM variation_attributes WHERE variation_id = ?1")?;
        let values = stmt
            .query_map(params![variation_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<BTreeMap<String, String>, _>>()?;
        Ok(values)
    }

    /// Number of stored assets.
    pub fn asset_count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl Catalog for SqliteCatalog {
    fn find_product_id_by_sku(&self, sku: &str) -> Result<Option<i64>> {
        let conn = self.conn()?;
        let id = conn
            .query_row(
                "SELECT id FROM products WHERE sku = ?1",
                params![sku],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn get_product(&self, id: i64) -> Result<Option<CatalogProduct>> {
        let conn = self.conn()?;
        Self::load_product(&conn, id)
    }

    fn list_products(&self) -> Result<Vec<CatalogProduct>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id FROM products WHERE parent_id IS NULL ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        drop(stmt);
        Self::load_products(&conn, ids)
    }

    fn imported_history(&self, limit: usize) -> Result<Vec<CatalogProduct>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT p.id FROM products p
             JOIN product_meta m ON m.product_id = p.id AND m.meta_key = ?1
             WHERE p.parent_id IS NULL
             ORDER BY m.meta_value DESC, p.id DESC
             LIMIT ?2",
        )?;
        let ids = stmt
            .query_map(params![META_IMPORTED_AT, limit as i64], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        drop(stmt);
        Self::load_products(&conn, ids)
    }

    fn create_product(
        &self,
        kind: ProductType,
        status: ProductStatus,
        fields: &ProductFields,
    ) -> Result<i64> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO products (kind, status, name, sku, price, regular_price, sale_price,
                                   description, short_description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                CatalogKind::from(kind).as_str(),
                status.as_str(),
                fields.name,
                fields.sku,
                price_text(fields.price),
                price_text(fields.regular_price),
                price_text(fields.sale_price),
                fields.description,
                fields.short_description,
                now,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn update_product(&self, id: i64, fields: &ProductFields) -> Result<()> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "UPDATE products SET name = ?1, description = ?2, short_description = ?3, updated_at = ?4
             WHERE id = ?5",
            params![fields.name, fields.description, fields.short_description, now, id],
        )?;

        if let Some(price) = fields.price {
            conn.execute(
                "UPDATE products SET price = ?1 WHERE id = ?2",
                params![price.to_string(), id],
            )?;
        }
        if let Some(regular_price) = fields.regular_price {
            conn.execute(
                "UPDATE products SET regular_price = ?1 WHERE id = ?2",
                params![regular_price.to_string(), id],
            )?;
        }
        // A missing sale tier means the product is no longer on sale
        conn.execute(
            "UPDATE products SET sale_price = ?1 WHERE id = ?2",
            params![price_text(fields.sale_price), id],
        )?;

        Ok(())
    }

    fn delete_product(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn set_brand(&self, id: i64, brand: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE products SET brand = ?1 WHERE id = ?2",
            params![brand, id],
        )?;
        Ok(())
    }

    fn set_images(&self, id: i64, primary: Option<i64>, gallery: &[i64]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "UPDATE products SET image_id = ?1 WHERE id = ?2",
            params![primary, id],
        )?;
        tx.execute("DELETE FROM product_gallery WHERE product_id = ?1", params![id])?;
        for (position, asset_id) in gallery.iter().enumerate() {
            tx.execute(
                "INSERT INTO product_gallery (product_id, position, asset_id) VALUES (?1, ?2, ?3)",
                params![id, position as i64, asset_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn set_attributes(&self, id: i64, attributes: &[AttributeDef]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM product_attributes WHERE product_id = ?1", params![id])?;
        for (position, attribute) in attributes.iter().enumerate() {
            let options = serde_json::to_string(&attribute.options)
                .map_err(|e| CatalogError::Corrupt(e.to_string()))?;
            tx.execute(
                "INSERT INTO product_attributes (product_id, position, name, slug, options, visible, variation)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id,
                    position as i64,
                    attribute.name,
                    attribute.slug,
                    options,
                    attribute.visible as i32,
                    attribute.variation as i32,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get_attributes(&self, id: i64) -> Result<Vec<AttributeDef>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT name, slug, options, visible, variation FROM product_attributes
             WHERE product_id = ?1 ORDER BY position",
        )?;
        let rows = stmt
            .query_map(params![id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i32>(3)? != 0,
                    row.get::<_, i32>(4)? != 0,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(name, slug, options, visible, variation)| {
                let options: Vec<AttributeOption> = serde_json::from_str(&options)
                    .map_err(|e| CatalogError::Corrupt(format!("attribute {}: {}", slug, e)))?;
                Ok(AttributeDef {
                    name,
                    slug,
                    options,
                    visible,
                    variation,
                })
            })
            .collect()
    }

    fn variation_ids(&self, parent_id: i64) -> Result<Vec<i64>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id FROM products WHERE parent_id = ?1 AND kind = 'variation' ORDER BY id",
        )?;
        let ids = stmt
            .query_map(params![parent_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    fn create_variation(&self, parent_id: i64, fields: &VariationFields) -> Result<i64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        // Variations inherit the parent's publication status
        let inserted = tx.execute(
            "INSERT INTO products (kind, parent_id, status, name, sku, price, regular_price,
                                   stock_status, image_id, created_at, updated_at)
             SELECT 'variation', id, status, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8
             FROM products WHERE id = ?1",
            params![
                parent_id,
                fields.name,
                fields.sku,
                fields.price.to_string(),
                fields.regular_price.to_string(),
                fields.stock_status.as_str(),
                fields.image_id,
                now,
            ],
        )?;
        if inserted == 0 {
            return Err(CatalogError::Corrupt(format!(
                "parent product {} does not exist",
                parent_id
            )));
        }
        let id = tx.last_insert_rowid();

        for (slug, value) in &fields.attribute_values {
            tx.execute(
                "INSERT INTO variation_attributes (variation_id, slug, value) VALUES (?1, ?2, ?3)",
                params![id, slug, value],
            )?;
        }

        tx.commit()?;
        Ok(id)
    }

    fn delete_variation(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM products WHERE id = ?1 AND kind = 'variation'",
            params![id],
        )?;
        Ok(())
    }

    fn recompute_parent_aggregates(&self, parent_id: i64) -> Result<()> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT price, regular_price, stock_status FROM products
             WHERE parent_id = ?1 AND kind = 'variation'",
        )?;
        let rows = stmt
            .query_map(params![parent_id], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        drop(stmt);

        let mut prices = Vec::new();
        let mut regular_prices = Vec::new();
        let mut in_stock = false;
        for (price, regular_price, stock) in rows {
            prices.extend(parse_decimal(price)?);
            regular_prices.extend(parse_decimal(regular_price)?);
            in_stock |= StockStatus::parse(&stock) == Some(StockStatus::InStock);
        }

        let min_price = prices.iter().min().copied();
        let max_price = prices.iter().max().copied();
        let min_regular = regular_prices.iter().min().copied();
        let stock_status = if in_stock {
            StockStatus::InStock
        } else {
            StockStatus::OutOfStock
        };

        conn.execute(
            "UPDATE products SET price = ?1, regular_price = ?2, min_price = ?1, max_price = ?3,
                                 stock_status = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                price_text(min_price),
                price_text(min_regular),
                price_text(max_price),
                stock_status.as_str(),
                Utc::now().to_rfc3339(),
                parent_id,
            ],
        )?;

        Ok(())
    }

    fn find_asset_id_by_source_url(&self, url: &str) -> Result<Option<i64>> {
        let conn = self.conn()?;
        let id = conn
            .query_row(
                "SELECT id FROM assets WHERE source_url = ?1 ORDER BY id LIMIT 1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn store_asset(&self, asset: &NewAsset) -> Result<i64> {
        let conn = self.conn()?;
        let content_hash = hex::encode(Sha256::digest(&asset.bytes));

        conn.execute(
            "INSERT INTO assets (filename, alt_text, source_url, content_hash, data, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                asset.filename,
                asset.alt_text,
                asset.source_url,
                content_hash,
                asset.bytes,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn get_asset(&self, id: i64) -> Result<Option<Asset>> {
        let conn = self.conn()?;
        let asset = conn
            .query_row(
                "SELECT id, filename, alt_text, source_url, content_hash, length(data), created_at
                 FROM assets WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Asset {
                        id: row.get(0)?,
                        filename: row.get(1)?,
                        alt_text: row.get(2)?,
                        source_url: row.get(3)?,
                        content_hash: row.get(4)?,
                        size: row.get::<_, i64>(5)? as usize,
                        created_at: row
                            .get::<_, String>(6)
                            .ok()
                            .and_then(|s| parse_datetime(&s))
                            .unwrap_or_else(Utc::now),
                    })
                },
            )
            .optional()?;
        Ok(asset)
    }

    fn set_metadata(&self, id: i64, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO product_meta (product_id, meta_key, meta_value) VALUES (?1, ?2, ?3)
             ON CONFLICT(product_id, meta_key) DO UPDATE SET meta_value = ?3",
            params![id, key, value],
        )?;
        Ok(())
    }

    fn get_metadata(&self, id: i64, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT meta_value FROM product_meta WHERE product_id = ?1 AND meta_key = ?2",
                params![id, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}
