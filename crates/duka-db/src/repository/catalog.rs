//! # Catalog Repository
//!
//! Database operations for products, variants, categories, brands,
//! suppliers and stock.
//!
//! ## Catalog Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Catalog Relations                                 │
//! │                                                                         │
//! │  Category ─┐                                                           │
//! │  Brand ────┼──► Product ──► Variant (price, barcode, stock)            │
//! │  Supplier ─┘       │             │                                      │
//! │                    │             └── the unit the register sells        │
//! │                    └── a name grouping its pack sizes                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Search and barcode lookup return [`CatalogEntry`] rows: one row per
//! variant, joined with its product and brand, ready for the register.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use duka_core::validation::{
    validate_barcode, validate_price_cents, validate_product_name, validate_purchase_price_cents,
    validate_search_query, validate_stock_quantity, validate_variant_name,
};
use duka_core::{
    Brand, CatalogEntry, Category, Product, Supplier, Variant, DEFAULT_REORDER_LEVEL,
};

// =============================================================================
// Input Types
// =============================================================================

/// Input for creating a variant under a product.
#[derive(Debug, Clone)]
pub struct NewVariant {
    pub name: String,
    pub price_cents: i64,
    pub purchase_price_cents: Option<i64>,
    pub barcode: Option<String>,
    pub stock_quantity: i64,
    /// Defaults to [`DEFAULT_REORDER_LEVEL`] when None.
    pub reorder_level: Option<i64>,
}

/// Input for creating a product with its initial variant set.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category_id: Option<String>,
    pub brand_id: Option<String>,
    pub supplier_id: Option<String>,
    pub variants: Vec<NewVariant>,
}

/// Input for updating a product and reconciling its variant set.
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub name: String,
    pub category_id: Option<String>,
    pub brand_id: Option<String>,
    pub supplier_id: Option<String>,
    pub variants: Vec<VariantUpdate>,
}

/// One variant in a product update: existing rows carry their id,
/// new rows carry None. Existing variants missing from the list are deleted.
#[derive(Debug, Clone)]
pub struct VariantUpdate {
    pub id: Option<String>,
    pub name: String,
    pub price_cents: i64,
    pub purchase_price_cents: Option<i64>,
    pub barcode: Option<String>,
    pub stock_quantity: i64,
    pub reorder_level: Option<i64>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Categories & Brands
    // =========================================================================

    /// Returns the category with this name, creating it if absent.
    ///
    /// Product forms let the operator type a category; get-or-create avoids
    /// a separate management step for the common case.
    pub async fn ensure_category(&self, name: &str) -> DbResult<Category> {
        let name = name.trim();
        validate_product_name(name).map_err(duka_core::CoreError::from)?;

        if let Some(existing) = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at FROM categories WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        {
            return Ok(existing);
        }

        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO categories (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %category.id, name = %category.name, "Created category");
        Ok(category)
    }

    /// Lists all categories ordered by name.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Returns the brand with this name, creating it if absent.
    pub async fn ensure_brand(&self, name: &str) -> DbResult<Brand> {
        let name = name.trim();
        validate_product_name(name).map_err(duka_core::CoreError::from)?;

        if let Some(existing) = sqlx::query_as::<_, Brand>(
            "SELECT id, name, description, created_at FROM brands WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        {
            return Ok(existing);
        }

        let brand = Brand {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO brands (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&brand.id)
        .bind(&brand.name)
        .bind(&brand.description)
        .bind(brand.created_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %brand.id, name = %brand.name, "Created brand");
        Ok(brand)
    }

    /// Lists all brands ordered by name.
    pub async fn list_brands(&self) -> DbResult<Vec<Brand>> {
        let brands = sqlx::query_as::<_, Brand>(
            "SELECT id, name, description, created_at FROM brands ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(brands)
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    /// Adds a supplier.
    pub async fn add_supplier(
        &self,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
        address: Option<&str>,
    ) -> DbResult<Supplier> {
        validate_product_name(name).map_err(duka_core::CoreError::from)?;

        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            phone: phone.map(str::to_string),
            email: email.map(str::to_string),
            address: address.map(str::to_string),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, phone, email, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %supplier.id, name = %supplier.name, "Created supplier");
        Ok(supplier)
    }

    /// Lists all suppliers ordered by name.
    pub async fn list_suppliers(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, phone, email, address, created_at FROM suppliers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    // =========================================================================
    // Products & Variants
    // =========================================================================

    /// Creates a product with its initial variants in one transaction.
    ///
    /// ## Errors
    /// - Validation errors for names, prices, barcodes
    /// - [`DbError::UniqueViolation`] for a duplicate barcode
    pub async fn create_product(&self, input: NewProduct) -> DbResult<Product> {
        validate_product_name(&input.name).map_err(duka_core::CoreError::from)?;
        for v in &input.variants {
            validate_new_variant(v)?;
        }

        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            category_id: input.category_id,
            brand_id: input.brand_id,
            supplier_id: input.supplier_id,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category_id, brand_id, supplier_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(&product.brand_id)
        .bind(&product.supplier_id)
        .bind(product.created_at)
        .execute(&mut *tx)
        .await?;

        for v in &input.variants {
            insert_variant(&mut tx, &product.id, v).await?;
        }

        tx.commit().await?;

        debug!(id = %product.id, name = %product.name, variants = input.variants.len(), "Created product");
        Ok(product)
    }

    /// Updates a product and reconciles its variant set in one transaction.
    ///
    /// Variants carrying an id are updated in place (stock included);
    /// variants without an id are inserted; existing variants absent from
    /// the list are deleted.
    pub async fn update_product(&self, product_id: &str, input: ProductUpdate) -> DbResult<()> {
        validate_product_name(&input.name).map_err(duka_core::CoreError::from)?;
        for v in &input.variants {
            validate_variant_update(v)?;
        }

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE products
            SET name = ?1, category_id = ?2, brand_id = ?3, supplier_id = ?4
            WHERE id = ?5
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.category_id)
        .bind(&input.brand_id)
        .bind(&input.supplier_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        // Delete variants no longer in the set
        let kept_ids: Vec<&str> = input
            .variants
            .iter()
            .filter_map(|v| v.id.as_deref())
            .collect();

        let existing: Vec<String> =
            sqlx::query_scalar("SELECT id FROM variants WHERE product_id = ?1")
                .bind(product_id)
                .fetch_all(&mut *tx)
                .await?;

        for id in existing.iter().filter(|id| !kept_ids.contains(&id.as_str())) {
            sqlx::query("DELETE FROM variants WHERE id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        for v in &input.variants {
            match &v.id {
                Some(id) => {
                    let updated = sqlx::query(
                        r#"
                        UPDATE variants
                        SET name = ?1, price_cents = ?2, purchase_price_cents = ?3,
                            barcode = ?4, stock_quantity = ?5, reorder_level = ?6
                        WHERE id = ?7 AND product_id = ?8
                        "#,
                    )
                    .bind(v.name.trim())
                    .bind(v.price_cents)
                    .bind(v.purchase_price_cents)
                    .bind(normalize_barcode(&v.barcode))
                    .bind(v.stock_quantity)
                    .bind(v.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL))
                    .bind(id)
                    .bind(product_id)
                    .execute(&mut *tx)
                    .await?;

                    if updated.rows_affected() == 0 {
                        return Err(DbError::not_found("Variant", id.clone()));
                    }
                }
                None => {
                    let new = NewVariant {
                        name: v.name.clone(),
                        price_cents: v.price_cents,
                        purchase_price_cents: v.purchase_price_cents,
                        barcode: v.barcode.clone(),
                        stock_quantity: v.stock_quantity,
                        reorder_level: v.reorder_level,
                    };
                    insert_variant(&mut tx, product_id, &new).await?;
                }
            }
        }

        tx.commit().await?;
        debug!(id = %product_id, "Updated product");
        Ok(())
    }

    /// Adds a variant to an existing product.
    pub async fn add_variant(&self, product_id: &str, input: NewVariant) -> DbResult<Variant> {
        validate_new_variant(&input)?;

        let mut tx = self.pool.begin().await?;
        let id = insert_variant(&mut tx, product_id, &input).await?;
        tx.commit().await?;

        self.get_variant(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Variant", id))
    }

    /// Gets a product by ID.
    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category_id, brand_id, supplier_id, created_at
            FROM products WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a variant by ID.
    pub async fn get_variant(&self, id: &str) -> DbResult<Option<Variant>> {
        let variant = sqlx::query_as::<_, Variant>(
            r#"
            SELECT id, product_id, name, price_cents, purchase_price_cents,
                   barcode, stock_quantity, reorder_level, created_at
            FROM variants WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(variant)
    }

    /// Lists all variants of a product.
    pub async fn variants_for_product(&self, product_id: &str) -> DbResult<Vec<Variant>> {
        let variants = sqlx::query_as::<_, Variant>(
            r#"
            SELECT id, product_id, name, price_cents, purchase_price_cents,
                   barcode, stock_quantity, reorder_level, created_at
            FROM variants WHERE product_id = ?1 ORDER BY name
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(variants)
    }

    /// Deletes a product and (cascade) its variants.
    ///
    /// Fails with [`DbError::ForeignKeyViolation`] when any variant has been
    /// sold; sale history is immutable.
    pub async fn delete_product(&self, id: &str) -> DbResult<()> {
        let deleted = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(id = %id, "Deleted product");
        Ok(())
    }

    // =========================================================================
    // Register Lookups
    // =========================================================================

    /// Searches the catalog by product name, brand name, or barcode.
    ///
    /// An empty query lists the catalog (up to `limit`). Returns one row per
    /// variant, ready for the register grid.
    pub async fn search(&self, query: &str, limit: i64) -> DbResult<Vec<CatalogEntry>> {
        let query = validate_search_query(query).map_err(duka_core::CoreError::from)?;
        let pattern = format!("%{query}%");

        let entries = sqlx::query_as::<_, CatalogEntry>(
            r#"
            SELECT
                p.id AS product_id,
                v.id AS variant_id,
                p.name AS product_name,
                v.name AS variant_name,
                b.name AS brand_name,
                v.price_cents,
                v.stock_quantity,
                v.reorder_level
            FROM variants v
            JOIN products p ON p.id = v.product_id
            LEFT JOIN brands b ON b.id = p.brand_id
            WHERE ?1 = ''
               OR p.name LIKE ?2
               OR b.name LIKE ?2
               OR v.barcode LIKE ?2
            ORDER BY p.name, v.name
            LIMIT ?3
            "#,
        )
        .bind(&query)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Exact barcode lookup for scanner input.
    pub async fn find_by_barcode(&self, barcode: &str) -> DbResult<Option<CatalogEntry>> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Ok(None);
        }

        let entry = sqlx::query_as::<_, CatalogEntry>(
            r#"
            SELECT
                p.id AS product_id,
                v.id AS variant_id,
                p.name AS product_name,
                v.name AS variant_name,
                b.name AS brand_name,
                v.price_cents,
                v.stock_quantity,
                v.reorder_level
            FROM variants v
            JOIN products p ON p.id = v.product_id
            LEFT JOIN brands b ON b.id = p.brand_id
            WHERE v.barcode = ?1
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Variants at or below their reorder level, most depleted first.
    pub async fn low_stock(&self) -> DbResult<Vec<CatalogEntry>> {
        let entries = sqlx::query_as::<_, CatalogEntry>(
            r#"
            SELECT
                p.id AS product_id,
                v.id AS variant_id,
                p.name AS product_name,
                v.name AS variant_name,
                b.name AS brand_name,
                v.price_cents,
                v.stock_quantity,
                v.reorder_level
            FROM variants v
            JOIN products p ON p.id = v.product_id
            LEFT JOIN brands b ON b.id = p.brand_id
            WHERE v.stock_quantity <= v.reorder_level
            ORDER BY v.stock_quantity ASC, p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// Adjusts stock by a signed delta (restock positive, shrinkage negative).
    ///
    /// The UPDATE is guarded so the result can never go negative; a matched
    /// count of zero means the decrement would oversell.
    pub async fn adjust_stock(&self, variant_id: &str, delta: i64) -> DbResult<i64> {
        let updated = sqlx::query(
            r#"
            UPDATE variants
            SET stock_quantity = stock_quantity + ?1
            WHERE id = ?2 AND stock_quantity + ?1 >= 0
            "#,
        )
        .bind(delta)
        .bind(variant_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            // Distinguish missing variant from an oversell
            return match self.get_variant(variant_id).await? {
                Some(v) => Err(DbError::InsufficientStock {
                    name: v.name,
                    requested: -delta,
                }),
                None => Err(DbError::not_found("Variant", variant_id)),
            };
        }

        let stock: i64 = sqlx::query_scalar("SELECT stock_quantity FROM variants WHERE id = ?1")
            .bind(variant_id)
            .fetch_one(&self.pool)
            .await?;

        debug!(variant_id = %variant_id, delta, stock, "Adjusted stock");
        Ok(stock)
    }

    /// Sets stock to an absolute count (stocktake correction).
    pub async fn set_stock(&self, variant_id: &str, quantity: i64) -> DbResult<()> {
        validate_stock_quantity(quantity).map_err(duka_core::CoreError::from)?;

        let updated = sqlx::query("UPDATE variants SET stock_quantity = ?1 WHERE id = ?2")
            .bind(quantity)
            .bind(variant_id)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(DbError::not_found("Variant", variant_id));
        }

        debug!(variant_id = %variant_id, quantity, "Set stock");
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn validate_new_variant(v: &NewVariant) -> DbResult<()> {
    validate_variant_name(&v.name).map_err(duka_core::CoreError::from)?;
    validate_price_cents(v.price_cents).map_err(duka_core::CoreError::from)?;
    if let Some(cost) = v.purchase_price_cents {
        validate_purchase_price_cents(cost).map_err(duka_core::CoreError::from)?;
    }
    if let Some(barcode) = normalize_barcode(&v.barcode) {
        validate_barcode(&barcode).map_err(duka_core::CoreError::from)?;
    }
    validate_stock_quantity(v.stock_quantity).map_err(duka_core::CoreError::from)?;
    Ok(())
}

fn validate_variant_update(v: &VariantUpdate) -> DbResult<()> {
    validate_new_variant(&NewVariant {
        name: v.name.clone(),
        price_cents: v.price_cents,
        purchase_price_cents: v.purchase_price_cents,
        barcode: v.barcode.clone(),
        stock_quantity: v.stock_quantity,
        reorder_level: v.reorder_level,
    })
}

/// Empty or whitespace barcodes are stored as NULL so the partial unique
/// index never sees them.
fn normalize_barcode(barcode: &Option<String>) -> Option<String> {
    barcode
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
}

async fn insert_variant(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    product_id: &str,
    v: &NewVariant,
) -> DbResult<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO variants (
            id, product_id, name, price_cents, purchase_price_cents,
            barcode, stock_quantity, reorder_level, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&id)
    .bind(product_id)
    .bind(v.name.trim())
    .bind(v.price_cents)
    .bind(v.purchase_price_cents)
    .bind(normalize_barcode(&v.barcode))
    .bind(v.stock_quantity)
    .bind(v.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL))
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    Ok(id)
}

// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn variant(name: &str, price_cents: i64, stock: i64, barcode: Option<&str>) -> NewVariant {
        NewVariant {
            name: name.to_string(),
            price_cents,
            purchase_price_cents: Some(price_cents * 3 / 4),
            barcode: barcode.map(str::to_string),
            stock_quantity: stock,
            reorder_level: Some(5),
        }
    }

    #[tokio::test]
    async fn test_create_and_search_product() {
        let db = test_db().await;
        let catalog = db.catalog();

        let brand = catalog.ensure_brand("Capwell").await.unwrap();
        let product = catalog
            .create_product(NewProduct {
                name: "Basmati Rice".to_string(),
                category_id: None,
                brand_id: Some(brand.id.clone()),
                supplier_id: None,
                variants: vec![
                    variant("1kg", 25000, 20, Some("6161100123457")),
                    variant("5kg", 110000, 8, None),
                ],
            })
            .await
            .unwrap();

        let variants = catalog.variants_for_product(&product.id).await.unwrap();
        assert_eq!(variants.len(), 2);

        let by_name = catalog.search("basmati", 20).await.unwrap();
        assert_eq!(by_name.len(), 2);
        assert_eq!(by_name[0].display_name(), "Basmati Rice (1kg)");

        let by_brand = catalog.search("capwell", 20).await.unwrap();
        assert_eq!(by_brand.len(), 2);

        let none = catalog.search("sugar", 20).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_lists_catalog() {
        let db = test_db().await;
        let catalog = db.catalog();

        catalog
            .create_product(NewProduct {
                name: "Milk".to_string(),
                category_id: None,
                brand_id: None,
                supplier_id: None,
                variants: vec![variant("500ml", 6500, 30, None)],
            })
            .await
            .unwrap();

        let all = catalog.search("", 20).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_barcode_lookup_and_uniqueness() {
        let db = test_db().await;
        let catalog = db.catalog();

        catalog
            .create_product(NewProduct {
                name: "Soda".to_string(),
                category_id: None,
                brand_id: None,
                supplier_id: None,
                variants: vec![variant("330ml", 5000, 50, Some("5449000000996"))],
            })
            .await
            .unwrap();

        let found = catalog.find_by_barcode("5449000000996").await.unwrap();
        assert!(found.is_some());
        assert!(catalog.find_by_barcode("0000").await.unwrap().is_none());

        // Second variant with the same barcode must be rejected
        let err = catalog
            .create_product(NewProduct {
                name: "Other Soda".to_string(),
                category_id: None,
                brand_id: None,
                supplier_id: None,
                variants: vec![variant("330ml", 5500, 10, Some("5449000000996"))],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // And the rejected product must not exist at all (tx rolled back)
        assert!(catalog.search("Other Soda", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_multiple_variants_without_barcode_allowed() {
        let db = test_db().await;
        let catalog = db.catalog();

        catalog
            .create_product(NewProduct {
                name: "Loose Beans".to_string(),
                category_id: None,
                brand_id: None,
                supplier_id: None,
                variants: vec![
                    variant("1kg", 18000, 10, None),
                    variant("2kg", 34000, 10, None),
                ],
            })
            .await
            .unwrap();

        let entries = catalog.search("beans", 20).await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_ensure_category_is_idempotent() {
        let db = test_db().await;
        let catalog = db.catalog();

        let first = catalog.ensure_category("Grains").await.unwrap();
        let second = catalog.ensure_category("Grains").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(catalog.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_product_reconciles_variants() {
        let db = test_db().await;
        let catalog = db.catalog();

        let product = catalog
            .create_product(NewProduct {
                name: "Flour".to_string(),
                category_id: None,
                brand_id: None,
                supplier_id: None,
                variants: vec![
                    variant("1kg", 16000, 10, None),
                    variant("2kg", 30000, 5, None),
                ],
            })
            .await
            .unwrap();

        let existing = catalog.variants_for_product(&product.id).await.unwrap();
        let keep = existing.iter().find(|v| v.name == "1kg").unwrap();

        catalog
            .update_product(
                &product.id,
                ProductUpdate {
                    name: "Wheat Flour".to_string(),
                    category_id: None,
                    brand_id: None,
                    supplier_id: None,
                    variants: vec![
                        VariantUpdate {
                            id: Some(keep.id.clone()),
                            name: "1kg".to_string(),
                            price_cents: 17000,
                            purchase_price_cents: Some(12000),
                            barcode: None,
                            stock_quantity: 12,
                            reorder_level: Some(5),
                        },
                        VariantUpdate {
                            id: None,
                            name: "500g".to_string(),
                            price_cents: 9000,
                            purchase_price_cents: Some(6500),
                            barcode: None,
                            stock_quantity: 20,
                            reorder_level: None,
                        },
                    ],
                },
            )
            .await
            .unwrap();

        let product = catalog.get_product(&product.id).await.unwrap().unwrap();
        assert_eq!(product.name, "Wheat Flour");

        let variants = catalog.variants_for_product(&product.id).await.unwrap();
        assert_eq!(variants.len(), 2);
        assert!(variants.iter().any(|v| v.name == "500g"));
        assert!(variants.iter().all(|v| v.name != "2kg"));

        let kept = variants.iter().find(|v| v.name == "1kg").unwrap();
        assert_eq!(kept.price_cents, 17000);
        assert_eq!(kept.stock_quantity, 12);
    }

    #[tokio::test]
    async fn test_low_stock() {
        let db = test_db().await;
        let catalog = db.catalog();

        catalog
            .create_product(NewProduct {
                name: "Sugar".to_string(),
                category_id: None,
                brand_id: None,
                supplier_id: None,
                variants: vec![
                    variant("1kg", 15000, 3, None),  // reorder_level 5 → low
                    variant("2kg", 28000, 50, None), // plenty
                ],
            })
            .await
            .unwrap();

        let low = catalog.low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].variant_name, "1kg");
    }

    #[tokio::test]
    async fn test_adjust_stock_guarded() {
        let db = test_db().await;
        let catalog = db.catalog();

        let product = catalog
            .create_product(NewProduct {
                name: "Tea".to_string(),
                category_id: None,
                brand_id: None,
                supplier_id: None,
                variants: vec![variant("250g", 12000, 5, None)],
            })
            .await
            .unwrap();
        let v = &catalog.variants_for_product(&product.id).await.unwrap()[0];

        assert_eq!(catalog.adjust_stock(&v.id, 10).await.unwrap(), 15);
        assert_eq!(catalog.adjust_stock(&v.id, -15).await.unwrap(), 0);

        let err = catalog.adjust_stock(&v.id, -1).await.unwrap_err();
        assert!(matches!(err, DbError::InsufficientStock { .. }));

        // Stock untouched by the failed decrement
        let v = catalog.get_variant(&v.id).await.unwrap().unwrap();
        assert_eq!(v.stock_quantity, 0);
    }

    #[tokio::test]
    async fn test_validation_rejects_bad_variant() {
        let db = test_db().await;
        let catalog = db.catalog();

        let err = catalog
            .create_product(NewProduct {
                name: "Bad".to_string(),
                category_id: None,
                brand_id: None,
                supplier_id: None,
                variants: vec![variant("1kg", 0, 10, None)],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));
    }
}
