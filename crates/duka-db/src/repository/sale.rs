//! # Sale Repository
//!
//! Atomic settlement and sale reads.
//!
//! ## Settlement Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Settlement (one transaction)                         │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │    1. Verify the shift exists and is still open                        │
//! │    2. INSERT sale header                                               │
//! │    3. INSERT one sale_items row per line (frozen snapshots)            │
//! │    4. INSERT one sale_payments row per tender entry                    │
//! │    5. For each catalog line:                                           │
//! │         UPDATE variants                                                │
//! │         SET stock_quantity = stock_quantity - qty                      │
//! │         WHERE id = ? AND stock_quantity >= qty                         │
//! │         └── 0 rows matched? → InsufficientStock → ROLLBACK             │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any failure rolls back everything: no half-recorded sale,             │
//! │  no stock drift. Stock can never go negative.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use duka_core::{CoreError, Sale, SaleItem, SalePayment, Settlement};

/// Outcome of a persisted settlement.
#[derive(Debug, Clone)]
pub struct SettledSale {
    pub sale_id: String,
    /// Cash to hand back, carried through from the settlement.
    pub change_cents: i64,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Persists a settlement against an open shift, atomically.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] when the shift doesn't exist
    /// - [`DbError::Domain`] ([`CoreError::NoOpenShift`]) when it is closed
    /// - [`DbError::InsufficientStock`] when any line would oversell;
    ///   the whole transaction rolls back
    pub async fn settle(&self, shift_id: &str, settlement: &Settlement) -> DbResult<SettledSale> {
        let mut tx = self.pool.begin().await?;

        // The shift must still be open at write time
        let shift_row: Option<(String, bool)> =
            sqlx::query_as("SELECT user_id, ended_at IS NULL FROM shifts WHERE id = ?1")
                .bind(shift_id)
                .fetch_optional(&mut *tx)
                .await?;

        match shift_row {
            None => return Err(DbError::not_found("Shift", shift_id)),
            Some((user_id, false)) => {
                return Err(DbError::Domain(CoreError::NoOpenShift { user_id }))
            }
            Some((_, true)) => {}
        }

        let sale_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO sales (id, shift_id, subtotal_cents, tax_cents, discount_cents, total_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale_id)
        .bind(shift_id)
        .bind(settlement.subtotal_cents)
        .bind(settlement.tax_cents)
        .bind(0i64)
        .bind(settlement.total_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for line in &settlement.lines {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, variant_id, name_snapshot,
                    quantity, unit_price_cents, subtotal_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale_id)
            .bind(&line.product_id)
            .bind(&line.variant_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.subtotal_cents)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        for payment in &settlement.payments {
            sqlx::query(
                r#"
                INSERT INTO sale_payments (id, sale_id, method, amount_cents, reference, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale_id)
            .bind(payment.method)
            .bind(payment.amount_cents)
            .bind(&payment.reference)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        // Guarded decrement: the predicate refuses to oversell, and a miss
        // aborts the whole settlement.
        for line in &settlement.lines {
            let Some(variant_id) = &line.variant_id else {
                continue; // custom items carry no stock
            };

            let updated = sqlx::query(
                r#"
                UPDATE variants
                SET stock_quantity = stock_quantity - ?1
                WHERE id = ?2 AND stock_quantity >= ?1
                "#,
            )
            .bind(line.quantity)
            .bind(variant_id)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(DbError::InsufficientStock {
                    name: line.name.clone(),
                    requested: line.quantity,
                });
            }
        }

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            shift_id = %shift_id,
            total_cents = settlement.total_cents,
            payments = settlement.payments.len(),
            "Sale settled"
        );

        Ok(SettledSale {
            sale_id,
            change_cents: settlement.change_cents,
        })
    }

    /// Resolves the user's open shift and settles against it.
    ///
    /// ## Errors
    /// - [`DbError::Domain`] ([`CoreError::NoOpenShift`]) when the user has
    ///   no open shift
    pub async fn settle_for_user(
        &self,
        user_id: &str,
        settlement: &Settlement,
    ) -> DbResult<SettledSale> {
        let shift_id: Option<String> =
            sqlx::query_scalar("SELECT id FROM shifts WHERE user_id = ?1 AND ended_at IS NULL")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let shift_id = shift_id.ok_or_else(|| {
            DbError::Domain(CoreError::NoOpenShift {
                user_id: user_id.to_string(),
            })
        })?;

        self.settle(&shift_id, settlement).await
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, shift_id, subtotal_cents, tax_cents, discount_cents, total_cents, created_at
            FROM sales WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists a sale's line items.
    pub async fn items_for_sale(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, variant_id, name_snapshot,
                   quantity, unit_price_cents, subtotal_cents, created_at
            FROM sale_items WHERE sale_id = ?1 ORDER BY created_at, id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists a sale's payment rows.
    pub async fn payments_for_sale(&self, sale_id: &str) -> DbResult<Vec<SalePayment>> {
        let payments = sqlx::query_as::<_, SalePayment>(
            r#"
            SELECT id, sale_id, method, amount_cents, reference, created_at
            FROM sale_payments WHERE sale_id = ?1 ORDER BY created_at, id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Sum of payment rows for a sale. Equals the sale total for any sale
    /// written through [`settle`](Self::settle).
    pub async fn total_paid(&self, sale_id: &str) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM sale_payments WHERE sale_id = ?1",
        )
        .bind(sale_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Lists sales in a shift, oldest first.
    pub async fn sales_for_shift(&self, shift_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, shift_id, subtotal_cents, tax_cents, discount_cents, total_cents, created_at
            FROM sales WHERE shift_id = ?1 ORDER BY created_at
            "#,
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(shift_id = %shift_id, count = sales.len(), "Listed sales for shift");
        Ok(sales)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::catalog::{NewProduct, NewVariant};
    use duka_core::{
        settle_single, settle_split, Cart, Money, PaymentMethod, Role, SplitTender, TaxConfig,
        TaxMode, TaxRate,
    };

    struct Fixture {
        db: Database,
        user_id: String,
        shift_id: String,
        entry: duka_core::CatalogEntry,
    }

    async fn fixture(stock: i64) -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = db
            .users()
            .create("cashier1", "1234", Role::Cashier)
            .await
            .unwrap();
        let shift = db.shifts().start_shift(&user.id, 100000).await.unwrap();

        db.catalog()
            .create_product(NewProduct {
                name: "Rice".to_string(),
                category_id: None,
                brand_id: None,
                supplier_id: None,
                variants: vec![NewVariant {
                    name: "1kg".to_string(),
                    price_cents: 8621,
                    purchase_price_cents: Some(6000),
                    barcode: None,
                    stock_quantity: stock,
                    reorder_level: Some(2),
                }],
            })
            .await
            .unwrap();

        let entry = db.catalog().search("rice", 10).await.unwrap().remove(0);

        Fixture {
            db,
            user_id: user.id,
            shift_id: shift.id,
            entry,
        }
    }

    fn tax_16_exclusive() -> TaxConfig {
        TaxConfig::new(TaxRate::from_bps(1600), TaxMode::Exclusive)
    }

    #[tokio::test]
    async fn test_settle_cash_sale() {
        let f = fixture(10).await;

        let mut cart = Cart::new();
        cart.add_item(&f.entry).unwrap();

        let settlement = settle_single(
            &cart,
            &tax_16_exclusive(),
            PaymentMethod::Cash,
            None,
            Some(Money::from_cents(10000)),
        )
        .unwrap();

        let settled = f.db.sales().settle(&f.shift_id, &settlement).await.unwrap();
        assert_eq!(settled.change_cents, 0);

        let sale = f
            .db
            .sales()
            .get_by_id(&settled.sale_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sale.subtotal_cents, 8621);
        assert_eq!(sale.tax_cents, 1379);
        assert_eq!(sale.total_cents, 10000);

        let items = f.db.sales().items_for_sale(&settled.sale_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name_snapshot, "Rice (1kg)");
        assert_eq!(items[0].quantity, 1);

        // Stock decremented
        let v = f
            .db
            .catalog()
            .get_variant(&f.entry.variant_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(v.stock_quantity, 9);
    }

    #[tokio::test]
    async fn test_settle_split_payments_conserved() {
        let f = fixture(10).await;

        let mut cart = Cart::new();
        cart.add_item(&f.entry).unwrap();
        let tax = tax_16_exclusive();
        let total = cart.totals(&tax).total_cents;

        let mut tender = SplitTender::new(Money::from_cents(total));
        tender
            .add_entry(PaymentMethod::Cash, Money::from_cents(4000), None)
            .unwrap();
        tender
            .add_entry(
                PaymentMethod::Mpesa,
                Money::from_cents(total - 4000),
                Some("QGH7XK91TP".to_string()),
            )
            .unwrap();

        let settlement = settle_split(&cart, &tax, tender).unwrap();
        let settled = f.db.sales().settle(&f.shift_id, &settlement).await.unwrap();

        let payments = f
            .db
            .sales()
            .payments_for_sale(&settled.sale_id)
            .await
            .unwrap();
        assert_eq!(payments.len(), 2);
        assert_eq!(f.db.sales().total_paid(&settled.sale_id).await.unwrap(), total);
        assert!(payments
            .iter()
            .any(|p| p.reference.as_deref() == Some("QGH7XK91TP")));
    }

    #[tokio::test]
    async fn test_oversell_rolls_back_everything() {
        let f = fixture(1).await;

        // Second product that settles fine on its own
        f.db.catalog()
            .create_product(NewProduct {
                name: "Soda".to_string(),
                category_id: None,
                brand_id: None,
                supplier_id: None,
                variants: vec![NewVariant {
                    name: "330ml".to_string(),
                    price_cents: 5000,
                    purchase_price_cents: None,
                    barcode: None,
                    stock_quantity: 10,
                    reorder_level: Some(2),
                }],
            })
            .await
            .unwrap();
        let soda = f.db.catalog().search("soda", 10).await.unwrap().remove(0);

        // Build the cart while rice stock was 1, then drain it behind its back
        let mut cart = Cart::new();
        cart.add_item(&soda).unwrap();
        cart.add_item(&f.entry).unwrap();
        f.db
            .catalog()
            .set_stock(&f.entry.variant_id, 0)
            .await
            .unwrap();

        let settlement = settle_single(
            &cart,
            &tax_16_exclusive(),
            PaymentMethod::Card,
            None,
            None,
        )
        .unwrap();

        let err = f
            .db
            .sales()
            .settle(&f.shift_id, &settlement)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InsufficientStock { .. }));

        // Nothing persisted: no sales, no items, no payments
        assert!(f
            .db
            .sales()
            .sales_for_shift(&f.shift_id)
            .await
            .unwrap()
            .is_empty());
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(f.db.pool())
            .await
            .unwrap();
        assert_eq!(items, 0);
        let payments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_payments")
            .fetch_one(f.db.pool())
            .await
            .unwrap();
        assert_eq!(payments, 0);

        // The soda line had plenty of stock; the rollback restored it too
        let soda = f
            .db
            .catalog()
            .get_variant(&soda.variant_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(soda.stock_quantity, 10);
    }

    #[tokio::test]
    async fn test_settle_requires_open_shift() {
        let f = fixture(10).await;
        f.db.shifts().close_shift(&f.shift_id, 100000).await.unwrap();

        let mut cart = Cart::new();
        cart.add_item(&f.entry).unwrap();
        let settlement =
            settle_single(&cart, &tax_16_exclusive(), PaymentMethod::Card, None, None).unwrap();

        let err = f
            .db
            .sales()
            .settle(&f.shift_id, &settlement)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::NoOpenShift { .. })
        ));
    }

    #[tokio::test]
    async fn test_settle_for_user_resolves_shift() {
        let f = fixture(10).await;

        let mut cart = Cart::new();
        cart.add_item(&f.entry).unwrap();
        let settlement =
            settle_single(&cart, &tax_16_exclusive(), PaymentMethod::Card, None, None).unwrap();

        let settled = f
            .db
            .sales()
            .settle_for_user(&f.user_id, &settlement)
            .await
            .unwrap();
        let sale = f
            .db
            .sales()
            .get_by_id(&settled.sale_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sale.shift_id, f.shift_id);

        // After closing the shift, settling for the user fails cleanly
        f.db.shifts().close_shift(&f.shift_id, 0).await.unwrap();
        let err = f
            .db
            .sales()
            .settle_for_user(&f.user_id, &settlement)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::NoOpenShift { .. })
        ));
    }

    #[tokio::test]
    async fn test_custom_items_skip_stock() {
        let f = fixture(5).await;

        let mut cart = Cart::new();
        cart.add_custom_item("Delivery", 20000, 1).unwrap();

        let settlement = settle_single(
            &cart,
            &tax_16_exclusive(),
            PaymentMethod::Cash,
            None,
            Some(Money::from_cents(23200)),
        )
        .unwrap();

        let settled = f.db.sales().settle(&f.shift_id, &settlement).await.unwrap();
        let items = f.db.sales().items_for_sale(&settled.sale_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].variant_id.is_none());

        // Catalog stock untouched
        let v = f
            .db
            .catalog()
            .get_variant(&f.entry.variant_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(v.stock_quantity, 5);
    }
}
