//! # Report Repository
//!
//! Read-only reporting over settled sales and inventory.
//!
//! ## Reports
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Available Reports                                │
//! │                                                                         │
//! │  summary(range)          → count, gross, tax, average ticket           │
//! │  revenue_by_method(range)→ cash vs card vs mpesa vs bank               │
//! │  top_sellers(range, n)   → best items by quantity, then revenue        │
//! │  items_sold(range)       → total units across all lines                │
//! │  profit(range)           → revenue − cost (purchase price)             │
//! │  sales_in_range(range)   → raw sale headers for drill-down             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All ranges are half-open `[from, to)` in UTC. Everything here is a
//! plain aggregate over the immutable sale tables; no report mutates state.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use duka_core::{PaymentMethod, Sale};
use serde::Serialize;

// =============================================================================
// Report DTOs
// =============================================================================

/// Headline numbers for a period.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalesSummary {
    pub sales_count: i64,
    pub gross_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub average_sale_cents: i64,
}

/// Takings per payment method for a period.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MethodRevenue {
    pub method: PaymentMethod,
    pub payment_count: i64,
    pub amount_cents: i64,
}

/// One row of the top-sellers report.
///
/// Profit is revenue minus recorded purchase cost; zero-cost lines
/// (custom items, cost-unknown variants) count as pure revenue.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopSeller {
    pub name_snapshot: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
    pub profit_cents: i64,
}

/// Revenue minus cost for a period.
///
/// Cost comes from variant purchase prices; lines with no recorded cost
/// (custom items, cost-unknown variants) contribute zero cost.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProfitSummary {
    pub revenue_cents: i64,
    pub cost_cents: i64,
    pub profit_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sales count, gross, tax and average ticket for `[from, to)`.
    pub async fn summary(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<SalesSummary> {
        let summary = sqlx::query_as::<_, SalesSummary>(
            r#"
            SELECT
                COUNT(*) AS sales_count,
                COALESCE(SUM(total_cents), 0) AS gross_cents,
                COALESCE(SUM(tax_cents), 0) AS tax_cents,
                COALESCE(SUM(discount_cents), 0) AS discount_cents,
                COALESCE(SUM(total_cents) / NULLIF(COUNT(*), 0), 0) AS average_sale_cents
            FROM sales
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        debug!(sales = summary.sales_count, gross = summary.gross_cents, "Summary report");
        Ok(summary)
    }

    /// Takings per payment method for `[from, to)`, largest first.
    pub async fn revenue_by_method(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<MethodRevenue>> {
        let rows = sqlx::query_as::<_, MethodRevenue>(
            r#"
            SELECT
                sp.method,
                COUNT(*) AS payment_count,
                COALESCE(SUM(sp.amount_cents), 0) AS amount_cents
            FROM sale_payments sp
            JOIN sales s ON s.id = sp.sale_id
            WHERE s.created_at >= ?1 AND s.created_at < ?2
            GROUP BY sp.method
            ORDER BY amount_cents DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Best-selling items by quantity (revenue breaks ties) for `[from, to)`.
    ///
    /// Grouped by the frozen name snapshot, so renamed catalog items keep
    /// their historical identity.
    pub async fn top_sellers(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<TopSeller>> {
        let rows = sqlx::query_as::<_, TopSeller>(
            r#"
            SELECT
                si.name_snapshot,
                SUM(si.quantity) AS quantity_sold,
                SUM(si.subtotal_cents) AS revenue_cents,
                SUM(si.subtotal_cents - si.quantity * COALESCE(v.purchase_price_cents, 0))
                    AS profit_cents
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            LEFT JOIN variants v ON v.id = si.variant_id
            WHERE s.created_at >= ?1 AND s.created_at < ?2
            GROUP BY si.name_snapshot
            ORDER BY quantity_sold DESC, revenue_cents DESC
            LIMIT ?3
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Total units sold across all lines for `[from, to)`.
    pub async fn items_sold(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> DbResult<i64> {
        let units: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(si.quantity), 0)
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.created_at >= ?1 AND s.created_at < ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(units)
    }

    /// Revenue minus cost for `[from, to)`.
    pub async fn profit(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> DbResult<ProfitSummary> {
        let profit = sqlx::query_as::<_, ProfitSummary>(
            r#"
            SELECT
                COALESCE(SUM(si.subtotal_cents), 0) AS revenue_cents,
                COALESCE(SUM(si.quantity * COALESCE(v.purchase_price_cents, 0)), 0) AS cost_cents,
                COALESCE(SUM(si.subtotal_cents), 0)
                    - COALESCE(SUM(si.quantity * COALESCE(v.purchase_price_cents, 0)), 0)
                    AS profit_cents
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            LEFT JOIN variants v ON v.id = si.variant_id
            WHERE s.created_at >= ?1 AND s.created_at < ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(profit)
    }

    /// Raw sale headers for `[from, to)`, oldest first, for drill-down views.
    pub async fn sales_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, shift_id, subtotal_cents, tax_cents, discount_cents, total_cents, created_at
            FROM sales
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

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
    use chrono::Duration;
    use duka_core::{
        settle_single, settle_split, Cart, Money, Role, SplitTender, TaxConfig, TaxMode, TaxRate,
    };

    /// Seeds a user, an open shift, two products and two settled sales:
    /// one cash (2 × Rice 1kg) and one split cash+mpesa (1 × Soda).
    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = db
            .users()
            .create("cashier1", "1234", Role::Cashier)
            .await
            .unwrap();
        let shift = db.shifts().start_shift(&user.id, 0).await.unwrap();

        db.catalog()
            .create_product(NewProduct {
                name: "Rice".to_string(),
                category_id: None,
                brand_id: None,
                supplier_id: None,
                variants: vec![NewVariant {
                    name: "1kg".to_string(),
                    price_cents: 10000,
                    purchase_price_cents: Some(7000),
                    barcode: None,
                    stock_quantity: 50,
                    reorder_level: Some(5),
                }],
            })
            .await
            .unwrap();
        db.catalog()
            .create_product(NewProduct {
                name: "Soda".to_string(),
                category_id: None,
                brand_id: None,
                supplier_id: None,
                variants: vec![NewVariant {
                    name: "330ml".to_string(),
                    price_cents: 5000,
                    purchase_price_cents: Some(3000),
                    barcode: None,
                    stock_quantity: 50,
                    reorder_level: Some(5),
                }],
            })
            .await
            .unwrap();

        let tax = TaxConfig::new(TaxRate::zero(), TaxMode::Exclusive);

        let rice = db.catalog().search("rice", 10).await.unwrap().remove(0);
        let mut cart = Cart::new();
        cart.add_item(&rice).unwrap();
        cart.add_item(&rice).unwrap();
        let s1 = settle_single(
            &cart,
            &tax,
            duka_core::PaymentMethod::Cash,
            None,
            Some(Money::from_cents(20000)),
        )
        .unwrap();
        db.sales().settle(&shift.id, &s1).await.unwrap();

        let soda = db.catalog().search("soda", 10).await.unwrap().remove(0);
        let mut cart = Cart::new();
        cart.add_item(&soda).unwrap();
        let mut tender = SplitTender::new(Money::from_cents(5000));
        tender
            .add_entry(duka_core::PaymentMethod::Cash, Money::from_cents(2000), None)
            .unwrap();
        tender
            .add_entry(
                duka_core::PaymentMethod::Mpesa,
                Money::from_cents(3000),
                Some("REF1".to_string()),
            )
            .unwrap();
        let s2 = settle_split(&cart, &tax, tender).unwrap();
        db.sales().settle(&shift.id, &s2).await.unwrap();

        db
    }

    fn wide_range() -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now - Duration::hours(1), now + Duration::hours(1))
    }

    #[tokio::test]
    async fn test_summary() {
        let db = seeded_db().await;
        let (from, to) = wide_range();

        let summary = db.reports().summary(from, to).await.unwrap();
        assert_eq!(summary.sales_count, 2);
        assert_eq!(summary.gross_cents, 25000);
        assert_eq!(summary.tax_cents, 0);
        assert_eq!(summary.discount_cents, 0);
        assert_eq!(summary.average_sale_cents, 12500);
    }

    #[tokio::test]
    async fn test_summary_empty_range() {
        let db = seeded_db().await;
        let from = Utc::now() + Duration::days(7);
        let to = from + Duration::days(1);

        let summary = db.reports().summary(from, to).await.unwrap();
        assert_eq!(summary.sales_count, 0);
        assert_eq!(summary.gross_cents, 0);
        assert_eq!(summary.average_sale_cents, 0);
    }

    #[tokio::test]
    async fn test_revenue_by_method() {
        let db = seeded_db().await;
        let (from, to) = wide_range();

        let rows = db.reports().revenue_by_method(from, to).await.unwrap();
        assert_eq!(rows.len(), 2);

        let cash = rows
            .iter()
            .find(|r| r.method == duka_core::PaymentMethod::Cash)
            .unwrap();
        assert_eq!(cash.amount_cents, 22000);
        assert_eq!(cash.payment_count, 2);

        let mpesa = rows
            .iter()
            .find(|r| r.method == duka_core::PaymentMethod::Mpesa)
            .unwrap();
        assert_eq!(mpesa.amount_cents, 3000);

        // Conservation: method takings sum to gross
        let total: i64 = rows.iter().map(|r| r.amount_cents).sum();
        assert_eq!(total, 25000);
    }

    #[tokio::test]
    async fn test_top_sellers() {
        let db = seeded_db().await;
        let (from, to) = wide_range();

        let top = db.reports().top_sellers(from, to, 10).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name_snapshot, "Rice (1kg)");
        assert_eq!(top[0].quantity_sold, 2);
        assert_eq!(top[0].revenue_cents, 20000);
        // 2 units at 7000 cost each
        assert_eq!(top[0].profit_cents, 6000);
    }

    #[tokio::test]
    async fn test_items_sold() {
        let db = seeded_db().await;
        let (from, to) = wide_range();

        // 2 × Rice + 1 × Soda
        assert_eq!(db.reports().items_sold(from, to).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_profit() {
        let db = seeded_db().await;
        let (from, to) = wide_range();

        let profit = db.reports().profit(from, to).await.unwrap();
        // Revenue: 20000 + 5000; cost: 2×7000 + 3000
        assert_eq!(profit.revenue_cents, 25000);
        assert_eq!(profit.cost_cents, 17000);
        assert_eq!(profit.profit_cents, 8000);
    }

    #[tokio::test]
    async fn test_sales_in_range() {
        let db = seeded_db().await;
        let (from, to) = wide_range();

        let sales = db.reports().sales_in_range(from, to).await.unwrap();
        assert_eq!(sales.len(), 2);
        assert!(sales[0].created_at <= sales[1].created_at);
    }
}
