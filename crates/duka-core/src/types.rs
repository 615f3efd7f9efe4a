//! # Domain Types
//!
//! Core domain types used throughout Duka POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Variant     │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  product_id     │   │  shift_id       │       │
//! │  │  category_id    │   │  price_cents    │   │  total_cents    │       │
//! │  │  brand_id       │   │  stock_quantity │   │  tax_cents      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │     TaxMode     │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Exclusive      │   │  Cash  Card     │       │
//! │  │  1600 = 16%     │   │  Inclusive      │   │  Mpesa Bank     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A Product is a named catalog entry; its sellable units are Variants
//! (pack sizes), each carrying its own price, barcode and stock. Sales are
//! immutable once written: the header row, per-line items, and per-method
//! payment rows together form the audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1600 bps = 16% (e.g., Kenyan VAT)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (settings store convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Tax Mode & Config
// =============================================================================

/// Whether catalog prices already contain tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    /// Prices are pre-tax; tax is added at settlement (USA model).
    Exclusive,
    /// Prices include tax; the pre-tax component is back-computed (EU model).
    Inclusive,
}

impl Default for TaxMode {
    fn default() -> Self {
        TaxMode::Exclusive
    }
}

/// Totals derived from a cart subtotal under a given tax configuration.
///
/// `subtotal_cents` is always the pre-tax figure, whichever mode produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

/// Explicit tax configuration passed into the cart and tender engine.
///
/// ## Why a Value Object?
/// The rate and mode come from the settings store, but the engine never
/// reads them ambiently - callers resolve a `TaxConfig` once and hand it in,
/// which keeps tax behavior unit-testable with no settings store at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaxConfig {
    pub rate: TaxRate,
    pub mode: TaxMode,
}

impl TaxConfig {
    /// Creates a tax configuration.
    pub const fn new(rate: TaxRate, mode: TaxMode) -> Self {
        TaxConfig { rate, mode }
    }

    /// Computes totals for a cart subtotal (the sum of line totals as priced).
    ///
    /// - **Exclusive**: subtotal is pre-tax; `tax = subtotal × rate`,
    ///   `total = subtotal + tax`.
    /// - **Inclusive**: the summed prices already include tax;
    ///   `total = subtotal-as-summed`, pre-tax subtotal is back-computed and
    ///   `tax = total − pre-tax`.
    pub fn breakdown(&self, cart_subtotal: Money) -> TaxBreakdown {
        match self.mode {
            TaxMode::Exclusive => {
                let tax = cart_subtotal.calculate_tax(self.rate);
                TaxBreakdown {
                    subtotal_cents: cart_subtotal.cents(),
                    tax_cents: tax.cents(),
                    total_cents: (cart_subtotal + tax).cents(),
                }
            }
            TaxMode::Inclusive => {
                let ex = cart_subtotal.strip_tax(self.rate);
                TaxBreakdown {
                    subtotal_cents: ex.cents(),
                    tax_cents: (cart_subtotal - ex).cents(),
                    total_cents: cart_subtotal.cents(),
                }
            }
        }
    }

    /// Converts a catalog price to the tax-exclusive unit price persisted on
    /// sale items. Exclusive mode stores prices as-is; inclusive mode strips
    /// the tax component.
    pub fn unit_price_ex_tax(&self, price: Money) -> Money {
        match self.mode {
            TaxMode::Exclusive => price,
            TaxMode::Inclusive => price.strip_tax(self.rate),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a (part of a) sale was paid.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash in the drawer.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// M-Pesa mobile money.
    Mpesa,
    /// Direct bank transfer.
    Bank,
}

// =============================================================================
// User & Role
// =============================================================================

/// Operator role.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
}

/// A POS operator account.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Argon2 PHC-format hash; never the plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Catalog Entities
// =============================================================================

/// A product category.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A product brand.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A supplier the store restocks from.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A product in the catalog. Sellable units are its [`Variant`]s.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    /// Display name; required, non-empty.
    pub name: String,
    pub category_id: Option<String>,
    pub brand_id: Option<String>,
    pub supplier_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A specific sellable unit of a product (e.g., "1kg", "500g"),
/// carrying its own price, barcode and stock.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub product_id: String,
    pub name: String,
    /// Selling price in cents; at least 1.
    pub price_cents: i64,
    /// What the store paid per unit; used for profit reporting.
    pub purchase_price_cents: Option<i64>,
    /// Optional; unique across variants when non-empty.
    pub barcode: Option<String>,
    /// Units on hand; never negative.
    pub stock_quantity: i64,
    /// Restock threshold for the low-stock report.
    pub reorder_level: i64,
    pub created_at: DateTime<Utc>,
}

impl Variant {
    /// Returns the selling price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// True when stock has fallen to or below the reorder level.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.reorder_level
    }

    /// True when at least one unit is on hand.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// Denormalised product + variant row used to populate the cart.
///
/// This is the shape catalog search and barcode lookup return: everything the
/// register needs to render a tile and gate stock, in one row.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub product_id: String,
    pub variant_id: String,
    pub product_name: String,
    pub variant_name: String,
    pub brand_name: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: i64,
    pub reorder_level: i64,
}

impl CatalogEntry {
    /// Display name shown on cart lines and receipts: "Product (Variant)".
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.product_name, self.variant_name)
    }
}

// =============================================================================
// Shift
// =============================================================================

/// A bounded operating session for one cashier: opens with a cash count,
/// closes with one. All sales attach to the open shift.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: String,
    pub user_id: String,
    pub opening_cash_cents: i64,
    /// Null until the shift is closed.
    pub closing_cash_cents: Option<i64>,
    pub started_at: DateTime<Utc>,
    /// Null while the shift is open. At most one open shift per user.
    pub ended_at: Option<DateTime<Utc>>,
}

impl Shift {
    /// True while the shift is accepting sales.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

// =============================================================================
// Sale, Sale Item, Sale Payment
// =============================================================================

/// A settled sale header. Immutable once written.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub shift_id: String,
    /// Pre-tax subtotal.
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    /// subtotal + tax − discount, by construction.
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// A line item of a settled sale.
///
/// Uses the snapshot pattern: the display name and unit price are frozen at
/// settlement so later catalog edits never rewrite history. Product/variant
/// references are null for ad-hoc custom items.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    /// Display name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    /// Always tax-exclusive, whichever tax mode priced the cart.
    pub unit_price_cents: i64,
    /// quantity × unit_price_cents.
    pub subtotal_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// One payment towards a sale. A sale has one row per tender entry;
/// the amounts sum to the sale total exactly.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalePayment {
    pub id: String,
    pub sale_id: String,
    pub method: PaymentMethod,
    pub amount_cents: i64,
    /// Free-text reference for non-cash methods (M-Pesa code, card auth).
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SalePayment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
