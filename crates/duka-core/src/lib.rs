//! # duka-core: Pure Business Logic for Duka POS
//!
//! This crate is the **heart** of Duka POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Duka POS Data Flow                              │
//! │                                                                         │
//! │  Operator actions (search, scan, tender)                               │
//! │       │                                                                 │
//! │  ┌────▼────────────────────────────────────────────────────────────┐   │
//! │  │                ★ duka-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  tender   │  │   │
//! │  │   │  Variant  │  │   Money   │  │   Cart    │  │ Settlement│  │   │
//! │  │   │   Sale    │  │ TaxConfig │  │ CartLine  │  │SplitTender│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └────┬────────────────────────────────────────────────────────────┘   │
//! │       │  Settlement (validated, ready to persist)                      │
//! │  ┌────▼────────────────────────────────────────────────────────────┐   │
//! │  │                    duka-db (Database Layer)                     │   │
//! │  │        one atomic transaction per settled sale (SQLite)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Variant, Sale, SalePayment, Shift, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - In-memory cart assembled before tender
//! - [`tender`] - Tender/settlement engine: totals, change, split payments
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use duka_core::money::Money;
//! use duka_core::types::{TaxConfig, TaxMode, TaxRate};
//!
//! // Create money from cents (never from floats!)
//! let subtotal = Money::from_cents(8621); // 86.21
//!
//! // 16% exclusive tax
//! let cfg = TaxConfig::new(TaxRate::from_bps(1600), TaxMode::Exclusive);
//! let totals = cfg.breakdown(subtotal);
//!
//! assert_eq!(totals.tax_cents, 1379);
//! assert_eq!(totals.total_cents, 10000); // 100.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod tender;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use duka_core::Money` instead of
// `use duka_core::money::Money`

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use tender::{settle_single, settle_split, Settlement, SettlementLine, SplitTender, TenderEntry};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps a single receipt to a sane size.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Default reorder level assigned to new variants when none is given.
pub const DEFAULT_REORDER_LEVEL: i64 = 10;
