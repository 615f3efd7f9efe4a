//! # Error Types
//!
//! Domain-specific error types for duka-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  duka-core errors (this file)                                          │
//! │  ├── CoreError        - Cart preconditions + settlement failures       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  duka-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → operator feedback       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item name, amounts in cents)
//! 3. Errors are enum variants, never String
//! 4. None of these are fatal: every one leaves cart and tender state
//!    untouched so the operator can correct and retry

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the cart and the tender engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item has zero available stock and cannot be added to a cart.
    #[error("'{name}' is out of stock")]
    OutOfStock { name: String },

    /// Incrementing a cart line would exceed the stock on hand.
    ///
    /// ## When This Occurs
    /// The variant is already in the cart at `available` quantity and the
    /// operator tries to add one more.
    #[error("cannot add more '{name}' than the {available} in stock")]
    StockLimitExceeded { name: String, available: i64 },

    /// Settlement attempted with no lines in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Settlement attempted without an open shift for the operator.
    #[error("no open shift for user {user_id}")]
    NoOpenShift { user_id: String },

    /// Cash tendered is less than the amount due.
    #[error("insufficient cash: received {received_cents}, total {total_cents}")]
    InsufficientPayment { total_cents: i64, received_cents: i64 },

    /// Split payment entries do not sum to the sale total exactly.
    #[error("payments sum to {entered_cents}, sale total is {total_cents}")]
    UnbalancedPayment { total_cents: i64, entered_cents: i64 },

    /// A split payment entry would push the running sum past the total.
    #[error("payment exceeds remaining balance of {remaining_cents}")]
    AmountExceedsBalance { remaining_cents: i64 },

    /// A payment entry amount is zero or negative.
    #[error("payment amount must be positive")]
    InvalidPaymentAmount,

    /// Cart line index out of range.
    #[error("no cart line at index {index}")]
    LineNotFound { index: usize },

    /// Cart has reached its maximum number of lines.
    #[error("cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds the maximum allowed.
    #[error("quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when operator input doesn't meet requirements and are
/// rejected before any persistence attempt - never silently coerced.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (malformed numeric input, bad barcode, etc.).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate barcode).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
