//! # Cart
//!
//! In-memory cart for the register screen.
//!
//! ## Stock Gating
//! The cart enforces stock at add-time: a catalog line can never be added
//! past the on-hand quantity recorded on its [`CatalogEntry`]. Custom
//! (ad-hoc) lines carry no stock and are never gated. The database applies
//! its own guard at settlement, so a stale cart still cannot oversell.
//!
//! ## Line Identity
//! Catalog lines are keyed by variant id: adding the same variant twice
//! increments the existing line. Custom lines are always appended.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CatalogEntry, TaxBreakdown, TaxConfig};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Null for custom items.
    pub product_id: Option<String>,
    /// Null for custom items.
    pub variant_id: Option<String>,
    /// Display name, e.g. "Rice (1kg)".
    pub name: String,
    /// Unit price as priced in the catalog (tax treatment applied later).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// On-hand stock at add time; None for custom items (ungated).
    pub available_stock: Option<i64>,
}

impl CartLine {
    /// Line total in cents (unit price × quantity).
    #[inline]
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }

    /// True for ad-hoc items with no catalog backing.
    #[inline]
    pub fn is_custom(&self) -> bool {
        self.variant_id.is_none()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The register's working cart. Purely in-memory; nothing touches the
/// database until settlement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of a catalog entry, merging with an existing line for
    /// the same variant.
    ///
    /// ## Errors
    /// - [`CoreError::OutOfStock`] when the entry has no stock at all
    /// - [`CoreError::StockLimitExceeded`] when the merged quantity would
    ///   exceed on-hand stock
    /// - [`CoreError::CartTooLarge`] when a new line would exceed the cap
    pub fn add_item(&mut self, entry: &CatalogEntry) -> CoreResult<()> {
        if entry.stock_quantity <= 0 {
            return Err(CoreError::OutOfStock {
                name: entry.display_name(),
            });
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.variant_id.as_deref() == Some(entry.variant_id.as_str()))
        {
            if line.quantity + 1 > entry.stock_quantity {
                return Err(CoreError::StockLimitExceeded {
                    name: entry.display_name(),
                    available: entry.stock_quantity,
                });
            }
            if line.quantity + 1 > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: line.quantity + 1,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity += 1;
            // Refresh the stock snapshot in case the catalog moved.
            line.available_stock = Some(entry.stock_quantity);
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine {
            product_id: Some(entry.product_id.clone()),
            variant_id: Some(entry.variant_id.clone()),
            name: entry.display_name(),
            unit_price_cents: entry.price_cents,
            quantity: 1,
            available_stock: Some(entry.stock_quantity),
        });
        Ok(())
    }

    /// Adds an ad-hoc line with no catalog backing. No stock gating.
    ///
    /// ## Errors
    /// [`CoreError::Validation`] when the name is empty, the price is not
    /// positive, or the quantity is below 1.
    pub fn add_custom_item(
        &mut self,
        name: &str,
        unit_price_cents: i64,
        quantity: i64,
    ) -> CoreResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation(
                crate::error::ValidationError::Required {
                    field: "name".to_string(),
                },
            ));
        }
        if unit_price_cents <= 0 {
            return Err(CoreError::Validation(
                crate::error::ValidationError::MustBePositive {
                    field: "price".to_string(),
                },
            ));
        }
        if quantity < 1 {
            return Err(CoreError::Validation(
                crate::error::ValidationError::MustBePositive {
                    field: "quantity".to_string(),
                },
            ));
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }
        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine {
            product_id: None,
            variant_id: None,
            name: name.to_string(),
            unit_price_cents,
            quantity,
            available_stock: None,
        });
        Ok(())
    }

    /// Sets the quantity of the line at `index`.
    ///
    /// Catalog lines stay gated by their stock snapshot; the new quantity
    /// must be at least 1 (remove the line instead of zeroing it).
    pub fn update_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<()> {
        if quantity < 1 {
            return Err(CoreError::Validation(
                crate::error::ValidationError::MustBePositive {
                    field: "quantity".to_string(),
                },
            ));
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        let line = self
            .lines
            .get_mut(index)
            .ok_or(CoreError::LineNotFound { index })?;

        if let Some(available) = line.available_stock {
            if quantity > available {
                return Err(CoreError::StockLimitExceeded {
                    name: line.name.clone(),
                    available,
                });
            }
        }

        line.quantity = quantity;
        Ok(())
    }

    /// Removes the line at `index`.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<CartLine> {
        if index >= self.lines.len() {
            return Err(CoreError::LineNotFound { index });
        }
        Ok(self.lines.remove(index))
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of line totals in cents, as priced (pre-tax in exclusive mode,
    /// tax-inclusive in inclusive mode).
    pub fn subtotal_cents(&self) -> i64 {
        self.lines.iter().map(CartLine::line_total_cents).sum()
    }

    /// Computes subtotal, tax and total under the given tax configuration.
    pub fn totals(&self, tax: &TaxConfig) -> TaxBreakdown {
        tax.breakdown(Money::from_cents(self.subtotal_cents()))
    }

    /// True when the cart has no lines.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines (not units).
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Read-only view of the lines.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
