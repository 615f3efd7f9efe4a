//! # Tender
//!
//! Payment capture and settlement construction.
//!
//! ## Flow
//! ```text
//! ┌──────────┐    settle_single / settle_split    ┌──────────────┐
//! │   Cart   │ ─────────────────────────────────> │  Settlement  │
//! └──────────┘        (+ TaxConfig)               └──────────────┘
//!                                                        │
//!                                                        ▼
//!                                            SaleRepository::settle
//! ```
//!
//! A [`Settlement`] is a fully validated, frozen description of a sale:
//! totals, line snapshots, and the payment rows that cover the total
//! exactly. The database layer persists it verbatim inside one transaction.
//!
//! ## Invariants
//! - Payment rows always sum to the sale total exactly. A cash overpayment
//!   is recorded at the total; the difference is returned as change.
//! - A split tender can never hold more than the total; settlement requires
//!   the remaining balance to be exactly zero.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, TaxConfig};

// =============================================================================
// Tender Entry
// =============================================================================

/// One captured payment: method, amount, and an optional reference
/// (M-Pesa code, card auth) for non-cash methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderEntry {
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub reference: Option<String>,
}

// =============================================================================
// Split Tender
// =============================================================================

/// Accumulates payments against a fixed total for split-payment checkout.
///
/// The running sum may never exceed the total, so `remaining_cents` is
/// always non-negative and `is_balanced` means exact coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitTender {
    total_cents: i64,
    entries: Vec<TenderEntry>,
}

impl SplitTender {
    /// Starts a split tender against a sale total.
    pub fn new(total: Money) -> Self {
        SplitTender {
            total_cents: total.cents(),
            entries: Vec::new(),
        }
    }

    /// Adds a payment towards the total.
    ///
    /// ## Errors
    /// - [`CoreError::InvalidPaymentAmount`] when the amount is not positive
    /// - [`CoreError::AmountExceedsBalance`] when the amount would push the
    ///   running sum past the total
    pub fn add_entry(
        &mut self,
        method: PaymentMethod,
        amount: Money,
        reference: Option<String>,
    ) -> CoreResult<()> {
        if !amount.is_positive() {
            return Err(CoreError::InvalidPaymentAmount);
        }
        let remaining = self.remaining_cents();
        if amount.cents() > remaining {
            return Err(CoreError::AmountExceedsBalance {
                remaining_cents: remaining,
            });
        }
        self.entries.push(TenderEntry {
            method,
            amount_cents: amount.cents(),
            reference,
        });
        Ok(())
    }

    /// Removes the entry at `index`, releasing its amount back to the
    /// remaining balance.
    pub fn remove_entry(&mut self, index: usize) -> CoreResult<TenderEntry> {
        if index >= self.entries.len() {
            return Err(CoreError::LineNotFound { index });
        }
        Ok(self.entries.remove(index))
    }

    /// Sum of captured payments in cents.
    pub fn paid_cents(&self) -> i64 {
        self.entries.iter().map(|e| e.amount_cents).sum()
    }

    /// Balance still owed in cents. Never negative.
    pub fn remaining_cents(&self) -> i64 {
        self.total_cents - self.paid_cents()
    }

    /// True when the payments cover the total exactly.
    pub fn is_balanced(&self) -> bool {
        self.remaining_cents() == 0
    }

    /// The fixed sale total this tender is collecting.
    #[inline]
    pub fn total_cents(&self) -> i64 {
        self.total_cents
    }

    /// Read-only view of captured entries.
    pub fn entries(&self) -> &[TenderEntry] {
        &self.entries
    }
}

// =============================================================================
// Settlement
// =============================================================================

/// A sale line frozen at settlement time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementLine {
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub name: String,
    pub quantity: i64,
    /// Tax-exclusive unit price, whichever tax mode priced the cart.
    pub unit_price_cents: i64,
    /// quantity × unit_price_cents.
    pub subtotal_cents: i64,
}

/// A validated, ready-to-persist sale: totals, change due, line snapshots,
/// and payment rows that sum to the total exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    /// Cash to hand back; zero for non-cash and exact tenders.
    pub change_cents: i64,
    pub lines: Vec<SettlementLine>,
    pub payments: Vec<TenderEntry>,
}

/// Settles a cart against a single payment method.
///
/// For cash, `cash_received` is the amount physically handed over; it must
/// cover the total and the overage becomes change. The recorded payment row
/// is always the sale total, never the tendered amount. Non-cash methods
/// are captured at the total with an optional reference.
///
/// ## Errors
/// - [`CoreError::EmptyCart`]
/// - [`CoreError::InsufficientPayment`] when cash received is below total
pub fn settle_single(
    cart: &Cart,
    tax: &TaxConfig,
    method: PaymentMethod,
    reference: Option<String>,
    cash_received: Option<Money>,
) -> CoreResult<Settlement> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let totals = cart.totals(tax);

    let change_cents = match method {
        PaymentMethod::Cash => {
            let received = cash_received.unwrap_or(Money::from_cents(totals.total_cents));
            if received.cents() < totals.total_cents {
                return Err(CoreError::InsufficientPayment {
                    total_cents: totals.total_cents,
                    received_cents: received.cents(),
                });
            }
            received.cents() - totals.total_cents
        }
        _ => 0,
    };

    let payments = vec![TenderEntry {
        method,
        amount_cents: totals.total_cents,
        reference: match method {
            PaymentMethod::Cash => None,
            _ => reference,
        },
    }];

    Ok(Settlement {
        subtotal_cents: totals.subtotal_cents,
        tax_cents: totals.tax_cents,
        total_cents: totals.total_cents,
        change_cents,
        lines: snapshot_lines(cart, tax),
        payments,
    })
}

/// Settles a cart against an accumulated split tender.
///
/// The tender must be balanced: every cent of the total captured, no more.
/// Each entry becomes its own payment row.
///
/// ## Errors
/// - [`CoreError::EmptyCart`]
/// - [`CoreError::UnbalancedPayment`] when the tender does not cover the
///   total exactly
pub fn settle_split(cart: &Cart, tax: &TaxConfig, tender: SplitTender) -> CoreResult<Settlement> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let totals = cart.totals(tax);

    if tender.total_cents() != totals.total_cents || !tender.is_balanced() {
        return Err(CoreError::UnbalancedPayment {
            total_cents: totals.total_cents,
            entered_cents: tender.paid_cents(),
        });
    }

    Ok(Settlement {
        subtotal_cents: totals.subtotal_cents,
        tax_cents: totals.tax_cents,
        total_cents: totals.total_cents,
        change_cents: 0,
        lines: snapshot_lines(cart, tax),
        payments: tender.entries,
    })
}

/// Freezes cart lines into settlement snapshots, normalising unit prices
/// to tax-exclusive cents.
fn snapshot_lines(cart: &Cart, tax: &TaxConfig) -> Vec<SettlementLine> {
    cart.lines()
        .iter()
        .map(|line| {
            let unit_ex = tax
                .unit_price_ex_tax(Money::from_cents(line.unit_price_cents))
                .cents();
            SettlementLine {
                product_id: line.product_id.clone(),
                variant_id: line.variant_id.clone(),
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price_cents: unit_ex,
                subtotal_cents: unit_ex * line.quantity,
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CatalogEntry, TaxMode, TaxRate};

    fn entry(variant_id: &str, price_cents: i64, stock: i64) -> CatalogEntry {
        CatalogEntry {
            product_id: format!("p-{variant_id}"),
            variant_id: variant_id.to_string(),
            product_name: "Rice".to_string(),
            variant_name: "1kg".to_string(),
            brand_name: None,
            price_cents,
            stock_quantity: stock,
            reorder_level: 5,
        }
    }

    fn cart_totaling_10000() -> (Cart, TaxConfig) {
        // 8621 pre-tax + 16% tax = 10000 exactly.
        let mut cart = Cart::new();
        cart.add_item(&entry("v1", 8621, 10)).unwrap();
        let cfg = TaxConfig::new(TaxRate::from_bps(1600), TaxMode::Exclusive);
        (cart, cfg)
    }

    #[test]
    fn test_cash_exact() {
        let (cart, cfg) = cart_totaling_10000();
        let s = settle_single(
            &cart,
            &cfg,
            PaymentMethod::Cash,
            None,
            Some(Money::from_cents(10000)),
        )
        .unwrap();
        assert_eq!(s.total_cents, 10000);
        assert_eq!(s.change_cents, 0);
        assert_eq!(s.payments.len(), 1);
        assert_eq!(s.payments[0].amount_cents, 10000);
    }

    #[test]
    fn test_cash_with_change() {
        let (cart, cfg) = cart_totaling_10000();
        let s = settle_single(
            &cart,
            &cfg,
            PaymentMethod::Cash,
            None,
            Some(Money::from_cents(15000)),
        )
        .unwrap();
        assert_eq!(s.change_cents, 5000);
        // Recorded at the total, not the tendered amount.
        assert_eq!(s.payments[0].amount_cents, 10000);
    }

    #[test]
    fn test_cash_insufficient() {
        let (cart, cfg) = cart_totaling_10000();
        let err = settle_single(
            &cart,
            &cfg,
            PaymentMethod::Cash,
            None,
            Some(Money::from_cents(9999)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientPayment {
                total_cents: 10000,
                received_cents: 9999,
            }
        ));
    }

    #[test]
    fn test_mpesa_carries_reference() {
        let (cart, cfg) = cart_totaling_10000();
        let s = settle_single(
            &cart,
            &cfg,
            PaymentMethod::Mpesa,
            Some("QGH7XK91TP".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(s.change_cents, 0);
        assert_eq!(s.payments[0].reference.as_deref(), Some("QGH7XK91TP"));
    }

    #[test]
    fn test_empty_cart_rejected() {
        let cfg = TaxConfig::default();
        let err = settle_single(&Cart::new(), &cfg, PaymentMethod::Cash, None, None).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_split_cannot_exceed_total() {
        let mut tender = SplitTender::new(Money::from_cents(10000));
        tender
            .add_entry(PaymentMethod::Cash, Money::from_cents(6000), None)
            .unwrap();
        let err = tender
            .add_entry(PaymentMethod::Card, Money::from_cents(5000), None)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::AmountExceedsBalance {
                remaining_cents: 4000,
            }
        ));
        assert_eq!(tender.paid_cents(), 6000);
    }

    #[test]
    fn test_split_rejects_non_positive_amount() {
        let mut tender = SplitTender::new(Money::from_cents(10000));
        assert!(tender
            .add_entry(PaymentMethod::Cash, Money::zero(), None)
            .is_err());
        assert!(tender
            .add_entry(PaymentMethod::Cash, Money::from_cents(-100), None)
            .is_err());
    }

    #[test]
    fn test_split_remove_entry_releases_balance() {
        let mut tender = SplitTender::new(Money::from_cents(10000));
        tender
            .add_entry(PaymentMethod::Cash, Money::from_cents(6000), None)
            .unwrap();
        tender.remove_entry(0).unwrap();
        assert_eq!(tender.remaining_cents(), 10000);
        tender
            .add_entry(PaymentMethod::Card, Money::from_cents(10000), None)
            .unwrap();
        assert!(tender.is_balanced());
    }

    #[test]
    fn test_split_settlement_exact() {
        let (cart, cfg) = cart_totaling_10000();
        let mut tender = SplitTender::new(Money::from_cents(10000));
        tender
            .add_entry(PaymentMethod::Cash, Money::from_cents(4000), None)
            .unwrap();
        tender
            .add_entry(
                PaymentMethod::Mpesa,
                Money::from_cents(6000),
                Some("QGH7XK91TP".to_string()),
            )
            .unwrap();

        let s = settle_split(&cart, &cfg, tender).unwrap();
        assert_eq!(s.change_cents, 0);
        assert_eq!(s.payments.len(), 2);
        assert_eq!(
            s.payments.iter().map(|p| p.amount_cents).sum::<i64>(),
            s.total_cents
        );
    }

    #[test]
    fn test_split_settlement_short_rejected() {
        let (cart, cfg) = cart_totaling_10000();
        let mut tender = SplitTender::new(Money::from_cents(10000));
        tender
            .add_entry(PaymentMethod::Cash, Money::from_cents(4000), None)
            .unwrap();

        let err = settle_split(&cart, &cfg, tender).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnbalancedPayment {
                total_cents: 10000,
                entered_cents: 4000,
            }
        ));
    }

    #[test]
    fn test_inclusive_mode_strips_tax_from_line_snapshots() {
        let mut cart = Cart::new();
        cart.add_item(&entry("v1", 10000, 10)).unwrap();
        let cfg = TaxConfig::new(TaxRate::from_bps(1600), TaxMode::Inclusive);

        let s = settle_single(
            &cart,
            &cfg,
            PaymentMethod::Cash,
            None,
            Some(Money::from_cents(10000)),
        )
        .unwrap();
        assert_eq!(s.total_cents, 10000);
        assert_eq!(s.lines[0].unit_price_cents, 8621);
        assert_eq!(s.subtotal_cents, 8621);
        assert_eq!(s.tax_cents, 1379);
    }
}
