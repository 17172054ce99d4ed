//! Checkout arithmetic: discounts, GST split, and the grand total.

use serde::Serialize;

use crate::error::{AppError, Result};

/// Fixed GST rate in percent, applied to the post-discount amount.
pub const GST_RATE: f64 = 18.0;

/// Monetary breakdown persisted on the order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Post-discount, pre-tax amount.
    pub amount: f64,
    pub gst_tax: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub delivery_charge: f64,
    pub total_amount: f64,
}

/// Applies coupon and loyalty discounts, then GST, then delivery.
///
/// The loyalty discount (1 point = 1 rupee) may not exceed what remains
/// after the coupon; that is a hard failure, never a clamp. Intra-state
/// deliveries split the tax into CGST+SGST halves, inter-state ones carry
/// IGST alone.
pub fn compute_totals(
    subtotal: f64,
    coupon_discount: f64,
    brownie_discount: f64,
    same_state: bool,
    delivery_charge: f64,
) -> Result<Totals> {
    let after_coupon = subtotal - coupon_discount;
    if brownie_discount > after_coupon {
        return Err(AppError::Validation(format!(
            "Brownie points discount ({brownie_discount}) cannot exceed amount after coupon ({after_coupon})"
        )));
    }
    let amount = after_coupon - brownie_discount;
    let gst_tax = amount * GST_RATE / 100.0;
    let (cgst, sgst, igst) = if same_state { (gst_tax / 2.0, gst_tax / 2.0, 0.0) } else { (0.0, 0.0, gst_tax) };
    let total_amount = amount + gst_tax + delivery_charge;
    Ok(Totals { amount, gst_tax, cgst, sgst, igst, delivery_charge, total_amount })
}

/// Delivery state equals the seller's registered state, ignoring case.
pub fn is_same_state(delivery_state: &str, seller_state: &str) -> bool {
    delivery_state.trim().eq_ignore_ascii_case(seller_state.trim())
}

/// Amount in minor currency units (paise) for the payment gateway.
pub fn to_minor_units(amount: f64) -> u64 {
    (amount * 100.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn worked_example_same_state() {
        // Cart 1000, SAVE10 at 10% = 100 off, 50 points, 18% GST, delivery 40.
        let t = compute_totals(1000.0, 100.0, 50.0, true, 40.0).unwrap();
        assert!((t.amount - 850.0).abs() < EPS);
        assert!((t.gst_tax - 153.0).abs() < EPS);
        assert!((t.cgst - 76.5).abs() < EPS);
        assert!((t.sgst - 76.5).abs() < EPS);
        assert_eq!(t.igst, 0.0);
        assert!((t.total_amount - 1043.0).abs() < EPS);
    }

    #[test]
    fn inter_state_uses_igst_only() {
        let t = compute_totals(1000.0, 100.0, 50.0, false, 40.0).unwrap();
        assert_eq!(t.cgst, 0.0);
        assert_eq!(t.sgst, 0.0);
        assert!((t.igst - 153.0).abs() < EPS);
        assert!((t.total_amount - 1043.0).abs() < EPS);
    }

    #[test]
    fn total_identity_holds() {
        let t = compute_totals(937.37, 93.737, 12.0, true, 55.5).unwrap();
        assert!((t.amount + t.gst_tax + t.delivery_charge - t.total_amount).abs() < EPS);
    }

    #[test]
    fn brownie_discount_beyond_cap_is_a_hard_failure() {
        let err = compute_totals(1000.0, 100.0, 900.01, true, 0.0).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        // Exactly at the cap is allowed and zeroes the taxable amount.
        let t = compute_totals(1000.0, 100.0, 900.0, true, 0.0).unwrap();
        assert_eq!(t.amount, 0.0);
        assert_eq!(t.total_amount, 0.0);
    }

    #[test]
    fn state_comparison_ignores_case() {
        assert!(is_same_state(" kerala ", "Kerala"));
        assert!(!is_same_state("Karnataka", "Kerala"));
    }

    #[test]
    fn minor_units_round() {
        assert_eq!(to_minor_units(1043.0), 104300);
        assert_eq!(to_minor_units(850.5), 85050);
    }
}
