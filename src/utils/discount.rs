//! Discount computation applied at coupon validation and redemption.
//!
//! The rule is deliberately two-stage: the percentage discount over the
//! coupon's nominal amount is itself scaled down to 20%, then capped at 500.
//! Unusual, but it is the established business rule and changing it would
//! change every granted amount.

/// Second-stage scaling: a redemption only ever grants 20% of the
/// percentage-based discount.
const SECOND_STAGE_PERCENT: f64 = 20.0;

/// Absolute cap on the granted amount, in currency units.
const MAX_ALLOWED_DISCOUNT: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountBreakdown {
    pub base_discount: f64,
    pub discount_amount: f64,
    pub amount_after_discount: f64,
}

/// `order_amount` is the coupon's own nominal amount, `discount_percent` a
/// value in [0, 100].
pub fn compute_discount(order_amount: f64, discount_percent: f64) -> DiscountBreakdown {
    let base_discount = order_amount * discount_percent / 100.0;
    let scaled = base_discount * SECOND_STAGE_PERCENT / 100.0;
    let discount_amount = scaled.min(MAX_ALLOWED_DISCOUNT);

    DiscountBreakdown {
        base_discount,
        discount_amount,
        amount_after_discount: order_amount - discount_amount,
    }
}

/// Canonical form of a coupon code: trimmed, uppercased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateFailure {
    Expired,
    Inactive,
}

/// State gate applied before validation and redemption. Expiry is checked
/// before the active flag, so an expired coupon reports expired even when
/// it is also inactive. `expires_at` and `now_millis` are epoch millis;
/// a coupon expires strictly after its expiry instant.
pub fn redemption_gate(
    active: bool,
    expires_at: Option<i64>,
    now_millis: i64,
) -> Result<(), GateFailure> {
    if let Some(expires_at) = expires_at {
        if now_millis > expires_at {
            return Err(GateFailure::Expired);
        }
    }
    if !active {
        return Err(GateFailure::Inactive);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_redemption() {
        // amount=1000, discount=25% -> base 250, granted 50, payable 950
        let b = compute_discount(1000.0, 25.0);
        assert_eq!(b.base_discount, 250.0);
        assert_eq!(b.discount_amount, 50.0);
        assert_eq!(b.amount_after_discount, 950.0);
    }

    #[test]
    fn test_cap_applies_to_large_amounts() {
        let b = compute_discount(1_000_000.0, 100.0);
        assert_eq!(b.discount_amount, 500.0);
        assert_eq!(b.amount_after_discount, 999_500.0);
    }

    #[test]
    fn test_exactly_at_cap() {
        // base = 2500, scaled = 500: the cap is inclusive
        let b = compute_discount(10_000.0, 25.0);
        assert_eq!(b.discount_amount, 500.0);
    }

    #[test]
    fn test_zero_percent_grants_nothing() {
        let b = compute_discount(1000.0, 0.0);
        assert_eq!(b.base_discount, 0.0);
        assert_eq!(b.discount_amount, 0.0);
        assert_eq!(b.amount_after_discount, 1000.0);
    }

    #[test]
    fn test_gate_passes_active_unexpired() {
        assert_eq!(redemption_gate(true, None, 1_000), Ok(()));
        assert_eq!(redemption_gate(true, Some(2_000), 1_000), Ok(()));
    }

    #[test]
    fn test_gate_reports_inactive() {
        assert_eq!(
            redemption_gate(false, None, 1_000),
            Err(GateFailure::Inactive)
        );
        assert_eq!(
            redemption_gate(false, Some(2_000), 1_000),
            Err(GateFailure::Inactive)
        );
    }

    #[test]
    fn test_expired_wins_over_inactive() {
        // An expired coupon reports expired regardless of its active flag
        assert_eq!(
            redemption_gate(false, Some(500), 1_000),
            Err(GateFailure::Expired)
        );
        assert_eq!(
            redemption_gate(true, Some(500), 1_000),
            Err(GateFailure::Expired)
        );
    }

    #[test]
    fn test_expiry_instant_is_inclusive() {
        // Only strictly past the expiry instant counts as expired
        assert_eq!(redemption_gate(true, Some(1_000), 1_000), Ok(()));
        assert_eq!(
            redemption_gate(true, Some(1_000), 1_001),
            Err(GateFailure::Expired)
        );
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  save25 "), "SAVE25");
        assert_eq!(normalize_code("Save25"), "SAVE25");
        assert_eq!(normalize_code("SAVE25"), "SAVE25");
    }
}
