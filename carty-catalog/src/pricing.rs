use carty_shared::Money;
use serde::Serialize;

use crate::coupon::{Coupon, CouponSlot};
use crate::plan::PlanTier;

/// Price breakdown shown on the car detail page.
///
/// `total = base + plan_fee - discount`, where the discount is the applied
/// coupon's percent of `base + plan_fee`. The total is not clamped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub base: Money,
    pub plan_fee: Money,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
}

impl PriceQuote {
    pub fn compute(base: Money, plan: Option<PlanTier>, coupon: Option<&Coupon>) -> Self {
        let plan_fee = plan.map(|tier| tier.plan().fee).unwrap_or(Money::ZERO);
        let subtotal = base + plan_fee;
        let discount = coupon
            .map(|c| subtotal.percent(c.percent))
            .unwrap_or(Money::ZERO);
        Self {
            base,
            plan_fee,
            subtotal,
            discount,
            total: subtotal - discount,
            plan,
            coupon: coupon.map(|c| c.code.clone()),
        }
    }

    pub fn for_selection(base: Money, plan: Option<PlanTier>, slot: &CouponSlot) -> Self {
        Self::compute(base, plan, slot.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_with_save10() {
        let coupons = Coupon::defaults();
        let save10 = Coupon::find(&coupons, "SAVE10").unwrap();
        let quote = PriceQuote::compute(Money::from_rupees(1000), Some(PlanTier::Plus), Some(save10));
        assert_eq!(quote.subtotal, Money::from_rupees(1550));
        assert_eq!(quote.discount, Money::from_rupees(155));
        assert_eq!(quote.total, Money::from_rupees(1395));
        assert_eq!(quote.total.to_string(), "₹1395.00");
    }

    #[test]
    fn test_no_plan_no_coupon() {
        let quote = PriceQuote::compute(Money::from_rupees(800), None, None);
        assert_eq!(quote.total, Money::from_rupees(800));
        assert_eq!(quote.discount, Money::ZERO);
    }

    #[test]
    fn test_recomputes_on_selection_change() {
        let coupons = Coupon::defaults();
        let mut slot = CouponSlot::default();
        let base = Money::from_rupees(1459);

        slot.apply(Coupon::find(&coupons, "FEST20").unwrap().clone());
        let max = PriceQuote::for_selection(base, Some(PlanTier::Max), &slot);
        assert_eq!(max.total, Money::from_paise(164720));

        let basic = PriceQuote::for_selection(base, Some(PlanTier::Basic), &slot);
        assert_eq!(basic.subtotal, Money::from_rupees(1918));
        assert_eq!(basic.discount, Money::from_paise(38360));
        assert_eq!(basic.total, Money::from_paise(153440));
    }

    #[test]
    fn test_discount_rounds_to_paise() {
        let quote = PriceQuote::compute(
            Money::from_paise(99_99),
            None,
            Some(&Coupon::new("ODD", 12.5, "odd")),
        );
        // 12.5% of 99.99 = 12.49875
        assert_eq!(quote.discount, Money::from_paise(1250));
        assert_eq!(quote.total, Money::from_paise(8749));
    }
}
