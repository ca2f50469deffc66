use carty_shared::models::Offer;
use serde::{Deserialize, Serialize};

use crate::{CatalogError, CatalogResult};

/// A percentage discount code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub percent: f64,
    pub description: String,
}

impl Coupon {
    pub fn new(code: impl Into<String>, percent: f64, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            percent,
            description: description.into(),
        }
    }

    /// Codes always available on the detail page.
    pub fn defaults() -> Vec<Coupon> {
        vec![
            Coupon::new("SAVE10", 10.0, "Get 10% off on your booking"),
            Coupon::new("FEST20", 20.0, "Festive offer – Save 20%"),
        ]
    }

    /// An active offer with a positive percent doubles as a coupon.
    pub fn from_offer(offer: &Offer) -> Option<Coupon> {
        match offer.percent {
            Some(pct) if offer.is_active && pct > 0.0 => {
                Some(Coupon::new(offer.code.clone(), pct, offer.desc.clone()))
            }
            _ => None,
        }
    }

    /// Built-in codes followed by usable offers, first occurrence of a code wins.
    pub fn catalog(offers: &[Offer]) -> Vec<Coupon> {
        let mut coupons = Coupon::defaults();
        for coupon in offers.iter().filter_map(Coupon::from_offer) {
            if !coupons.iter().any(|c| c.code.eq_ignore_ascii_case(&coupon.code)) {
                coupons.push(coupon);
            }
        }
        coupons
    }

    pub fn find<'a>(coupons: &'a [Coupon], code: &str) -> CatalogResult<&'a Coupon> {
        let code = code.trim();
        coupons
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
            .ok_or_else(|| CatalogError::UnknownCoupon(code.to_string()))
    }
}

/// Holds at most one applied coupon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CouponSlot {
    applied: Option<Coupon>,
}

impl CouponSlot {
    /// Applies `coupon`, returning the one it replaced.
    pub fn apply(&mut self, coupon: Coupon) -> Option<Coupon> {
        self.applied.replace(coupon)
    }

    pub fn remove(&mut self) -> Option<Coupon> {
        self.applied.take()
    }

    pub fn current(&self) -> Option<&Coupon> {
        self.applied.as_ref()
    }

    pub fn percent(&self) -> f64 {
        self.applied.as_ref().map(|c| c.percent).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(code: &str, percent: Option<f64>, active: bool) -> Offer {
        Offer {
            id: None,
            code: code.to_string(),
            desc: format!("{} offer", code),
            discount: None,
            percent,
            is_active: active,
        }
    }

    #[test]
    fn test_second_coupon_replaces_first() {
        let coupons = Coupon::defaults();
        let mut slot = CouponSlot::default();
        assert!(slot.apply(Coupon::find(&coupons, "save10").unwrap().clone()).is_none());

        let replaced = slot.apply(Coupon::find(&coupons, "FEST20").unwrap().clone());
        assert_eq!(replaced.map(|c| c.code), Some("SAVE10".to_string()));
        assert_eq!(slot.percent(), 20.0);

        slot.remove();
        assert!(slot.current().is_none());
        assert_eq!(slot.percent(), 0.0);
    }

    #[test]
    fn test_offers_extend_the_catalog() {
        let offers = vec![
            offer("CASH5", Some(5.0), true),
            offer("FLAT200", None, true),
            offer("OLD15", Some(15.0), false),
            offer("save10", Some(50.0), true),
        ];
        let coupons = Coupon::catalog(&offers);
        let codes: Vec<&str> = coupons.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["SAVE10", "FEST20", "CASH5"]);
        assert_eq!(Coupon::find(&coupons, "save10").unwrap().percent, 10.0);
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(
            Coupon::find(&Coupon::defaults(), " NOPE "),
            Err(CatalogError::UnknownCoupon("NOPE".to_string()))
        );
    }
}
