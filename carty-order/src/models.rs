use carty_catalog::{Coupon, CouponSlot, PlanTier, PriceQuote};
use carty_shared::models::booking::format_timestamp;
use carty_shared::models::{Car, TempBooking, TempBookingId};
use carty_shared::Money;
use serde::Serialize;

/// What the car detail page hands to the confirmation page.
///
/// `total` is for display; the backend prices the booking of record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutDraft {
    pub temp_id: Option<TempBookingId>,
    pub car: Car,
    pub plan: PlanTier,
    pub coupon: Option<Coupon>,
    pub total: Money,
    pub pickup_datetime: Option<String>,
    pub drop_datetime: Option<String>,
}

impl CheckoutDraft {
    pub fn new(
        temp_id: Option<TempBookingId>,
        car: Car,
        plan: PlanTier,
        coupons: &CouponSlot,
        pickup_datetime: Option<String>,
        drop_datetime: Option<String>,
    ) -> Self {
        let quote = PriceQuote::for_selection(car.base_fare, Some(plan), coupons);
        Self {
            temp_id,
            car,
            plan,
            coupon: coupons.current().cloned(),
            total: quote.total,
            pickup_datetime,
            drop_datetime,
        }
    }
}

/// Trip details shown next to the payment panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSummary {
    pub trip_type: Option<String>,
    pub pickup_location: Option<String>,
    pub drop_location: Option<String>,
    pub pickup: Option<String>,
    pub drop: Option<String>,
    pub driver_required: Option<bool>,
}

impl TripSummary {
    /// Prefers the stored temp booking; falls back to what the previous page handed over.
    pub fn resolve(temp: Option<&TempBooking>, draft: &CheckoutDraft) -> Self {
        match temp {
            Some(temp) => Self {
                trip_type: temp.trip_type.clone(),
                pickup_location: Some(temp.pickup_location.clone()).filter(|p| !p.is_empty()),
                drop_location: temp
                    .drop_location
                    .clone()
                    .or_else(|| temp.destination_location.clone()),
                pickup: temp
                    .start_datetime
                    .as_deref()
                    .or(draft.pickup_datetime.as_deref())
                    .map(format_timestamp),
                drop: temp
                    .end_datetime
                    .as_deref()
                    .or(draft.drop_datetime.as_deref())
                    .map(format_timestamp),
                driver_required: Some(temp.driver_required),
            },
            None => Self {
                trip_type: None,
                pickup_location: draft.car.location_name().map(str::to_string),
                drop_location: None,
                pickup: draft.pickup_datetime.as_deref().map(format_timestamp),
                drop: draft.drop_datetime.as_deref().map(format_timestamp),
                driver_required: None,
            },
        }
    }
}
