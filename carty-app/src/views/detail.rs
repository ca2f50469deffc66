use carty_catalog::{Coupon, CouponSlot, PlanTier, PriceQuote};
use carty_order::CheckoutDraft;
use carty_shared::models::{Car, TempBookingId};
use tracing::{info, warn};

use crate::error::{AppError, LOGIN_REQUIRED};
use crate::navigation::Page;
use crate::state::AppState;

pub const PLAN_REQUIRED: &str = "Please select a plan before proceeding.";
pub const LOAD_FAILED: &str = "Failed to fetch car details";

/// Car detail page: plan and coupon selection with a live price.
pub struct DetailView {
    state: AppState,
    car: Car,
    temp_id: Option<TempBookingId>,
    pickup_datetime: Option<String>,
    drop_datetime: Option<String>,
    plan: Option<PlanTier>,
    coupons: CouponSlot,
    available: Vec<Coupon>,
}

impl DetailView {
    pub async fn open(
        state: AppState,
        car_id: i64,
        temp_id: Option<TempBookingId>,
        pickup_datetime: Option<String>,
        drop_datetime: Option<String>,
    ) -> Result<Self, AppError> {
        let credentials = state
            .session
            .credentials()
            .await
            .map_err(|e| AppError::login_required(e, LOGIN_REQUIRED))?;
        let car = state.backend.get_car(&credentials, car_id).await.map_err(|e| {
            warn!(error = %e, car_id, "car detail fetch failed");
            AppError::Inline(LOAD_FAILED.to_string())
        })?;
        let offers = state.backend.list_offers().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed fetching offers");
            Vec::new()
        });

        Ok(Self {
            state,
            car,
            temp_id,
            pickup_datetime,
            drop_datetime,
            plan: None,
            coupons: CouponSlot::default(),
            available: Coupon::catalog(&offers),
        })
    }

    pub fn car(&self) -> &Car {
        &self.car
    }

    pub fn plan(&self) -> Option<PlanTier> {
        self.plan
    }

    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupons.current()
    }

    pub fn available_coupons(&self) -> &[Coupon] {
        &self.available
    }

    pub fn select_plan(&mut self, tier: PlanTier) {
        self.plan = Some(tier);
    }

    /// Applies a code from the offered coupons, replacing any applied one.
    pub fn apply_coupon(&mut self, code: &str) -> Result<&Coupon, AppError> {
        let coupon = Coupon::find(&self.available, code)
            .map_err(|e| AppError::Inline(e.to_string()))?
            .clone();
        self.coupons.apply(coupon);
        self.coupons
            .current()
            .ok_or_else(|| AppError::Inline("Invalid coupon code".to_string()))
    }

    pub fn remove_coupon(&mut self) {
        self.coupons.remove();
    }

    /// Recomputed from the current plan and coupon on every call.
    pub fn quote(&self) -> PriceQuote {
        PriceQuote::for_selection(self.car.base_fare, self.plan, &self.coupons)
    }

    /// Hands the selection to the confirmation page.
    pub async fn book_now(&self) -> Result<CheckoutDraft, AppError> {
        let Some(plan) = self.plan else {
            self.state.navigator.alert(PLAN_REQUIRED).await;
            return Err(AppError::Alert(PLAN_REQUIRED.to_string()));
        };
        let draft = CheckoutDraft::new(
            self.temp_id.clone(),
            self.car.clone(),
            plan,
            &self.coupons,
            self.pickup_datetime.clone(),
            self.drop_datetime.clone(),
        );
        info!(car_id = self.car.id, plan = %plan, total = %draft.total, "proceeding to payment");
        self.state
            .navigator
            .push(Page::Confirmation(Box::new(draft.clone())))
            .await;
        Ok(draft)
    }
}
