use carty_core::payment::PaymentSelection;
use carty_core::{CoreError, Credentials, RentalBackend};
use carty_shared::models::BookingConfirmed;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::CheckoutDraft;
use crate::price_lock::PriceLock;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Price lock expired")]
    PriceLockExpired,
    #[error("Payment details are incomplete")]
    PaymentIncomplete,
    #[error(transparent)]
    Backend(#[from] CoreError),
}

/// Submits the payment page's confirmation.
pub struct CheckoutOrchestrator {
    backend: Arc<dyn RentalBackend>,
}

impl CheckoutOrchestrator {
    pub fn new(backend: Arc<dyn RentalBackend>) -> Self {
        Self { backend }
    }

    /// Single attempt; a failure is returned to the caller, never retried.
    pub async fn confirm(
        &self,
        credentials: &Credentials,
        draft: &CheckoutDraft,
        selection: &PaymentSelection,
        lock: &PriceLock,
    ) -> Result<BookingConfirmed, CheckoutError> {
        if lock.is_expired() {
            return Err(CheckoutError::PriceLockExpired);
        }
        if !selection.can_pay() {
            return Err(CheckoutError::PaymentIncomplete);
        }
        let request =
            selection.confirm_request(draft.temp_id.clone(), draft.car.id, draft.plan.name())?;

        match self.backend.confirm_booking(credentials, &request).await {
            Ok(confirmed) => {
                info!(
                    temp_id = ?draft.temp_id,
                    car_id = draft.car.id,
                    method = %request.payment_method,
                    booking_id = ?confirmed.booking_id,
                    "booking confirmed"
                );
                Ok(confirmed)
            }
            Err(e) => {
                warn!(error = %e, car_id = draft.car.id, "booking confirmation failed");
                Err(e.into())
            }
        }
    }
}
