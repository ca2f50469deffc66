use carty_core::CoreError;
use carty_order::bookings::bookings_for;
use carty_order::{BookCarForm, PaymentForm};
use carty_shared::models::{Booking, Payment};
use tracing::warn;

use crate::error::{AppError, LOGIN_REQUIRED};
use crate::navigation::Page;
use crate::state::AppState;

pub const BOOKINGS_LOGIN: &str = "Please login to view your bookings.";
pub const BOOKINGS_FAILED: &str = "Failed to fetch bookings.";
pub const BOOK_LOGIN: &str = "You must be logged in to book a car.";
pub const BOOKED: &str = "Booking successful!";
pub const BOOK_FAILED: &str = "Booking failed.";
pub const BOOKING_LOAD_FAILED: &str = "Failed to load booking details.";
pub const PAID: &str = "Payment successful!";
pub const PAY_FAILED: &str = "Payment failed.";

/// The signed-in user's bookings.
pub async fn my_bookings(state: &AppState) -> Result<Vec<Booking>, AppError> {
    let credentials = state
        .session
        .credentials()
        .await
        .map_err(|e| AppError::login_required(e, BOOKINGS_LOGIN))?;
    let bookings = state
        .backend
        .list_bookings(&credentials)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch bookings");
            AppError::Inline(BOOKINGS_FAILED.to_string())
        })?;
    Ok(bookings_for(bookings, state.session.user_id().await))
}

/// Submits the direct booking form and moves to "my bookings" on success.
pub async fn book_car(state: &AppState, form: &BookCarForm) -> Result<Booking, AppError> {
    let credentials = state
        .session
        .credentials()
        .await
        .map_err(|e| AppError::login_required(e, BOOK_LOGIN))?;
    let customer_id = state.session.user_id().await;

    match form.submit(state.backend.as_ref(), &credentials, customer_id).await {
        Ok(booking) => {
            state.navigator.alert(BOOKED).await;
            state.navigator.push(Page::MyBookings).await;
            Ok(booking)
        }
        Err(CoreError::ValidationError(msg)) => Err(AppError::Inline(msg)),
        Err(e) => {
            warn!(error = %e, car_id = form.car_id, "Booking failed");
            state.navigator.alert(BOOK_FAILED).await;
            Err(AppError::Alert(BOOK_FAILED.to_string()))
        }
    }
}

/// Payment form for an existing booking, prefilled with its amount.
pub struct PaymentView {
    state: AppState,
    pub form: PaymentForm,
}

impl PaymentView {
    pub async fn open(state: AppState, booking_id: i64) -> Result<Self, AppError> {
        let credentials = state
            .session
            .credentials()
            .await
            .map_err(|e| AppError::login_required(e, LOGIN_REQUIRED))?;
        let booking = state
            .backend
            .get_booking(&credentials, booking_id)
            .await
            .map_err(|e| {
                warn!(error = %e, booking_id, "Failed to load booking");
                AppError::Inline(BOOKING_LOAD_FAILED.to_string())
            })?;
        Ok(Self {
            form: PaymentForm::for_booking(&booking),
            state,
        })
    }

    pub async fn submit(&self) -> Result<Payment, AppError> {
        let credentials = self
            .state
            .session
            .credentials()
            .await
            .map_err(|e| AppError::login_required(e, LOGIN_REQUIRED))?;
        match self.form.submit(self.state.backend.as_ref(), &credentials).await {
            Ok(payment) => {
                self.state.navigator.alert(PAID).await;
                Ok(payment)
            }
            Err(CoreError::ValidationError(msg)) => Err(AppError::Inline(msg)),
            Err(e) => {
                warn!(error = %e, booking_id = self.form.booking_id, "Payment failed");
                self.state.navigator.alert(PAY_FAILED).await;
                Err(AppError::Alert(PAY_FAILED.to_string()))
            }
        }
    }
}
