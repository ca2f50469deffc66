use carty_core::payment::{Bank, CardDetails, PaymentMethod, PaymentSelection, UpiApp};
use carty_order::price_lock::wait_expired;
use carty_order::{CheckoutDraft, CheckoutError, CheckoutOrchestrator, PriceLock, TripSummary};
use carty_shared::models::{BookingConfirmed, TempBooking};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{AppError, LOGIN_REQUIRED};
use crate::navigation::Page;
use crate::state::AppState;

pub const CONFIRMED: &str = "Booking confirmed!";
pub const CONFIRM_FAILED: &str = "Failed to confirm booking";
pub const TIME_EXPIRED: &str = "Time expired! Returning to previous page.";

/// Payment page for a draft handed over by the car detail page.
///
/// Holds the price lock for as long as the view lives; when the countdown
/// reaches zero the user is sent back to the previous page.
pub struct ConfirmationView {
    state: AppState,
    draft: CheckoutDraft,
    trip: TripSummary,
    selection: PaymentSelection,
    lock: PriceLock,
    watcher: JoinHandle<()>,
    checkout: CheckoutOrchestrator,
}

impl ConfirmationView {
    pub async fn open(state: AppState, draft: CheckoutDraft) -> Self {
        let temp = Self::fetch_temp_booking(&state, &draft).await;
        let trip = TripSummary::resolve(temp.as_ref(), &draft);

        let lock = PriceLock::start(state.settings.price_lock);
        let remaining = lock.subscribe();
        let navigator = state.navigator.clone();
        let watcher = tokio::spawn(async move {
            if wait_expired(remaining).await {
                navigator.alert(TIME_EXPIRED).await;
                navigator.back().await;
            }
        });

        Self {
            checkout: CheckoutOrchestrator::new(state.backend.clone()),
            state,
            draft,
            trip,
            selection: PaymentSelection::default(),
            lock,
            watcher,
        }
    }

    async fn fetch_temp_booking(state: &AppState, draft: &CheckoutDraft) -> Option<TempBooking> {
        let temp_id = draft.temp_id.as_ref()?;
        let credentials = state.session.credentials().await.ok()?;
        match state.backend.get_temp_booking(&credentials, temp_id).await {
            Ok(temp) => Some(temp),
            Err(e) => {
                warn!(error = %e, temp_id = %temp_id.as_str(), "Error fetching temp booking");
                None
            }
        }
    }

    pub fn draft(&self) -> &CheckoutDraft {
        &self.draft
    }

    pub fn trip(&self) -> &TripSummary {
        &self.trip
    }

    pub fn selection(&self) -> &PaymentSelection {
        &self.selection
    }

    pub fn clock(&self) -> String {
        self.lock.clock()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.lock.remaining_secs()
    }

    pub fn choose_method(&mut self, method: PaymentMethod) {
        self.selection.choose(method);
    }

    pub fn select_upi_app(&mut self, app: UpiApp) -> Result<(), AppError> {
        self.selection
            .select_upi_app(app)
            .map_err(|e| AppError::Inline(e.to_string()))
    }

    pub fn select_bank(&mut self, bank: Bank) -> Result<(), AppError> {
        self.selection
            .select_bank(bank)
            .map_err(|e| AppError::Inline(e.to_string()))
    }

    pub fn card_mut(&mut self) -> Option<&mut CardDetails> {
        self.selection.card_mut()
    }

    pub fn can_pay(&self) -> bool {
        self.selection.can_pay() && !self.lock.is_expired()
    }

    pub async fn pay(&mut self) -> Result<BookingConfirmed, AppError> {
        let credentials = self
            .state
            .session
            .credentials()
            .await
            .map_err(|e| AppError::login_required(e, LOGIN_REQUIRED))?;

        match self
            .checkout
            .confirm(&credentials, &self.draft, &self.selection, &self.lock)
            .await
        {
            Ok(confirmed) => {
                self.lock.stop();
                self.watcher.abort();
                self.state.navigator.alert(CONFIRMED).await;
                self.state.navigator.push(Page::ThankYou).await;
                Ok(confirmed)
            }
            Err(CheckoutError::Backend(e)) => {
                info!(reason = %e, "payment left on confirmation page");
                self.state.navigator.alert(CONFIRM_FAILED).await;
                Err(AppError::Alert(CONFIRM_FAILED.to_string()))
            }
            Err(e) => Err(AppError::Inline(e.to_string())),
        }
    }
}

impl Drop for ConfirmationView {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Settings;
    use carty_catalog::{CouponSlot, PlanTier};
    use carty_core::search::{SearchForm, TripType};
    use carty_core::RentalBackend;
    use carty_shared::models::{AuthScheme, User};
    use carty_shared::Masked;
    use carty_store::memory_backend::{self, InMemoryBackend};
    use carty_store::MemorySessionStore;
    use std::sync::Arc;
    use std::time::Duration;

    async fn setup(price_lock: Duration) -> (Arc<InMemoryBackend>, AppState) {
        let backend = Arc::new(InMemoryBackend::new());
        let settings = Settings {
            price_lock,
            ..Settings::default()
        };
        let state = AppState::new(backend.clone(), Arc::new(MemorySessionStore::new()), settings).await;
        let token = backend.issue_token(1).await;
        state
            .session
            .set_user(Some(User {
                id: Some(1),
                username: "asha".to_string(),
                token: Masked::new(token),
                scheme: AuthScheme::Token,
                expires_at: None,
            }))
            .await
            .unwrap();
        (backend, state)
    }

    async fn draft(backend: &InMemoryBackend, state: &AppState) -> CheckoutDraft {
        let credentials = state.session.credentials().await.unwrap();
        let mut form = SearchForm::new(TripType::Hourly);
        form.pickup = "Chennai Airport".to_string();
        form.start_date = "2026-11-02".to_string();
        form.start_time = "09:30".to_string();
        form.package = "2".to_string();
        let created = backend
            .create_temp_booking(&credentials, &form.payload())
            .await
            .unwrap();
        let car = backend.get_car(&credentials, 1).await.unwrap();
        CheckoutDraft::new(created.temp_id, car, PlanTier::Plus, &CouponSlot::default(), None, None)
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_returns_once() {
        let (backend, state) = setup(Duration::from_secs(3)).await;
        let draft = draft(&backend, &state).await;
        state.navigator.push(Page::CarList { temp_id: None, trip: None }).await;
        state.navigator.push(Page::Confirmation(Box::new(draft.clone()))).await;

        let view = ConfirmationView::open(state.clone(), draft).await;
        assert_eq!(view.clock(), "00:03");
        assert_eq!(view.trip().pickup_location.as_deref(), Some("Chennai Airport"));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(view.clock(), "00:00");
        assert!(!view.can_pay());
        assert_eq!(
            state.navigator.current().await,
            Page::CarList { temp_id: None, trip: None }
        );
        assert_eq!(state.navigator.alerts().await, vec![TIME_EXPIRED.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_the_page_stops_the_countdown() {
        let (backend, state) = setup(Duration::from_secs(600)).await;
        let draft = draft(&backend, &state).await;
        state.navigator.push(Page::Confirmation(Box::new(draft.clone()))).await;

        drop(ConfirmationView::open(state.clone(), draft).await);
        tokio::time::sleep(Duration::from_secs(700)).await;
        assert!(state.navigator.alerts().await.is_empty());
        assert_eq!(state.navigator.depth().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pay_confirms_and_moves_on() {
        let (backend, state) = setup(Duration::from_secs(600)).await;
        let draft = draft(&backend, &state).await;
        let temp_id = draft.temp_id.clone().unwrap();
        let mut view = ConfirmationView::open(state.clone(), draft).await;

        assert!(matches!(view.pay().await, Err(AppError::Inline(_))));
        view.choose_method(PaymentMethod::NetBanking);
        assert!(view.select_upi_app(UpiApp::Gpay).is_err());
        view.select_bank(Bank::Hdfc).unwrap();
        assert!(view.can_pay());

        let confirmed = view.pay().await.unwrap();
        assert!(confirmed.booking_id.is_some());
        assert_eq!(state.navigator.current().await, Page::ThankYou);
        assert_eq!(state.navigator.alerts().await, vec![CONFIRMED.to_string()]);
        assert!(backend.temp_booking(&temp_id).await.is_none());

        let sent = backend.requests_to(memory_backend::CONFIRM_BOOKING).await;
        assert_eq!(sent.len(), 1);

        // the lock no longer sends anyone back
        tokio::time::sleep(Duration::from_secs(700)).await;
        assert_eq!(state.navigator.current().await, Page::ThankYou);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_confirmation_stays_without_retry() {
        let (backend, state) = setup(Duration::from_secs(600)).await;
        let draft = draft(&backend, &state).await;
        state.navigator.push(Page::Confirmation(Box::new(draft.clone()))).await;
        let mut view = ConfirmationView::open(state.clone(), draft).await;
        view.choose_method(PaymentMethod::Card);
        view.card_mut().unwrap().number = Masked::from("4111 1111 1111 1111");

        backend.fail(memory_backend::CONFIRM_BOOKING).await;
        let err = view.pay().await.unwrap_err();
        assert_eq!(err.message(), CONFIRM_FAILED);
        assert!(matches!(state.navigator.current().await, Page::Confirmation(_)));
        assert_eq!(backend.requests_to(memory_backend::CONFIRM_BOOKING).await.len(), 1);
    }
}
