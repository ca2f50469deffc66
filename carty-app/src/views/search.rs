use carty_core::search::{SearchForm, TripType};
use carty_core::CoreError;
use carty_shared::models::TempBookingId;
use tracing::{error, info};

use crate::error::{AppError, LOGIN_REQUIRED};
use crate::navigation::Page;
use crate::state::AppState;

pub const NOT_READY: &str = "Please fill all required fields before searching.";
pub const NO_REFERENCE: &str = "Error: No booking reference returned from server.";
pub const UNREACHABLE: &str = "Failed to connect to server. Please check backend logs.";

/// Landing-page trip search.
pub struct SearchView {
    state: AppState,
    pub form: SearchForm,
}

impl SearchView {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            form: SearchForm::default(),
        }
    }

    /// Switching trip type keeps shared fields such as pickup.
    pub fn select_trip(&mut self, trip_type: TripType) {
        self.form.trip_type = trip_type;
    }

    pub fn is_ready(&self) -> bool {
        self.form.is_ready()
    }

    /// Reserves a temp booking and opens the car list for it. No retry.
    pub async fn submit(&self) -> Result<TempBookingId, AppError> {
        let navigator = &self.state.navigator;
        if !self.form.is_ready() {
            navigator.alert(NOT_READY).await;
            return Err(AppError::Alert(NOT_READY.to_string()));
        }
        let credentials = match self.state.session.credentials().await {
            Ok(credentials) => credentials,
            Err(e) => {
                navigator.alert(LOGIN_REQUIRED).await;
                return Err(AppError::login_required(e, LOGIN_REQUIRED));
            }
        };

        let trip = self.form.payload();
        let created = match self.state.backend.create_temp_booking(&credentials, &trip).await {
            Ok(created) => created,
            Err(e) => {
                let message = match e {
                    CoreError::Backend { detail, .. } if !detail.is_empty() => detail,
                    other => {
                        error!(error = %other, "temp booking request failed");
                        UNREACHABLE.to_string()
                    }
                };
                navigator.alert(message.clone()).await;
                return Err(AppError::Alert(message));
            }
        };
        let Some(temp_id) = created.temp_id else {
            navigator.alert(NO_REFERENCE).await;
            return Err(AppError::Alert(NO_REFERENCE.to_string()));
        };

        info!(%temp_id, trip_type = %trip.trip_type, "temp booking created");
        navigator
            .push(Page::CarList {
                temp_id: Some(temp_id.clone()),
                trip: Some(trip),
            })
            .await;
        Ok(temp_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Settings;
    use carty_shared::models::{AuthScheme, User};
    use carty_shared::Masked;
    use carty_store::memory_backend::{self, InMemoryBackend};
    use carty_store::MemorySessionStore;
    use std::sync::Arc;

    async fn setup(signed_in: bool) -> (Arc<InMemoryBackend>, AppState) {
        let backend = Arc::new(InMemoryBackend::new());
        let state = AppState::new(
            backend.clone(),
            Arc::new(MemorySessionStore::new()),
            Settings::default(),
        )
        .await;
        if signed_in {
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
        }
        (backend, state)
    }

    fn one_way(view: &mut SearchView) {
        view.select_trip(TripType::OneWay);
        view.form.pickup = "Chennai".to_string();
        view.form.drop = "Pondicherry".to_string();
    }

    #[tokio::test]
    async fn test_not_ready_alerts_without_request() {
        let (backend, state) = setup(true).await;
        let view = SearchView::new(state.clone());
        assert_eq!(view.submit().await.unwrap_err().message(), NOT_READY);
        assert_eq!(state.navigator.alerts().await, vec![NOT_READY.to_string()]);
        assert!(backend.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_signed_out_is_rejected_before_dispatch() {
        let (backend, state) = setup(false).await;
        let mut view = SearchView::new(state);
        one_way(&mut view);
        assert!(matches!(view.submit().await, Err(AppError::Unauthenticated(_))));
        assert!(backend.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_submit_hands_temp_id_to_car_list() {
        let (backend, state) = setup(true).await;
        let mut view = SearchView::new(state.clone());
        one_way(&mut view);
        let temp_id = view.submit().await.unwrap();

        let stored = backend.temp_booking(&temp_id).await.unwrap();
        assert_eq!(stored.trip_type.as_deref(), Some("One Way"));
        match state.navigator.current().await {
            Page::CarList { temp_id: Some(id), trip: Some(trip) } => {
                assert_eq!(id, temp_id);
                assert_eq!(trip.drop_location.as_deref(), Some("Pondicherry"));
            }
            other => panic!("unexpected page {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_reference_and_backend_errors() {
        let (backend, state) = setup(true).await;
        let mut view = SearchView::new(state.clone());
        one_way(&mut view);

        backend.omit_temp_id(true).await;
        assert_eq!(view.submit().await.unwrap_err().message(), NO_REFERENCE);

        backend.omit_temp_id(false).await;
        backend.fail(memory_backend::CREATE_TEMP_BOOKING).await;
        assert_eq!(view.submit().await.unwrap_err().message(), "Internal server error");
        assert_eq!(state.navigator.current().await, Page::Home);
        assert_eq!(
            backend.requests_to(memory_backend::CREATE_TEMP_BOOKING).await.len(),
            2
        );
    }
}
