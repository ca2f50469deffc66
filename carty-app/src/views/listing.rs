use carty_catalog::CarFilter;
use carty_core::search::TripPayload;
use carty_core::RentalBackend;
use carty_shared::models::{Car, TempBookingId};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::debounce::Debouncer;
use crate::error::AppError;
use crate::navigation::Page;
use crate::state::AppState;

pub const FETCH_FAILED: &str = "Failed to fetch cars. Please try again.";

#[derive(Debug, Clone, Default)]
pub struct ListingModel {
    pub filter: CarFilter,
    pub cars: Vec<Car>,
    pub loading: bool,
    pub error: Option<String>,
}

/// The filtered car list. Every filter change triggers a debounced fetch;
/// only the latest fetch may publish its result.
pub struct ListingView {
    state: AppState,
    temp_id: Option<TempBookingId>,
    model: Arc<RwLock<ListingModel>>,
    debouncer: Debouncer,
}

impl ListingView {
    /// Seeds filters from the handed trip, then from the stored temp booking.
    pub async fn open(
        state: AppState,
        temp_id: Option<TempBookingId>,
        trip: Option<TripPayload>,
    ) -> Self {
        let mut filter = trip.as_ref().map(CarFilter::from_trip).unwrap_or_default();
        if let Some(id) = &temp_id {
            match state.session.credentials().await {
                Ok(credentials) => match state.backend.get_temp_booking(&credentials, id).await {
                    Ok(temp) => filter.apply_temp_booking(&temp),
                    Err(e) => warn!(error = %e, temp_id = %id, "Failed to fetch temp booking"),
                },
                Err(e) => debug!(reason = %e, "temp booking not fetched"),
            }
        }

        let debouncer = Debouncer::new(state.settings.search_debounce);
        let view = Self {
            state,
            temp_id,
            model: Arc::new(RwLock::new(ListingModel {
                filter,
                ..ListingModel::default()
            })),
            debouncer,
        };
        view.refresh().await;
        view
    }

    pub fn temp_id(&self) -> Option<&TempBookingId> {
        self.temp_id.as_ref()
    }

    pub async fn snapshot(&self) -> ListingModel {
        self.model.read().await.clone()
    }

    pub async fn filter(&self) -> CarFilter {
        self.model.read().await.filter.clone()
    }

    pub async fn cars(&self) -> Vec<Car> {
        self.model.read().await.cars.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.model.read().await.error.clone()
    }

    /// Updates one filter by name and schedules a fetch.
    pub async fn update(&self, field: &str, value: &str) -> Result<(), AppError> {
        {
            let mut model = self.model.write().await;
            model
                .filter
                .set(field, value)
                .map_err(|e| AppError::Inline(e.to_string()))?;
            model.error = None;
        }
        self.refresh().await;
        Ok(())
    }

    /// Schedules a fetch for the current filters, superseding any pending one.
    pub async fn refresh(&self) {
        let query = {
            let mut model = self.model.write().await;
            match model.filter.to_query() {
                Some(query) => {
                    model.loading = true;
                    query
                }
                None => {
                    model.cars.clear();
                    model.loading = false;
                    drop(model);
                    self.debouncer.cancel().await;
                    return;
                }
            }
        };

        let backend: Arc<dyn RentalBackend> = self.state.backend.clone();
        let model = self.model.clone();
        let generation = self.debouncer.generation();
        self.debouncer
            .schedule(move |ticket| async move {
                debug!(params = query.len(), "fetching available cars");
                let result = backend.available_cars(&query).await;
                let mut model = model.write().await;
                if !generation.is_current(ticket) {
                    debug!("discarding superseded car list");
                    return;
                }
                model.loading = false;
                match result {
                    Ok(cars) => {
                        model.cars = cars;
                        model.error = None;
                    }
                    Err(e) => {
                        warn!(error = %e, "car list fetch failed");
                        model.cars.clear();
                        model.error = Some(FETCH_FAILED.to_string());
                    }
                }
            })
            .await;
    }

    /// Waits for the pending fetch to land.
    pub async fn settle(&self) {
        self.debouncer.settle().await;
    }

    /// Opens the detail page for a listed car.
    pub async fn select(&self, car_id: i64) -> Result<(), AppError> {
        let model = self.model.read().await;
        if !model.cars.iter().any(|c| c.id == car_id) {
            return Err(AppError::Inline(format!("Car {} is not in the list", car_id)));
        }
        let join = |date: &str, time: &str| {
            (!date.trim().is_empty() && !time.trim().is_empty())
                .then(|| format!("{}T{}", date.trim(), time.trim()))
        };
        let page = Page::CarDetail {
            car_id,
            temp_id: self.temp_id.clone(),
            pickup_datetime: join(&model.filter.start_date, &model.filter.start_time),
            drop_datetime: join(&model.filter.return_date, &model.filter.return_time),
        };
        drop(model);
        self.state.navigator.push(page).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Settings;
    use carty_core::search::TripType;
    use carty_store::memory_backend::{self, InMemoryBackend};
    use carty_store::MemorySessionStore;
    use std::time::Duration;

    async fn setup() -> (Arc<InMemoryBackend>, AppState) {
        let backend = Arc::new(InMemoryBackend::new());
        let state = AppState::new(
            backend.clone(),
            Arc::new(MemorySessionStore::new()),
            Settings::default(),
        )
        .await;
        (backend, state)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_changes_send_one_request() {
        let (backend, state) = setup().await;
        let view = ListingView::open(state, None, None).await;
        view.update("seats_min", "5").await.unwrap();
        view.update("car_type", "SUV").await.unwrap();
        view.update("seats_min", "7").await.unwrap();
        view.settle().await;

        let requests = backend.requests_to(memory_backend::AVAILABLE_CARS).await;
        assert_eq!(requests.len(), 1);
        let names: Vec<String> = view.cars().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Innova Crysta".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_superseded_response_is_discarded() {
        let (backend, state) = setup().await;
        let view = ListingView::open(state, None, None).await;
        view.settle().await;
        assert_eq!(view.cars().await.len(), 3);

        backend
            .delay_next(memory_backend::AVAILABLE_CARS, Duration::from_secs(5))
            .await;
        view.update("car_type", "Sedan").await.unwrap();
        // let the slow request go out
        tokio::time::sleep(Duration::from_millis(600)).await;
        view.update("car_type", "SUV").await.unwrap();
        view.settle().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        let names: Vec<String> = view.cars().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Innova Crysta".to_string()]);
        assert_eq!(backend.requests_to(memory_backend::AVAILABLE_CARS).await.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_message_and_empty_trip_type() {
        let (backend, state) = setup().await;
        backend.fail(memory_backend::AVAILABLE_CARS).await;
        let view = ListingView::open(state, None, None).await;
        view.settle().await;
        assert!(view.cars().await.is_empty());
        assert_eq!(view.error().await.as_deref(), Some(FETCH_FAILED));

        backend.recover(memory_backend::AVAILABLE_CARS).await;
        view.update("trip_type", "").await.unwrap();
        view.settle().await;
        assert!(view.cars().await.is_empty());
        assert!(view.error().await.is_none());
        assert_eq!(backend.requests_to(memory_backend::AVAILABLE_CARS).await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_hands_trip_times_to_detail() {
        let (_backend, state) = setup().await;
        let trip = carty_core::search::SearchForm {
            pickup: "Chennai".to_string(),
            start_date: "2025-08-11".to_string(),
            start_time: "10:00".to_string(),
            package: "1".to_string(),
            ..carty_core::search::SearchForm::new(TripType::Hourly)
        }
        .payload();
        let view = ListingView::open(state.clone(), None, Some(trip)).await;
        view.settle().await;
        assert!(view.select(99).await.is_err());
        view.select(1).await.unwrap();
        assert_eq!(
            state.navigator.current().await,
            Page::CarDetail {
                car_id: 1,
                temp_id: None,
                pickup_datetime: Some("2025-08-11T10:00".to_string()),
                drop_datetime: None,
            }
        );
    }
}
