use carty_core::RentalBackend;
use carty_shared::models::{Location, Package};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::debounce::Debouncer;
use crate::state::AppState;

#[derive(Debug, Default)]
struct LookupModel {
    value: String,
    suggestions: Vec<Location>,
}

/// Search-as-you-type location field.
pub struct LocationLookup {
    backend: Arc<dyn RentalBackend>,
    model: Arc<RwLock<LookupModel>>,
    debouncer: Debouncer,
    min_chars: usize,
}

impl LocationLookup {
    pub fn new(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
            model: Arc::new(RwLock::new(LookupModel::default())),
            debouncer: Debouncer::new(state.settings.location_debounce),
            min_chars: state.settings.location_min_chars,
        }
    }

    /// A keystroke. Short input clears the suggestions without a request.
    pub async fn input(&self, text: &str) {
        let query = text.trim().to_string();
        {
            let mut model = self.model.write().await;
            model.value = text.to_string();
        }
        if query.chars().count() < self.min_chars {
            self.debouncer.cancel().await;
            self.model.write().await.suggestions.clear();
            return;
        }

        let backend = self.backend.clone();
        let model = self.model.clone();
        let generation = self.debouncer.generation();
        self.debouncer
            .schedule(move |ticket| async move {
                debug!(%query, "location lookup");
                let found = backend.search_locations(&query).await.unwrap_or_else(|e| {
                    warn!(error = %e, "location lookup failed");
                    Vec::new()
                });
                let mut model = model.write().await;
                if generation.is_current(ticket) {
                    model.suggestions = found;
                } else {
                    debug!(%query, "discarding superseded location lookup");
                }
            })
            .await;
    }

    /// Picks a suggestion: it becomes the field value and the list closes.
    pub async fn choose(&self, index: usize) -> Option<String> {
        self.debouncer.cancel().await;
        let mut model = self.model.write().await;
        let name = model.suggestions.get(index)?.name.clone();
        model.value = name.clone();
        model.suggestions.clear();
        Some(name)
    }

    pub async fn value(&self) -> String {
        self.model.read().await.value.clone()
    }

    pub async fn suggestions(&self) -> Vec<Location> {
        self.model.read().await.suggestions.clone()
    }

    /// Waits for the pending lookup to land.
    pub async fn settle(&self) {
        self.debouncer.settle().await;
    }
}

/// Packages for the hourly trip selector; failures yield an empty list.
pub async fn load_packages(state: &AppState) -> Vec<Package> {
    state.backend.list_packages().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed fetching packages");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Settings;
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
    async fn test_short_input_sends_nothing() {
        let (backend, state) = setup().await;
        let lookup = LocationLookup::new(&state);
        lookup.input(" Ch ").await;
        lookup.settle().await;
        assert!(lookup.suggestions().await.is_empty());
        assert!(backend.requests_to(memory_backend::LOCATIONS).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_debounces_to_one_request() {
        let (backend, state) = setup().await;
        let lookup = LocationLookup::new(&state);
        for text in ["Che", "Chen", "Chenn"] {
            lookup.input(text).await;
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        lookup.settle().await;

        let requests = backend.requests_to(memory_backend::LOCATIONS).await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query, vec![("search".to_string(), "Chenn".to_string())]);
        assert_eq!(lookup.suggestions().await.len(), 2);

        assert_eq!(lookup.choose(1).await.as_deref(), Some("Chennai Central"));
        assert_eq!(lookup.value().await, "Chennai Central");
        assert!(lookup.suggestions().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_input_drops_suggestions() {
        let (_backend, state) = setup().await;
        let lookup = LocationLookup::new(&state);
        lookup.input("Madu").await;
        lookup.settle().await;
        assert_eq!(lookup.suggestions().await.len(), 1);
        lookup.input("").await;
        assert!(lookup.suggestions().await.is_empty());
    }

    #[tokio::test]
    async fn test_packages_error_is_empty() {
        let (backend, state) = setup().await;
        assert_eq!(load_packages(&state).await.len(), 3);
        backend.fail(memory_backend::PACKAGES).await;
        assert!(load_packages(&state).await.is_empty());
    }
}
