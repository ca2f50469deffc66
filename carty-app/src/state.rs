use carty_core::RentalBackend;
use carty_shared::models::AuthScheme;
use carty_store::{ApiClient, Config, FileSessionStore, SessionStore};
use std::sync::Arc;
use std::time::Duration;

use crate::navigation::Navigator;
use crate::session::SessionContext;

/// Front-end tunables taken from [`Config`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub auth_scheme: AuthScheme,
    pub search_debounce: Duration,
    pub location_debounce: Duration,
    pub location_min_chars: usize,
    pub price_lock: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auth_scheme: AuthScheme::Jwt,
            search_debounce: Duration::from_millis(500),
            location_debounce: Duration::from_millis(300),
            location_min_chars: 3,
            price_lock: Duration::from_secs(600),
        }
    }
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            auth_scheme: config.auth.scheme,
            search_debounce: config.ui.search_debounce(),
            location_debounce: config.ui.location_debounce(),
            location_min_chars: config.ui.location_min_chars,
            price_lock: config.checkout.price_lock(),
        }
    }
}

/// Everything a view needs, passed explicitly.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn RentalBackend>,
    pub session: Arc<SessionContext>,
    pub navigator: Arc<Navigator>,
    pub settings: Settings,
}

impl AppState {
    pub async fn new(
        backend: Arc<dyn RentalBackend>,
        store: Arc<dyn SessionStore>,
        settings: Settings,
    ) -> Self {
        Self {
            backend,
            session: Arc::new(SessionContext::restore(store).await),
            navigator: Arc::new(Navigator::new()),
            settings,
        }
    }

    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let backend = ApiClient::new(&config.api)?;
        tracing::info!("Using backend at {}", backend.base_url());
        let store = FileSessionStore::new(&config.session.path);
        Ok(Self::new(Arc::new(backend), Arc::new(store), Settings::from(config)).await)
    }
}
