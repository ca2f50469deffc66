use carty_shared::models::AuthScheme;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub session: SessionConfig,
    pub ui: UiConfig,
    pub checkout: CheckoutConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub scheme: AuthScheme,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub search_debounce_ms: u64,
    pub location_debounce_ms: u64,
    pub location_min_chars: usize,
}

impl UiConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn location_debounce(&self) -> Duration {
        Duration::from_millis(self.location_debounce_ms)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 500,
            location_debounce_ms: 300,
            location_min_chars: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    pub price_lock_seconds: u64,
}

impl CheckoutConfig {
    pub fn price_lock(&self) -> Duration {
        Duration::from_secs(self.price_lock_seconds)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("config"))
    }

    /// Layers built-in defaults, `<dir>/default`, `<dir>/<RUN_MODE>`,
    /// `<dir>/local`, then `CARTY__*` environment variables.
    pub fn load_from(dir: &Path) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let file = |name: &str| dir.join(name).to_string_lossy().into_owned();

        let s = config::Config::builder()
            .set_default("api.base_url", "http://localhost:8000")?
            .set_default("api.timeout_seconds", 30_i64)?
            .set_default("auth.scheme", "jwt")?
            .set_default("session.path", ".carty/session.json")?
            .set_default("ui.search_debounce_ms", 500_i64)?
            .set_default("ui.location_debounce_ms", 300_i64)?
            .set_default("ui.location_min_chars", 3_i64)?
            .set_default("checkout.price_lock_seconds", 600_i64)?
            .add_source(config::File::with_name(&file("default")).required(false))
            .add_source(config::File::with_name(&file(&run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name(&file("local")).required(false))
            // e.g. `CARTY__API__BASE_URL=http://api.example.com`
            .add_source(config::Environment::with_prefix("CARTY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
