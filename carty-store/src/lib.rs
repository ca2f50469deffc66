pub mod app_config;
pub mod api_client;
pub mod session_store;
pub mod token;
pub mod memory_backend;

pub use api_client::ApiClient;
pub use app_config::Config;
pub use memory_backend::InMemoryBackend;
pub use session_store::{FileSessionStore, MemorySessionStore, SessionStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Session storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Stored session is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Token is not a readable JWT: {0}")]
    Token(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
