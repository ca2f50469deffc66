pub mod state;
pub mod session;
pub mod navigation;
pub mod error;
pub mod debounce;
pub mod views;

pub use error::AppError;
pub use navigation::{Navigator, Page};
pub use session::SessionContext;
pub use state::{AppState, Settings};
