pub mod search;
pub mod repository;
pub mod credentials;
pub mod payment;
pub mod generation;

pub use credentials::Credentials;
pub use generation::{GenerationCounter, Ticket};
pub use repository::{QueryParams, RentalBackend};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not signed in: {0}")]
    Unauthenticated(String),
    #[error("{detail}")]
    Backend { status: u16, detail: String },
    #[error("Network error: {0}")]
    TransportError(String),
    #[error("Invalid server response: {0}")]
    InvalidResponse(String),
}

impl CoreError {
    pub fn backend(status: u16, detail: impl Into<String>) -> Self {
        CoreError::Backend { status, detail: detail.into() }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
