use carty_core::CoreError;
use std::fmt;

pub const LOGIN_REQUIRED: &str = "Please login to continue.";

/// A failure as the triggering page presents it. Nothing here is fatal.
#[derive(Debug)]
pub enum AppError {
    /// Shown as a blocking alert.
    Alert(String),
    /// Shown inline on the page.
    Inline(String),
    /// The page needs a signed-in user; no request was sent.
    Unauthenticated(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn message(&self) -> String {
        match self {
            AppError::Alert(msg) | AppError::Inline(msg) | AppError::Unauthenticated(msg) => {
                msg.clone()
            }
            AppError::Anyhow(err) => {
                tracing::error!("Unexpected error: {:#}", err);
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }

    /// Maps a session refusal to the page's own sign-in message.
    pub fn login_required(err: CoreError, message: &str) -> Self {
        tracing::debug!(reason = %err, "request not sent");
        AppError::Unauthenticated(message.to_string())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Alert(msg) | AppError::Inline(msg) | AppError::Unauthenticated(msg) => {
                f.write_str(msg)
            }
            AppError::Anyhow(err) => write!(f, "{}", err),
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
