use carty_shared::models::Notification;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

pub const NOTIFICATIONS_LOGIN: &str = "Please login to view notifications.";
pub const NOTIFICATIONS_FAILED: &str = "Failed to load notifications.";

pub async fn notifications(state: &AppState) -> Result<Vec<Notification>, AppError> {
    let credentials = state
        .session
        .credentials()
        .await
        .map_err(|e| AppError::login_required(e, NOTIFICATIONS_LOGIN))?;
    state
        .backend
        .list_notifications(&credentials)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to load notifications");
            AppError::Inline(NOTIFICATIONS_FAILED.to_string())
        })
}
