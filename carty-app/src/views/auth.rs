use carty_core::CoreError;
use carty_shared::models::{AuthScheme, RegisterRequest, User};
use carty_shared::Masked;
use carty_store::token::read_claims;
use tracing::{info, warn};

use crate::error::AppError;
use crate::navigation::Page;
use crate::state::AppState;

fn login_failure(err: CoreError) -> AppError {
    match err {
        CoreError::Backend { detail, .. } => AppError::Inline(detail),
        CoreError::InvalidResponse(_) => AppError::Inline("Invalid server response format.".to_string()),
        CoreError::TransportError(_) => AppError::Inline(
            "Network error, please check your connection or backend server.".to_string(),
        ),
        other => {
            warn!(error = %other, "login failed");
            AppError::Inline("An unexpected error occurred. Please try again.".to_string())
        }
    }
}

/// Signs in with the configured scheme and stores the session.
pub async fn login(state: &AppState, username: &str, password: &str) -> Result<User, AppError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AppError::Inline(
            "Username and password are required.".to_string(),
        ));
    }
    let username = username.trim();

    let user = match state.settings.auth_scheme {
        AuthScheme::Jwt => {
            let pair = state
                .backend
                .obtain_token(username, password)
                .await
                .map_err(login_failure)?;
            let access = pair.access.filter(|a| !a.is_blank()).ok_or_else(|| {
                AppError::Inline("Login failed: no access token received.".to_string())
            })?;
            let claims = read_claims(access.expose()).unwrap_or_else(|e| {
                warn!(error = %e, "access token claims unreadable");
                Default::default()
            });
            User {
                id: claims.user_id,
                username: claims.username.unwrap_or_else(|| username.to_string()),
                token: access,
                scheme: AuthScheme::Jwt,
                expires_at: claims.exp,
            }
        }
        AuthScheme::Token => {
            let response = state
                .backend
                .login(username, password)
                .await
                .map_err(login_failure)?;
            let token = response.token.filter(|t| !t.is_blank()).ok_or_else(|| {
                AppError::Inline("Login failed: no token received.".to_string())
            })?;
            User {
                id: None,
                username: response.username.unwrap_or_else(|| username.to_string()),
                token,
                scheme: AuthScheme::Token,
                expires_at: None,
            }
        }
    };

    state.session.set_user(Some(user.clone())).await?;
    info!(username = %user.username, "signed in");
    state.navigator.alert("Login success").await;
    state.navigator.push(Page::Home).await;
    Ok(user)
}

pub async fn logout(state: &AppState) -> Result<(), AppError> {
    state.session.set_user(None).await?;
    info!("signed out");
    Ok(())
}

/// Returns the server's message on success, `Error: <body>` otherwise.
pub async fn register(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<String, AppError> {
    let request = RegisterRequest {
        username: username.trim().to_string(),
        email: email.trim().to_string(),
        password: Masked::new(password.to_string()),
    };
    match state.backend.register(&request).await {
        Ok(response) => Ok(response.message.unwrap_or_default()),
        Err(CoreError::Backend { detail, .. }) => Err(AppError::Inline(format!("Error: {}", detail))),
        Err(e) => Err(AppError::Inline(format!("Error: {}", e))),
    }
}
