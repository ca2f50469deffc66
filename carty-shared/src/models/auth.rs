use serde::{Deserialize, Serialize};

use crate::Masked;

/// How the session token is presented in the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// Access token from `/api/token/`, sent as `Bearer <jwt>`.
    #[default]
    Jwt,
    /// Key from `/api/login/`, sent as `Token <key>`.
    Token,
}

impl AuthScheme {
    pub fn header_prefix(self) -> &'static str {
        match self {
            AuthScheme::Jwt => "Bearer",
            AuthScheme::Token => "Token",
        }
    }
}

/// The signed-in customer as kept in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Backend user id; known when the token carries a `user_id` claim.
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    pub token: Masked<String>,
    #[serde(default)]
    pub scheme: AuthScheme,
    /// Unix timestamp after which the token is no longer accepted.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl User {
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(exp) if exp <= now)
    }
}

/// Response of `POST /api/token/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    #[serde(default)]
    pub access: Option<Masked<String>>,
    #[serde(default)]
    pub refresh: Option<Masked<String>>,
}

/// Response of `POST /api/login/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<Masked<String>>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: Masked<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
}
