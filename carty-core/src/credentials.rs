use carty_shared::models::{AuthScheme, User};
use carty_shared::Masked;

/// Proof of a signed-in session, required by every protected backend call.
///
/// Only the session hands these out, so a protected request cannot be built
/// while signed out.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    scheme: AuthScheme,
    token: Masked<String>,
}

impl Credentials {
    pub fn new(scheme: AuthScheme, token: impl Into<String>) -> Self {
        Self {
            scheme,
            token: Masked::new(token.into()),
        }
    }

    pub fn for_user(user: &User) -> Self {
        Self {
            scheme: user.scheme,
            token: user.token.clone(),
        }
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    pub fn token(&self) -> &str {
        self.token.expose()
    }

    /// Value of the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("{} {}", self.scheme.header_prefix(), self.token.expose())
    }
}
