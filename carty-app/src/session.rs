use carty_core::{CoreError, CoreResult, Credentials};
use carty_shared::models::User;
use carty_store::{SessionStore, StoreError, StoreResult};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// The signed-in user, mirrored to durable storage on every change.
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    user: RwLock<Option<User>>,
}

impl SessionContext {
    /// Restores a previously stored user. An unreadable entry is discarded.
    pub async fn restore(store: Arc<dyn SessionStore>) -> Self {
        let user = match store.load().await {
            Ok(user) => user,
            Err(StoreError::Corrupt(e)) => {
                warn!(error = %e, "discarding unreadable session");
                if let Err(e) = store.clear().await {
                    warn!(error = %e, "failed to clear unreadable session");
                }
                None
            }
            Err(e) => {
                warn!(error = %e, "session storage unavailable");
                None
            }
        };
        if let Some(user) = &user {
            info!(username = %user.username, "session restored");
        }
        Self {
            store,
            user: RwLock::new(user),
        }
    }

    /// `Some` persists a copy, `None` removes the stored entry.
    pub async fn set_user(&self, user: Option<User>) -> StoreResult<()> {
        let mut current = self.user.write().await;
        match &user {
            Some(user) => self.store.save(user).await?,
            None => self.store.clear().await?,
        }
        *current = user;
        Ok(())
    }

    pub async fn current_user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    pub async fn user_id(&self) -> Option<i64> {
        self.user.read().await.as_ref().and_then(|u| u.id)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.credentials().await.is_ok()
    }

    pub async fn credentials(&self) -> CoreResult<Credentials> {
        self.credentials_at(Utc::now().timestamp()).await
    }

    /// Credentials for dispatch, refused when signed out or the token has expired.
    pub async fn credentials_at(&self, now: i64) -> CoreResult<Credentials> {
        match self.user.read().await.as_ref() {
            None => Err(CoreError::Unauthenticated("no user signed in".to_string())),
            Some(user) if user.is_expired_at(now) => Err(CoreError::Unauthenticated(format!(
                "token for {} has expired",
                user.username
            ))),
            Some(user) => Ok(Credentials::for_user(user)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carty_shared::models::AuthScheme;
    use carty_shared::Masked;
    use carty_store::MemorySessionStore;

    fn user(expires_at: Option<i64>) -> User {
        User {
            id: Some(1),
            username: "asha".to_string(),
            token: Masked::from("abc"),
            scheme: AuthScheme::Jwt,
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_set_persists_clear_removes_restore_reads() {
        let store = Arc::new(MemorySessionStore::new());
        let session = SessionContext::restore(store.clone()).await;
        assert!(session.current_user().await.is_none());

        session.set_user(Some(user(None))).await.unwrap();
        assert!(store.raw().await.is_some());

        let restored = SessionContext::restore(store.clone()).await;
        assert_eq!(restored.current_user().await, Some(user(None)));

        restored.set_user(None).await.unwrap();
        assert!(store.raw().await.is_none());
        assert!(SessionContext::restore(store).await.current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_cleared() {
        let store = Arc::new(MemorySessionStore::with_raw("{\"username\":"));
        let session = SessionContext::restore(store.clone()).await;
        assert!(session.current_user().await.is_none());
        assert!(store.raw().await.is_none());
    }

    #[tokio::test]
    async fn test_expired_token_yields_no_credentials() {
        let session = SessionContext::restore(Arc::new(MemorySessionStore::new())).await;
        assert!(matches!(
            session.credentials().await,
            Err(CoreError::Unauthenticated(_))
        ));

        session.set_user(Some(user(Some(1_000)))).await.unwrap();
        assert!(session.credentials_at(999).await.is_ok());
        assert!(session.credentials_at(1_000).await.is_err());
        assert_eq!(
            session.credentials_at(0).await.unwrap().header_value(),
            "Bearer abc"
        );
    }
}
