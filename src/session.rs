//! Client session: the live Credential Pair, current user record and locale.
//!
//! Restored from the [`CredentialStore`] at startup, mutated only by login,
//! registration verification, refresh and logout, and torn down by
//! [`Session::clear`]. Every write goes to memory first and then to the store.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::api::types::TokenGrant;
use crate::events::AuthEvents;
use crate::storage::{CredentialStore, StoreError, StoreKey};

/// Locale used when none is configured.
pub const DEFAULT_LOCALE: &str = "en";

/// Access and refresh token. Either may be absent.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CredentialPair {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug)]
struct SessionState {
    credentials: CredentialPair,
    user: Option<Value>,
    locale: String,
}

pub struct Session {
    store: Arc<dyn CredentialStore>,
    state: RwLock<SessionState>,
    events: AuthEvents,
}

impl Session {
    /// Build a session from whatever the store currently holds.
    ///
    /// Unreadable entries are logged and treated as absent.
    pub fn restore(store: Arc<dyn CredentialStore>, locale: &str, events: AuthEvents) -> Self {
        let read = |key: StoreKey| match store.load(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to read {} from store: {}", key.as_str(), e);
                None
            }
        };

        let credentials = CredentialPair {
            access_token: read(StoreKey::AccessToken),
            refresh_token: read(StoreKey::RefreshToken),
        };
        let user = read(StoreKey::User).and_then(|raw| match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("Discarding unparseable stored user record: {}", e);
                None
            }
        });

        log::debug!(
            "Session restored (access token: {}, refresh token: {}, user: {})",
            credentials.access_token.is_some(),
            credentials.refresh_token.is_some(),
            user.is_some()
        );

        Self {
            store,
            state: RwLock::new(SessionState {
                credentials,
                user,
                locale: locale.to_string(),
            }),
            events,
        }
    }

    pub fn events(&self) -> &AuthEvents {
        &self.events
    }

    pub async fn access_token(&self) -> Option<String> {
        self.state.read().await.credentials.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.state.read().await.credentials.refresh_token.clone()
    }

    pub async fn credentials(&self) -> CredentialPair {
        self.state.read().await.credentials.clone()
    }

    pub async fn user(&self) -> Option<Value> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.credentials.access_token.is_some()
    }

    pub async fn locale(&self) -> String {
        self.state.read().await.locale.clone()
    }

    pub async fn set_locale(&self, locale: &str) {
        self.state.write().await.locale = locale.to_string();
    }

    /// Apply whichever of token, refresh token and user the grant carries.
    ///
    /// The in-memory session is always updated. A store failure is returned
    /// after every field has been attempted.
    pub async fn apply_grant(&self, grant: &TokenGrant) -> Result<(), StoreError> {
        let mut first_err = None;
        let mut state = self.state.write().await;

        if let Some(token) = &grant.token {
            replace(&mut state.credentials.access_token, token);
            if let Err(e) = self.store.save(StoreKey::AccessToken, token) {
                first_err.get_or_insert(e);
            }
        }
        if let Some(refresh) = &grant.refresh_token {
            replace(&mut state.credentials.refresh_token, refresh);
            if let Err(e) = self.store.save(StoreKey::RefreshToken, refresh) {
                first_err.get_or_insert(e);
            }
        }
        if let Some(user) = &grant.user {
            state.user = Some(user.clone());
            if let Err(e) = self.store.save(StoreKey::User, &user.to_string()) {
                first_err.get_or_insert(e);
            }
        }

        first_err.map_or(Ok(()), Err)
    }

    /// Replace the current user record.
    pub async fn set_user(&self, user: Value) -> Result<(), StoreError> {
        let raw = user.to_string();
        self.state.write().await.user = Some(user);
        self.store.save(StoreKey::User, &raw)
    }

    /// Wipe credentials and user from memory and the store. The locale survives.
    pub async fn clear(&self) {
        {
            let mut state = self.state.write().await;
            state.credentials.zeroize();
            state.user = None;
        }
        if let Err(e) = self.store.clear() {
            log::warn!("Failed to clear persisted session: {}", e);
        }
        log::info!("Session cleared");
    }
}

fn replace(slot: &mut Option<String>, value: &str) {
    if let Some(old) = slot.as_mut() {
        old.zeroize();
    }
    *slot = Some(value.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn session_with(store: Arc<MemoryStore>) -> Session {
        Session::restore(store, DEFAULT_LOCALE, AuthEvents::new())
    }

    #[tokio::test]
    async fn test_restore_from_store() {
        let store = Arc::new(MemoryStore::with_entries([
            (StoreKey::AccessToken, "access-1"),
            (StoreKey::RefreshToken, "refresh-1"),
            (StoreKey::User, r#"{"id":"u1","role":"admin"}"#),
        ]));
        let session = session_with(store);

        assert_eq!(session.access_token().await.as_deref(), Some("access-1"));
        assert_eq!(session.refresh_token().await.as_deref(), Some("refresh-1"));
        assert_eq!(session.user().await, Some(json!({"id": "u1", "role": "admin"})));
        assert!(session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_restore_discards_corrupt_user() {
        let store = Arc::new(MemoryStore::with_entries([(StoreKey::User, "{not json")]));
        let session = session_with(store);
        assert_eq!(session.user().await, None);
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_apply_grant_persists_present_fields_only() {
        let store = Arc::new(MemoryStore::with_entries([(StoreKey::RefreshToken, "keep-me")]));
        let session = session_with(store.clone());

        let grant = TokenGrant {
            token: Some("new-access".to_string()),
            refresh_token: None,
            user: None,
        };
        session.apply_grant(&grant).await.unwrap();

        assert_eq!(session.access_token().await.as_deref(), Some("new-access"));
        assert_eq!(session.refresh_token().await.as_deref(), Some("keep-me"));
        assert_eq!(
            store.load(StoreKey::AccessToken).unwrap().as_deref(),
            Some("new-access")
        );
        assert_eq!(store.load(StoreKey::User).unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_wipes_credentials_but_keeps_locale() {
        let store = Arc::new(MemoryStore::with_entries([
            (StoreKey::AccessToken, "a"),
            (StoreKey::RefreshToken, "r"),
        ]));
        let session = session_with(store.clone());
        session.set_locale("ar").await;

        session.clear().await;

        assert_eq!(session.credentials().await, CredentialPair::default());
        assert_eq!(session.locale().await, "ar");
        assert_eq!(store.load(StoreKey::AccessToken).unwrap(), None);
        assert_eq!(store.load(StoreKey::RefreshToken).unwrap(), None);
    }

    #[test]
    fn test_credential_pair_debug_is_redacted() {
        let pair = CredentialPair {
            access_token: Some("secret-token".to_string()),
            refresh_token: None,
        };
        let rendered = format!("{:?}", pair);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
