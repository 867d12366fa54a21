//! Durable client state: access token, refresh token and the current user record.
//!
//! The [`CredentialStore`] trait is the seam between the session and the
//! backing store. Production uses the OS keychain, tests and `--ephemeral`
//! runs use [`MemoryStore`].

pub mod keychain;
mod memory;

pub use keychain::KeychainStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Keys under which client state is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    AccessToken,
    RefreshToken,
    User,
}

impl StoreKey {
    pub const ALL: [StoreKey; 3] = [StoreKey::AccessToken, StoreKey::RefreshToken, StoreKey::User];

    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::AccessToken => "access_token",
            StoreKey::RefreshToken => "refresh_token",
            StoreKey::User => "user",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Credential store operation failed: {0}")]
    OperationFailed(String),
}

/// Key-value store for persisted client state.
///
/// Implementations must treat `remove` of a missing key as success.
pub trait CredentialStore: Send + Sync {
    fn load(&self, key: StoreKey) -> Result<Option<String>, StoreError>;
    fn save(&self, key: StoreKey, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: StoreKey) -> Result<(), StoreError>;

    /// Remove every persisted key, continuing past individual failures.
    fn clear(&self) -> Result<(), StoreError> {
        let mut first_err = None;
        for key in StoreKey::ALL {
            if let Err(e) = self.remove(key) {
                log::warn!("Failed to remove {} from store: {}", key.as_str(), e);
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
