//! In-process store. Contents are lost when the process exits.

use std::collections::HashMap;
use std::sync::Mutex;

use zeroize::Zeroize;

use super::{CredentialStore, StoreError, StoreKey};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StoreKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the given entries.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (StoreKey, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<StoreKey, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::OperationFailed("memory store lock poisoned".to_string()))
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(&key).cloned())
    }

    fn save(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        if let Some(mut old) = self.lock()?.insert(key, value.to_string()) {
            old.zeroize();
        }
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        if let Some(mut old) = self.lock()?.remove(&key) {
            old.zeroize();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.load(StoreKey::AccessToken).unwrap(), None);

        store.save(StoreKey::AccessToken, "tok").unwrap();
        assert_eq!(store.load(StoreKey::AccessToken).unwrap().as_deref(), Some("tok"));

        store.remove(StoreKey::AccessToken).unwrap();
        assert_eq!(store.load(StoreKey::AccessToken).unwrap(), None);
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove(StoreKey::User).is_ok());
    }

    #[test]
    fn test_clear_removes_all_keys() {
        let store = MemoryStore::with_entries([
            (StoreKey::AccessToken, "a"),
            (StoreKey::RefreshToken, "r"),
            (StoreKey::User, "{}"),
        ]);
        store.clear().unwrap();
        for key in StoreKey::ALL {
            assert_eq!(store.load(key).unwrap(), None);
        }
    }
}
