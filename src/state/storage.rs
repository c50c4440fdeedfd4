//! Durable key/value storage for the session credential.
//!
//! SYSTEM CONTEXT
//! ==============
//! The API client reads (and on 401 clears) the credential; the session
//! manager is the only writer. In the browser this is `localStorage`; SSR
//! paths get an inert store, and tests use [`MemoryStorage`].

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::HashMap;
use std::sync::Mutex;

/// Key holding the bearer credential.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Legacy cached user record; only ever cleared.
pub const USER_DATA_KEY: &str = "user_data";
pub const USER_PREFERENCES_KEY: &str = "user_preferences";
pub const REMEMBERED_EMAIL_KEY: &str = "remembered_email";

/// Every key removed together on logout or a forced unauthorized reset.
pub const SESSION_KEYS: [&str; 4] = [ACCESS_TOKEN_KEY, USER_DATA_KEY, USER_PREFERENCES_KEY, REMEMBERED_EMAIL_KEY];

/// Minimal string key/value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    /// Best-effort write; failures (quota, private mode) are logged by the implementation.
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Read the stored credential. Empty values count as absent.
pub fn credential(store: &dyn KeyValueStore) -> Option<String> {
    store.get(ACCESS_TOKEN_KEY).filter(|token| !token.is_empty())
}

/// Remove the credential and every ancillary session key.
pub fn clear_session(store: &dyn KeyValueStore) {
    for key in SESSION_KEYS {
        store.remove(key);
    }
}

/// In-process store used off-browser.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-seeded with `entries`.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect();
        Self { entries: Mutex::new(entries) }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}

/// `window.localStorage`. Every operation is a no-op outside the browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

#[cfg(feature = "hydrate")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        #[cfg(feature = "hydrate")]
        {
            local_storage()?.get_item(key).ok().flatten()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            None
        }
    }

    fn set(&self, key: &str, value: &str) {
        #[cfg(feature = "hydrate")]
        {
            let Some(storage) = local_storage() else {
                log::warn!("localStorage unavailable; {key} not persisted");
                return;
            };
            if storage.set_item(key, value).is_err() {
                log::warn!("localStorage write failed for {key}");
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (key, value);
        }
    }

    fn remove(&self, key: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(storage) = local_storage() {
                let _ = storage.remove_item(key);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
        }
    }
}
