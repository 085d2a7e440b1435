//! Tab-scoped storage and the single-slot hand-off mailbox built on it

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::cache::MethodsCache;
use super::error::HandoffResult;
use super::intent::HandoffIntent;

/// Storage key of the pending hand-off intent
pub const INTENT_KEY: &str = "ul.handoff.intent";
/// Storage key of the methods cache
pub const METHODS_CACHE_KEY: &str = "ul.handoff.methods";

/// Same-origin, tab-scoped string key/value store
pub trait SessionStorage {
    fn get(&self, key: &str) -> HandoffResult<Option<String>>;
    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> HandoffResult<()>;
    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> HandoffResult<()>;
}

impl<T: SessionStorage + ?Sized> SessionStorage for Arc<T> {
    fn get(&self, key: &str) -> HandoffResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> HandoffResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> HandoffResult<()> {
        (**self).remove(key)
    }
}

/// In-memory storage for native runs and tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> HandoffResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> HandoffResult<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> HandoffResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Hand-off channel between independently rendered screens
///
/// Intents are write-once, read-once: `take_intent` removes the record before
/// decoding it, so a reload or a second render always sees "absent".
#[derive(Debug, Clone)]
pub struct HandoffChannel<S> {
    storage: S,
}

impl<S: SessionStorage> HandoffChannel<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Store `intent`, replacing any stale one
    pub fn write_intent(&self, intent: &HandoffIntent) -> HandoffResult<()> {
        let value = serde_json::to_string(intent)?;
        self.storage.set(INTENT_KEY, &value)?;
        tracing::debug!(
            "Hand-off intent stored: connection={}",
            intent.connection()
        );
        Ok(())
    }

    /// Drop a pending intent without reading it
    pub fn discard_intent(&self) -> HandoffResult<()> {
        self.storage.remove(INTENT_KEY)
    }

    /// Read and delete the pending intent
    ///
    /// Storage failures and malformed records are logged and reported as absent.
    /// An intent that can't be deleted is never acted on.
    pub fn take_intent(&self) -> Option<HandoffIntent> {
        let raw = match self.storage.get(INTENT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read hand-off intent: {}", e);
                return None;
            }
        };

        // Delete before decoding so a bad record can't be replayed either
        if let Err(e) = self.discard_intent() {
            tracing::warn!("Failed to delete hand-off intent, ignoring it: {}", e);
            return None;
        }

        match serde_json::from_str::<HandoffIntent>(&raw)
            .map_err(Into::into)
            .and_then(HandoffIntent::validate)
        {
            Ok(intent) => {
                tracing::debug!(
                    "Hand-off intent consumed: connection={}",
                    intent.connection()
                );
                Some(intent)
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed hand-off intent: {}", e);
                None
            }
        }
    }

    pub fn write_methods_cache(&self, cache: &MethodsCache) -> HandoffResult<()> {
        let value = serde_json::to_string(cache)?;
        self.storage.set(METHODS_CACHE_KEY, &value)
    }

    pub fn clear_methods_cache(&self) {
        if let Err(e) = self.storage.remove(METHODS_CACHE_KEY) {
            tracing::warn!("Failed to clear methods cache: {}", e);
        }
    }

    /// Cached methods for the transaction `state`
    ///
    /// A cache from another transaction, or one that can't be decoded, is removed.
    pub fn methods_cache_for(&self, state: &str) -> Option<MethodsCache> {
        let raw = match self.storage.get(METHODS_CACHE_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Failed to read methods cache: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<MethodsCache>(&raw) {
            Ok(cache) if cache.is_valid_for(state) => Some(cache),
            Ok(_) => {
                tracing::debug!("Methods cache belongs to another transaction, discarding");
                self.clear_methods_cache();
                None
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed methods cache: {}", e);
                self.clear_methods_cache();
                None
            }
        }
    }
}
