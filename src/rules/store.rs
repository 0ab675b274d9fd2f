use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::{QuickSpaceError, QuickSpaceResult};
use crate::rules::normalize::{normalize, LEGACY_SELECTORS_KEY, RULES_KEY};
use crate::rules::types::RuleList;

/// Asynchronous key-value store holding the rule lists.
///
/// Mirrors the browser extension storage area: `get` returns an object with
/// only the requested keys that are present. The trigger path only reads; the
/// editor writes through `set` and `remove`.
#[async_trait(?Send)]
pub trait RuleStore {
    async fn get(&self, keys: &[&str]) -> QuickSpaceResult<Value>;

    async fn set(&self, key: &str, value: Value) -> QuickSpaceResult<()>;

    async fn remove(&self, keys: &[&str]) -> QuickSpaceResult<()>;
}

/// Reads both schemas and normalizes them into one snapshot.
pub async fn fetch_rules<S: RuleStore + ?Sized>(store: &S) -> QuickSpaceResult<RuleList> {
    let raw = store.get(&[RULES_KEY, LEGACY_SELECTORS_KEY]).await?;
    Ok(normalize(&raw))
}

/// Store backed by a map, for tests and native hosts.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&self, key: &str, value: Value) {
        self.lock().insert(key.to_string(), value);
    }

    pub fn snapshot(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        // A poisoned map is still a usable map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait(?Send)]
impl RuleStore for MemoryRuleStore {
    async fn get(&self, keys: &[&str]) -> QuickSpaceResult<Value> {
        let entries = self.lock();
        let found: Map<String, Value> = keys
            .iter()
            .filter_map(|key| entries.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect();
        Ok(Value::Object(found))
    }

    async fn set(&self, key: &str, value: Value) -> QuickSpaceResult<()> {
        if key.is_empty() {
            return Err(QuickSpaceError::Storage("empty storage key".into()));
        }
        self.insert(key, value);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> QuickSpaceResult<()> {
        let mut entries = self.lock();
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}
