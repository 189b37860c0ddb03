//! In-process fallback store.
//!
//! Holds serialized records in a `RwLock<HashMap>` with no TTL and no
//! durability. Used when the SQLite backend is unavailable so status
//! reporting keeps working for the life of the process.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Volatile key/value store.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a record.
    pub fn put(&self, key: &str, value: &str) {
        self.entries.write().insert(key.to_string(), value.to_string());
    }

    /// Read a record.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    /// All records with the given key prefix, in no particular order.
    pub fn list(&self, prefix: &str) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(_, v)| v.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_prefix() {
        let store = MemoryStore::new();
        store.put("task:a", "one");
        store.put("batch:b", "two");

        assert_eq!(store.get("task:a").as_deref(), Some("one"));
        assert!(store.get("task:z").is_none());
        assert_eq!(store.list("task:"), vec!["one".to_string()]);
    }
}
