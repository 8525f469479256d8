//! Key/value stores standing in for browser persistent and session storage.
//!
//! The identity provider keeps its session under a well-known key in the
//! persistent store; sign-out sweeps both stores for auth-related keys.

mod error;
mod file_store;
mod memory_store;
mod storage_set;

pub use error::{Result as StorageResult, StorageError};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use storage_set::StorageSet;

/// String key/value storage shared across tasks.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Removes every key containing any of `patterns`; returns the removed keys.
    fn purge_matching(&self, patterns: &[String]) -> StorageResult<Vec<String>> {
        let doomed: Vec<String> = self
            .keys()?
            .into_iter()
            .filter(|key| key_matches(key, patterns))
            .collect();

        for key in &doomed {
            self.remove(key)?;
        }

        Ok(doomed)
    }
}

pub(crate) fn key_matches(key: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .filter(|pattern| !pattern.is_empty())
        .any(|pattern| key.contains(pattern.as_str()))
}
