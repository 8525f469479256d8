use crate::storage::{KeyValueStore, MemoryStore};

use std::sync::Arc;

/// The two client-side stores the application touches.
#[derive(Clone)]
pub struct StorageSet {
    /// Survives restarts; holds the provider session.
    pub persistent: Arc<dyn KeyValueStore>,
    /// Scoped to the running process.
    pub session: Arc<dyn KeyValueStore>,
}

impl StorageSet {
    pub fn new(persistent: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self {
            persistent,
            session,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }
}
