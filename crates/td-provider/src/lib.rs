//! td-provider
//!
//! The identity provider port used by the session manager, the Supabase
//! REST adapter implementing it, and the key/value stores that stand in
//! for browser persistent and session-scoped storage.

pub mod error;
pub mod identity_provider;
pub mod storage;
pub mod supabase;

#[cfg(test)]
mod tests;

pub use error::{ProviderError, Result as ProviderResult};
pub use identity_provider::{AuthSubscription, IdentityProvider, SignUpResponse};
pub use storage::{
    FileStore, KeyValueStore, MemoryStore, StorageError, StorageResult, StorageSet,
};
pub use supabase::{SupabaseProvider, SupabaseSettings};
