use crate::{ProviderError, ProviderResult};

use std::time::Duration;

use td_config::{DEFAULT_PROFILES_TABLE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STORAGE_KEY, ProviderConfig};

/// Resolved connection settings for [`crate::SupabaseProvider`].
#[derive(Clone)]
pub struct SupabaseSettings {
    pub base_url: String,
    pub anon_key: String,
    pub storage_key: String,
    pub profiles_table: String,
    pub request_timeout: Duration,
}

impl SupabaseSettings {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            anon_key: anon_key.trim().to_string(),
            storage_key: String::from(DEFAULT_STORAGE_KEY),
            profiles_table: String::from(DEFAULT_PROFILES_TABLE),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> ProviderResult<Self> {
        let url = config
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ProviderError::config("provider url is not set"))?;
        let anon_key = config
            .anon_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::config("provider anon key is not set"))?;

        Ok(Self {
            storage_key: config.storage_key.clone(),
            profiles_table: config.profiles_table.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            ..Self::new(url, anon_key)
        })
    }

    pub fn with_storage_key(mut self, storage_key: impl Into<String>) -> Self {
        self.storage_key = storage_key.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl std::fmt::Debug for SupabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseSettings")
            .field("base_url", &self.base_url)
            .field("anon_key", &"<redacted>")
            .field("storage_key", &self.storage_key)
            .field("profiles_table", &self.profiles_table)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
