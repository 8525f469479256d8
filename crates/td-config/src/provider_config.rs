use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_PROFILES_TABLE, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_STORAGE_KEY, MAX_REQUEST_TIMEOUT_SECS, MIN_REQUEST_TIMEOUT_SECS,
};

use serde::Deserialize;

/// Connection to the hosted identity provider.
///
/// `url` and `anon_key` have no defaults: a client without them cannot do
/// anything, so `validate()` refuses to start.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Project endpoint, e.g. `https://abcd.supabase.co`
    pub url: Option<String>,
    /// Public (anon) API key
    pub anon_key: Option<String>,
    /// Persistent-storage key the session is saved under
    pub storage_key: String,
    pub profiles_table: String,
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            storage_key: String::from(DEFAULT_STORAGE_KEY),
            profiles_table: String::from(DEFAULT_PROFILES_TABLE),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

// Keep the anon key out of debug output
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("url", &self.url)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "<redacted>"))
            .field("storage_key", &self.storage_key)
            .field("profiles_table", &self.profiles_table)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let url = self.url.as_deref().map(str::trim).unwrap_or_default();
        if url.is_empty() {
            return Err(ConfigError::provider(
                "provider.url is required (set TD_PROVIDER_URL)",
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::provider(format!(
                "provider.url must start with http:// or https://, got {url}"
            )));
        }

        if self.anon_key.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            return Err(ConfigError::provider(
                "provider.anon_key is required (set TD_PROVIDER_ANON_KEY)",
            ));
        }

        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::provider("provider.storage_key cannot be empty"));
        }

        if self.profiles_table.trim().is_empty() {
            return Err(ConfigError::provider(
                "provider.profiles_table cannot be empty",
            ));
        }

        if self.request_timeout_secs < MIN_REQUEST_TIMEOUT_SECS
            || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS
        {
            return Err(ConfigError::provider(format!(
                "provider.request_timeout_secs must be {}-{}, got {}",
                MIN_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS, self.request_timeout_secs
            )));
        }

        Ok(())
    }
}
