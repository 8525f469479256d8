use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_LOADING_CEILING_SECS, DEFAULT_PURGE_PATTERNS,
    DEFAULT_SETTLING_DELAY_MS, DEFAULT_SIGN_OUT_TIMEOUT_SECS, MAX_LOADING_CEILING_SECS,
    MAX_SETTLING_DELAY_MS, MAX_SIGN_OUT_TIMEOUT_SECS, MIN_LOADING_CEILING_SECS,
    MIN_SIGN_OUT_TIMEOUT_SECS,
};

use serde::Deserialize;

/// Timings and cleanup policy for the session lifecycle.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Ceiling on the provider sign-out call
    pub sign_out_timeout_secs: u64,
    /// Loading is forced off after this long if nothing else resolved it
    pub loading_ceiling_secs: u64,
    /// Wait between registration and the profile enrichment write
    pub settling_delay_ms: u64,
    /// Storage keys containing any of these are removed on sign-out
    pub purge_patterns: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sign_out_timeout_secs: DEFAULT_SIGN_OUT_TIMEOUT_SECS,
            loading_ceiling_secs: DEFAULT_LOADING_CEILING_SECS,
            settling_delay_ms: DEFAULT_SETTLING_DELAY_MS,
            purge_patterns: DEFAULT_PURGE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.sign_out_timeout_secs < MIN_SIGN_OUT_TIMEOUT_SECS
            || self.sign_out_timeout_secs > MAX_SIGN_OUT_TIMEOUT_SECS
        {
            return Err(ConfigError::session(format!(
                "session.sign_out_timeout_secs must be {}-{}, got {}",
                MIN_SIGN_OUT_TIMEOUT_SECS, MAX_SIGN_OUT_TIMEOUT_SECS, self.sign_out_timeout_secs
            )));
        }

        if self.loading_ceiling_secs < MIN_LOADING_CEILING_SECS
            || self.loading_ceiling_secs > MAX_LOADING_CEILING_SECS
        {
            return Err(ConfigError::session(format!(
                "session.loading_ceiling_secs must be {}-{}, got {}",
                MIN_LOADING_CEILING_SECS, MAX_LOADING_CEILING_SECS, self.loading_ceiling_secs
            )));
        }

        if self.settling_delay_ms > MAX_SETTLING_DELAY_MS {
            return Err(ConfigError::session(format!(
                "session.settling_delay_ms must be at most {}, got {}",
                MAX_SETTLING_DELAY_MS, self.settling_delay_ms
            )));
        }

        if self.purge_patterns.iter().any(|p| p.trim().is_empty()) {
            // An empty pattern would match, and wipe, every stored key
            return Err(ConfigError::session(
                "session.purge_patterns cannot contain empty entries",
            ));
        }

        Ok(())
    }
}
