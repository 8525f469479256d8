use std::time::Duration;

use td_config::{
    Config, DEFAULT_LOADING_CEILING_SECS, DEFAULT_PURGE_PATTERNS, DEFAULT_SETTLING_DELAY_MS,
    DEFAULT_SIGN_OUT_TIMEOUT_SECS,
};

/// Timings and cleanup policy used by [`crate::SessionManager`].
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub sign_out_timeout: Duration,
    pub loading_ceiling: Duration,
    pub settling_delay: Duration,
    pub purge_patterns: Vec<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            sign_out_timeout: Duration::from_secs(DEFAULT_SIGN_OUT_TIMEOUT_SECS),
            loading_ceiling: Duration::from_secs(DEFAULT_LOADING_CEILING_SECS),
            settling_delay: Duration::from_millis(DEFAULT_SETTLING_DELAY_MS),
            purge_patterns: DEFAULT_PURGE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sign_out_timeout: config.sign_out_timeout(),
            loading_ceiling: config.loading_ceiling(),
            settling_delay: config.settling_delay(),
            purge_patterns: config.session.purge_patterns.clone(),
        }
    }
}
