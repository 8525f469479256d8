use crate::{
    CONFIG_FILENAME, ConfigError, ConfigErrorResult, DEFAULT_CONFIG_DIR_NAME, LoggingConfig,
    ProviderConfig, SessionConfig, StorageConfig,
};

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::Deserialize;

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "TD_CONFIG_DIR";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Check for TD_CONFIG_DIR env var, else use ~/.truedots/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply TD_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: TD_CONFIG_DIR env var > ~/.truedots/
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(DEFAULT_CONFIG_DIR_NAME))
    }

    /// Validate all configuration.
    /// Call after load() so a missing provider endpoint or key stops startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.provider.validate()?;
        self.session.validate()?;
        self.storage.validate()?;
        Ok(())
    }

    /// Absolute path of the persistent storage file.
    pub fn persistent_storage_path(&self) -> ConfigErrorResult<PathBuf> {
        Ok(Self::config_dir()?.join(&self.storage.persistent_file))
    }

    /// Absolute path of the log file, when file logging is configured.
    pub fn log_file_path(&self) -> ConfigErrorResult<Option<PathBuf>> {
        match self.logging.file {
            Some(ref filename) => {
                let dir = Self::config_dir()?.join(&self.logging.dir);
                Ok(Some(dir.join(filename)))
            }
            None => Ok(None),
        }
    }

    pub fn sign_out_timeout(&self) -> Duration {
        Duration::from_secs(self.session.sign_out_timeout_secs)
    }

    pub fn loading_ceiling(&self) -> Duration {
        Duration::from_secs(self.session.loading_ceiling_secs)
    }

    pub fn settling_delay(&self) -> Duration {
        Duration::from_millis(self.session.settling_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.request_timeout_secs)
    }

    /// Log configuration summary (NEVER logs the anon key).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  provider: {} (anon key {}, table '{}', timeout {}s)",
            self.provider.url.as_deref().unwrap_or("<unset>"),
            if self.provider.anon_key.is_some() {
                "set"
            } else {
                "missing"
            },
            self.provider.profiles_table,
            self.provider.request_timeout_secs
        );
        info!(
            "  session: sign_out_timeout={}s, loading_ceiling={}s, settling_delay={}ms",
            self.session.sign_out_timeout_secs,
            self.session.loading_ceiling_secs,
            self.session.settling_delay_ms
        );
        info!("  session: purge_patterns={:?}", self.session.purge_patterns);
        info!("  storage: {}", self.storage.persistent_file);
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Provider
        Self::apply_env_option_string("TD_PROVIDER_URL", &mut self.provider.url);
        Self::apply_env_option_string("TD_PROVIDER_ANON_KEY", &mut self.provider.anon_key);
        Self::apply_env_string("TD_PROVIDER_STORAGE_KEY", &mut self.provider.storage_key);
        Self::apply_env_string(
            "TD_PROVIDER_PROFILES_TABLE",
            &mut self.provider.profiles_table,
        );
        Self::apply_env_parse(
            "TD_PROVIDER_REQUEST_TIMEOUT_SECS",
            &mut self.provider.request_timeout_secs,
        );

        // Session
        Self::apply_env_parse(
            "TD_SESSION_SIGN_OUT_TIMEOUT_SECS",
            &mut self.session.sign_out_timeout_secs,
        );
        Self::apply_env_parse(
            "TD_SESSION_LOADING_CEILING_SECS",
            &mut self.session.loading_ceiling_secs,
        );
        Self::apply_env_parse(
            "TD_SESSION_SETTLING_DELAY_MS",
            &mut self.session.settling_delay_ms,
        );
        Self::apply_env_list("TD_SESSION_PURGE_PATTERNS", &mut self.session.purge_patterns);

        // Storage
        Self::apply_env_string(
            "TD_STORAGE_PERSISTENT_FILE",
            &mut self.storage.persistent_file,
        );

        // Logging
        Self::apply_env_parse("TD_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("TD_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("TD_LOG_FILE", &mut self.logging.file);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }

    /// Helper: Apply comma-separated environment variable override
    fn apply_env_list(var_name: &str, target: &mut Vec<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect();
        }
    }
}
