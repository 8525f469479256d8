mod config;
mod error;
mod log_level;
mod logging_config;
mod provider_config;
mod session_config;
mod storage_config;

#[cfg(test)]
mod tests;

pub use config::{CONFIG_DIR_ENV, Config};
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use provider_config::ProviderConfig;
pub use session_config::SessionConfig;
pub use storage_config::StorageConfig;

const DEFAULT_CONFIG_DIR_NAME: &str = ".truedots";
const CONFIG_FILENAME: &str = "config.toml";

// Provider
pub const DEFAULT_STORAGE_KEY: &str = "supabase.auth.token";
pub const DEFAULT_PROFILES_TABLE: &str = "profiles";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

// Session lifecycle
pub const DEFAULT_SIGN_OUT_TIMEOUT_SECS: u64 = 10;
pub const MIN_SIGN_OUT_TIMEOUT_SECS: u64 = 1;
pub const MAX_SIGN_OUT_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_LOADING_CEILING_SECS: u64 = 5;
pub const MIN_LOADING_CEILING_SECS: u64 = 1;
pub const MAX_LOADING_CEILING_SECS: u64 = 60;

pub const DEFAULT_SETTLING_DELAY_MS: u64 = 1000;
pub const MAX_SETTLING_DELAY_MS: u64 = 30_000;

pub const DEFAULT_PURGE_PATTERNS: [&str; 2] = ["supabase", "auth"];

// Storage
pub const DEFAULT_PERSISTENT_FILE: &str = "storage.json";

// Logging
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";
const DEFAULT_LOG_COLORED: bool = true;
