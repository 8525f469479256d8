use crate::{ConfigError, ConfigErrorResult, DEFAULT_PERSISTENT_FILE};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// File (relative to the config dir) backing persistent storage
    pub persistent_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            persistent_file: String::from(DEFAULT_PERSISTENT_FILE),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let path = std::path::Path::new(&self.persistent_file);
        if self.persistent_file.trim().is_empty()
            || path.is_absolute()
            || self.persistent_file.contains("..")
        {
            return Err(ConfigError::storage(
                "storage.persistent_file must be relative and cannot contain '..'",
            ));
        }
        Ok(())
    }
}
