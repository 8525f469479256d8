use std::panic::Location;

use error_location::ErrorLocation;
use td_config::ConfigError;
use td_provider::{ProviderError, StorageError};
use td_session::SessionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("{source}")]
    Provider {
        #[from]
        source: ProviderError,
    },

    #[error("Local storage error: {source}")]
    Storage {
        #[from]
        source: StorageError,
    },

    #[error("{source}")]
    Session {
        #[from]
        source: SessionError,
    },

    #[error("Failed to encode output: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// The operation ran and reported a failure for the user.
    #[error("{message}")]
    Failed { message: String },

    #[error("Invalid usage: {message} {location}")]
    Usage {
        message: String,
        location: ErrorLocation,
    },

    #[error("Failed to initialize logger: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },
}

impl CliError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    #[track_caller]
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn logger(message: impl Into<String>) -> Self {
        Self::Logger {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
