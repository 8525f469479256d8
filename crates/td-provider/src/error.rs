use crate::StorageError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Errors that can occur while talking to the identity provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request error: {message} {location}")]
    Http {
        message: String,
        location: ErrorLocation,
        #[source]
        source: reqwest::Error,
    },

    #[error("Provider error: {message} (status: {status}) {location}")]
    Api {
        status: u16,
        message: String,
        location: ErrorLocation,
    },

    #[error("JSON parse error: {message} {location}")]
    Json {
        message: String,
        location: ErrorLocation,
        #[source]
        source: serde_json::Error,
    },

    #[error("No active session {location}")]
    NoSession { location: ErrorLocation },

    #[error("Provider returned no rows for {operation} {location}")]
    EmptyResponse {
        operation: &'static str,
        location: ErrorLocation,
    },

    #[error("Session storage error: {source} {location}")]
    Storage {
        #[source]
        source: StorageError,
        location: ErrorLocation,
    },

    #[error("Provider configuration error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },
}

impl ProviderError {
    /// The provider understood the request and refused it (bad credentials,
    /// duplicate email, row-level security). Anything else is unexpected.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Api { status, .. } if (400..500).contains(status))
    }

    /// Message for the user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } if self.is_rejection() => message.clone(),
            _ => String::from(UNEXPECTED_ERROR_MESSAGE),
        }
    }

    /// Create an API error with location
    #[track_caller]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn no_session() -> Self {
        Self::NoSession {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn empty_response(operation: &'static str) -> Self {
        Self::EmptyResponse {
            operation,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::Http {
            message: err.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }
}

impl From<StorageError> for ProviderError {
    #[track_caller]
    fn from(source: StorageError) -> Self {
        Self::Storage {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
