use std::panic::Location;

use error_location::ErrorLocation;
use td_provider::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// The provider refused or failed the sign-out. Local state has
    /// already been cleared when this is returned.
    #[error("Sign-out failed: {source} {location}")]
    SignOut {
        #[source]
        source: ProviderError,
        location: ErrorLocation,
    },
}

impl SessionError {
    #[track_caller]
    pub fn sign_out(source: ProviderError) -> Self {
        Self::SignOut {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
