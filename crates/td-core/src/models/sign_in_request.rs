use crate::{CoreError, CoreResult, validate_email};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl SignInRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Required-field check run before any network call.
    #[track_caller]
    pub fn validate(&self) -> CoreResult<()> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(CoreError::validation("password", "Password is required"));
        }
        Ok(())
    }
}
