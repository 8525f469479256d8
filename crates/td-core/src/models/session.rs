use crate::Identity;

use chrono::Utc;
use serde::{Deserialize, Serialize};

// Treat tokens this close to expiry as already expired
const EXPIRY_MARGIN_SECS: i64 = 10;

/// Provider session: tokens plus the identity they were issued for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: Identity,
}

fn default_token_type() -> String {
    String::from("bearer")
}

impl Session {
    /// Fills in `expires_at` from `expires_in` when the provider omitted it.
    pub fn with_computed_expiry(mut self) -> Self {
        if self.expires_at.is_none()
            && let Some(expires_in) = self.expires_in
        {
            self.expires_at = Some(Utc::now().timestamp().saturating_add(expires_in));
        }
        self
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                Utc::now().timestamp().saturating_add(EXPIRY_MARGIN_SECS) >= expires_at
            }
            None => false,
        }
    }
}
