use crate::{Identity, Profile};

use serde::Serialize;

/// Coarse lifecycle position derived from [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Nobody known yet and a check is in flight
    Unknown,
    Authenticated,
    Anonymous,
}

/// The identity/profile/loading triple observed by consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
    pub loading: bool,
}

impl SessionState {
    /// State before the initial restoration check has resolved.
    pub fn initial() -> Self {
        Self {
            identity: None,
            profile: None,
            loading: true,
        }
    }

    pub fn status(&self) -> SessionStatus {
        match (&self.identity, self.loading) {
            (Some(_), _) => SessionStatus::Authenticated,
            (None, true) => SessionStatus::Unknown,
            (None, false) => SessionStatus::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Drops identity and profile together.
    pub fn clear(&mut self) {
        self.identity = None;
        self.profile = None;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}
