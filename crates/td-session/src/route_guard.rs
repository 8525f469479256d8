use td_core::SessionState;

pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_LANDING_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingReason {
    /// Identity known, profile still on its way
    Profile,
    Authentication,
}

impl LoadingReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Profile => "Loading profile...",
            Self::Authentication => "Checking authentication...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Loading { reason: LoadingReason },
    /// Send the visitor to `to`, remembering where they were headed.
    Redirect { to: String, from: String },
}

/// Gate for pages that need a signed-in user.
pub struct RouteGuard;

impl RouteGuard {
    pub fn check(state: &SessionState, requested_path: &str) -> RouteDecision {
        if state.loading {
            let reason = if state.identity.is_some() {
                LoadingReason::Profile
            } else {
                LoadingReason::Authentication
            };
            return RouteDecision::Loading { reason };
        }

        if state.identity.is_none() {
            return RouteDecision::Redirect {
                to: String::from(LOGIN_PATH),
                from: requested_path.to_string(),
            };
        }

        RouteDecision::Allow
    }

    /// Where to go after a successful sign-in.
    pub fn post_login_destination(from: Option<&str>) -> String {
        from.filter(|path| !path.trim().is_empty())
            .unwrap_or(DEFAULT_LANDING_PATH)
            .to_string()
    }
}
