//! td-session
//!
//! Client-side session lifecycle: the observable session state, the
//! operations that change it, and the provider events that drive it.

pub mod cleanup;
pub mod deadline;
pub mod error;
pub mod lifecycle;
pub mod route_guard;
pub mod session_manager;
pub mod session_settings;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupFailure, CleanupReport, CleanupStep, run_all};
pub use deadline::{DeadlineElapsed, with_deadline};
pub use error::{Result as SessionResult, SessionError};
pub use lifecycle::{Lifecycle, LivenessGuard};
pub use route_guard::{
    DEFAULT_LANDING_PATH, LOGIN_PATH, LoadingReason, RouteDecision, RouteGuard,
};
pub use session_manager::SessionManager;
pub use session_settings::SessionSettings;
