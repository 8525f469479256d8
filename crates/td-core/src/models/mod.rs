pub mod auth_event;
pub mod auth_outcome;
pub mod identity;
pub mod profile;
pub mod profile_update;
pub mod session;
pub mod session_state;
pub mod sign_in_request;
pub mod sign_up_request;
