pub mod error;
pub mod models;
pub mod validation;


pub use error::{CoreError, Result as CoreResult};
pub use models::auth_event::{AuthChangeEvent, AuthStateChange};
pub use models::auth_outcome::AuthOutcome;
pub use models::identity::Identity;
pub use models::profile::Profile;
pub use models::profile_update::ProfileUpdate;
pub use models::session::Session;
pub use models::session_state::{SessionState, SessionStatus};
pub use models::sign_in_request::SignInRequest;
pub use models::sign_up_request::{SignUpMetadata, SignUpRequest};
pub use validation::{MIN_PASSWORD_LENGTH, validate_email, validate_password};
