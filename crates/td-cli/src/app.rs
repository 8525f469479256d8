use crate::{CliError, CliResult, Commands, ProfileCommands};

use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use td_config::Config;
use td_core::{AuthOutcome, Identity, Profile, SessionState, SessionStatus, SignInRequest};
use td_provider::{FileStore, MemoryStore, StorageSet, SupabaseProvider, SupabaseSettings};
use td_session::{SessionManager, SessionSettings};

const NO_USER_MESSAGE: &str = "No user logged in";

/// What every command prints about the session once it has finished.
#[derive(Debug, Serialize)]
struct SessionReport<'a> {
    status: SessionStatus,
    identity: Option<&'a Identity>,
    profile: Option<&'a Profile>,
}

impl<'a> From<&'a SessionState> for SessionReport<'a> {
    fn from(state: &'a SessionState) -> Self {
        Self {
            status: state.status(),
            identity: state.identity.as_ref(),
            profile: state.profile.as_ref(),
        }
    }
}

/// One CLI invocation's session: a provider, the local stores and the
/// manager driving them.
pub struct App {
    manager: Arc<SessionManager>,
}

impl App {
    /// Must be called inside a Tokio runtime.
    pub fn connect(
        provider: SupabaseSettings,
        storage: StorageSet,
        session: SessionSettings,
    ) -> CliResult<Self> {
        let provider = SupabaseProvider::new(provider, Arc::clone(&storage.persistent))?;
        let manager = SessionManager::init(Arc::new(provider), storage, session);
        Ok(Self { manager })
    }

    /// Persistent data lives in a file under the config directory; the
    /// session store only lasts as long as the process.
    pub fn from_config(config: &Config) -> CliResult<Self> {
        let provider = SupabaseSettings::from_config(&config.provider)?;

        let path = config.persistent_storage_path()?;
        debug!("Opening persistent storage at {}", path.display());
        let persistent = FileStore::open(path)?;

        let storage = StorageSet::new(Arc::new(persistent), Arc::new(MemoryStore::new()));
        Self::connect(provider, storage, SessionSettings::from_config(config))
    }

    pub fn manager(&self) -> &Arc<SessionManager> {
        &self.manager
    }

    /// Run one command after the persisted session has been restored.
    pub async fn run(&self, command: Commands) -> CliResult<Value> {
        self.manager.wait_until_settled().await;

        match command {
            Commands::Signup(args) => {
                let request = args.into_request();
                Self::check(self.manager.sign_up(&request).await)?;

                let state = self.manager.wait_until_settled().await;
                let mut output = Self::report(&state)?;
                output["confirmation_required"] = Value::Bool(!state.is_authenticated());
                Ok(output)
            }
            Commands::Signin { email, password } => {
                let request = SignInRequest::new(email, password);
                Self::check(self.manager.sign_in(&request).await)?;
                Self::report(&self.manager.wait_until_settled().await)
            }
            Commands::Signout => {
                self.manager.sign_out().await?;
                Self::report(&self.manager.state())
            }
            Commands::Whoami => Self::report(&self.manager.state()),
            Commands::Profile { action } => self.run_profile(action).await,
        }
    }

    async fn run_profile(&self, action: ProfileCommands) -> CliResult<Value> {
        match action {
            ProfileCommands::Show => {
                let state = self.signed_in_state()?;
                Ok(serde_json::to_value(&state.profile)?)
            }
            ProfileCommands::Update(args) => {
                let update = args.into_update();
                if update.is_empty() {
                    return Err(CliError::usage("no profile fields given"));
                }

                Self::check(self.manager.update_profile(update).await)?;
                info!("Profile updated");
                Ok(serde_json::to_value(&self.manager.state().profile)?)
            }
            ProfileCommands::Refresh => {
                self.signed_in_state()?;
                self.manager.refresh_profile().await;
                Ok(serde_json::to_value(&self.manager.state().profile)?)
            }
        }
    }

    /// Stop the manager's background work.
    pub fn shutdown(&self) {
        self.manager.dispose();
    }

    fn signed_in_state(&self) -> CliResult<SessionState> {
        let state = self.manager.state();
        if !state.is_authenticated() {
            return Err(CliError::failed(NO_USER_MESSAGE));
        }
        Ok(state)
    }

    fn check(outcome: AuthOutcome) -> CliResult<()> {
        match outcome {
            AuthOutcome::Success => Ok(()),
            AuthOutcome::Failure { message } => Err(CliError::failed(message)),
        }
    }

    fn report(state: &SessionState) -> CliResult<Value> {
        Ok(serde_json::to_value(SessionReport::from(state))?)
    }
}
