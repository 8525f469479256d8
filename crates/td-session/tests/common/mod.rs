#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use td_core::{
    AuthChangeEvent, AuthStateChange, Identity, Profile, ProfileUpdate, Session, SessionState,
    SignUpMetadata,
};
use td_provider::{
    AuthSubscription, IdentityProvider, ProviderError, ProviderResult, SignUpResponse, StorageSet,
};
use td_session::{SessionManager, SessionSettings};
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

pub const PASSWORD: &str = "secret1";

/// What the scripted provider does when asked to sign out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutBehavior {
    Succeed,
    Fail,
    Hang,
}

#[derive(Debug, Clone)]
struct Account {
    identity: Identity,
    password: String,
}

struct FakeState {
    accounts: HashMap<String, Account>,
    profiles: HashMap<Uuid, Profile>,
    current: Option<Session>,
    sign_in_delays: HashMap<String, Duration>,
    sign_out_behavior: SignOutBehavior,
    auto_confirm: bool,
    reject_user_lookup: bool,
    user_lookup_delay: Option<Duration>,
    hang_session_lookup: bool,
    fail_profile_writes: bool,
    fail_enrichment: bool,
    observer: Option<watch::Receiver<SessionState>>,
    identities_seen_at_sign_in: Vec<Option<Uuid>>,
}

/// In-memory identity provider with scriptable latency and failures.
pub struct FakeProvider {
    state: Mutex<FakeState>,
    events: broadcast::Sender<AuthStateChange>,
    profile_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(FakeState {
                accounts: HashMap::new(),
                profiles: HashMap::new(),
                current: None,
                sign_in_delays: HashMap::new(),
                sign_out_behavior: SignOutBehavior::Succeed,
                auto_confirm: true,
                reject_user_lookup: false,
                user_lookup_delay: None,
                hang_session_lookup: false,
                fail_profile_writes: false,
                fail_enrichment: false,
                observer: None,
                identities_seen_at_sign_in: Vec::new(),
            }),
            events,
            profile_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
        }
    }

    /// Register an account with a provisioned profile row.
    pub fn with_account(self, email: &str) -> Self {
        let identity = Identity::new(Uuid::new_v4(), email);
        {
            let mut state = self.state.lock().unwrap();
            state.profiles.insert(
                identity.id,
                Profile::provisioned(identity.id, identity.email.clone()),
            );
            state.accounts.insert(
                email.to_string(),
                Account {
                    identity,
                    password: String::from(PASSWORD),
                },
            );
        }
        self
    }

    /// Start with `email` already signed in, as if restored from storage.
    pub fn with_session_for(self, email: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let identity = state.accounts[email].identity.clone();
            state.current = Some(session_for(identity));
        }
        self
    }

    pub fn with_sign_in_delay(self, email: &str, delay: Duration) -> Self {
        self.state
            .lock()
            .unwrap()
            .sign_in_delays
            .insert(email.to_string(), delay);
        self
    }

    pub fn with_sign_out_behavior(self, behavior: SignOutBehavior) -> Self {
        self.state.lock().unwrap().sign_out_behavior = behavior;
        self
    }

    pub fn requiring_confirmation(self) -> Self {
        self.state.lock().unwrap().auto_confirm = false;
        self
    }

    pub fn rejecting_user_lookup(self) -> Self {
        self.state.lock().unwrap().reject_user_lookup = true;
        self
    }

    pub fn with_user_lookup_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().user_lookup_delay = Some(delay);
        self
    }

    pub fn hanging_session_lookup(self) -> Self {
        self.state.lock().unwrap().hang_session_lookup = true;
        self
    }

    pub fn failing_profile_writes(self) -> Self {
        self.state.lock().unwrap().fail_profile_writes = true;
        self
    }

    pub fn failing_enrichment(self) -> Self {
        self.state.lock().unwrap().fail_enrichment = true;
        self
    }

    /// Record the manager's identity whenever credentials are exchanged.
    pub fn observe(&self, receiver: watch::Receiver<SessionState>) {
        self.state.lock().unwrap().observer = Some(receiver);
    }

    pub fn identities_seen_at_sign_in(&self) -> Vec<Option<Uuid>> {
        self.state.lock().unwrap().identities_seen_at_sign_in.clone()
    }

    pub fn user_id(&self, email: &str) -> Uuid {
        self.state.lock().unwrap().accounts[email].identity.id
    }

    pub fn current_user_id(&self) -> Option<Uuid> {
        let state = self.state.lock().unwrap();
        state.current.as_ref().map(|session| session.user.id)
    }

    pub fn stored_profile(&self, user_id: Uuid) -> Option<Profile> {
        self.state.lock().unwrap().profiles.get(&user_id).cloned()
    }

    /// Server-side change to a profile row.
    pub fn edit_profile(&self, user_id: Uuid, update: &ProfileUpdate) {
        if let Some(profile) = self.state.lock().unwrap().profiles.get_mut(&user_id) {
            profile.apply(update);
        }
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    /// Push an event as if it came from another tab.
    pub fn push(&self, event: AuthChangeEvent, session: Option<Session>) {
        let _ = self.events.send(AuthStateChange::new(event, session));
    }

    pub fn session_for(&self, email: &str) -> Session {
        let identity = self.state.lock().unwrap().accounts[email].identity.clone();
        session_for(identity)
    }

    fn rejection(status: u16, message: &str) -> ProviderError {
        ProviderError::api(status, message)
    }
}

pub fn session_for(identity: Identity) -> Session {
    Session {
        access_token: format!("access-{}", identity.id),
        refresh_token: format!("refresh-{}", identity.id),
        token_type: String::from("bearer"),
        expires_in: Some(3600),
        expires_at: None,
        user: identity,
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> ProviderResult<SignUpResponse> {
        let (identity, auto_confirm) = {
            let mut state = self.state.lock().unwrap();
            if state.accounts.contains_key(email) {
                return Err(Self::rejection(422, "User already registered"));
            }

            let mut identity = Identity::new(Uuid::new_v4(), email);
            identity.user_metadata = serde_json::to_value(metadata).unwrap();
            state.accounts.insert(
                email.to_string(),
                Account {
                    identity: identity.clone(),
                    password: password.to_string(),
                },
            );
            state.profiles.insert(
                identity.id,
                Profile::provisioned(identity.id, identity.email.clone()),
            );
            (identity, state.auto_confirm)
        };

        if !auto_confirm {
            return Ok(SignUpResponse {
                user: identity,
                session: None,
            });
        }

        let session = session_for(identity.clone());
        self.state.lock().unwrap().current = Some(session.clone());
        self.push(AuthChangeEvent::SignedIn, Some(session.clone()));

        Ok(SignUpResponse {
            user: identity,
            session: Some(session),
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ProviderResult<Session> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            let seen = state
                .observer
                .as_ref()
                .and_then(|observer| observer.borrow().identity.as_ref().map(|i| i.id));
            state.identities_seen_at_sign_in.push(seen);
            state.sign_in_delays.get(email).copied()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let session = {
            let mut state = self.state.lock().unwrap();
            let account = match state.accounts.get(email) {
                Some(account) if account.password == password => account.clone(),
                _ => return Err(Self::rejection(400, "Invalid login credentials")),
            };
            let session = session_for(account.identity);
            state.current = Some(session.clone());
            session
        };

        self.push(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.state.lock().unwrap().sign_out_behavior;

        if behavior == SignOutBehavior::Hang {
            std::future::pending::<()>().await;
        }

        self.state.lock().unwrap().current = None;
        self.push(AuthChangeEvent::SignedOut, None);

        match behavior {
            SignOutBehavior::Fail => Err(Self::rejection(500, "logout exploded")),
            _ => Ok(()),
        }
    }

    async fn get_session(&self) -> ProviderResult<Option<Session>> {
        let hang = self.state.lock().unwrap().hang_session_lookup;
        if hang {
            std::future::pending::<()>().await;
        }
        Ok(self.state.lock().unwrap().current.clone())
    }

    async fn get_user(&self) -> ProviderResult<Identity> {
        let delay = self.state.lock().unwrap().user_lookup_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        if state.reject_user_lookup {
            return Err(Self::rejection(401, "invalid JWT"));
        }
        state
            .current
            .as_ref()
            .map(|session| session.user.clone())
            .ok_or_else(ProviderError::no_session)
    }

    async fn refresh_session(&self) -> ProviderResult<Session> {
        let session = {
            let mut state = self.state.lock().unwrap();
            let Some(current) = state.current.clone() else {
                return Err(ProviderError::no_session());
            };
            let refreshed = Session {
                access_token: format!("{}-refreshed", current.access_token),
                ..current
            };
            state.current = Some(refreshed.clone());
            refreshed
        };

        self.push(AuthChangeEvent::TokenRefreshed, Some(session.clone()));
        Ok(session)
    }

    async fn set_session(&self, session: Option<Session>) -> ProviderResult<()> {
        self.state.lock().unwrap().current = session.clone();
        if let Some(session) = session {
            self.push(AuthChangeEvent::SignedIn, Some(session));
        }
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        AuthSubscription::new(self.events.subscribe())
    }

    async fn fetch_profile(&self, user_id: Uuid) -> ProviderResult<Option<Profile>> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().profiles.get(&user_id).cloned())
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> ProviderResult<()> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.fail_enrichment || state.fail_profile_writes {
            return Err(Self::rejection(500, "profile write failed"));
        }
        if let Some(profile) = state.profiles.get_mut(&user_id) {
            profile.apply(update);
        }
        Ok(())
    }

    async fn upsert_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> ProviderResult<Profile> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.fail_profile_writes {
            return Err(Self::rejection(403, "new row violates row-level security policy"));
        }
        let profile = state
            .profiles
            .entry(user_id)
            .or_insert_with(|| Profile::provisioned(user_id, None));
        profile.apply(update);
        Ok(profile.clone())
    }
}

pub fn test_settings() -> SessionSettings {
    SessionSettings::default()
}

pub fn auth_storage() -> StorageSet {
    let storage = StorageSet::in_memory();
    storage
        .persistent
        .set("supabase.auth.token", "{\"access_token\":\"stale\"}")
        .unwrap();
    storage.persistent.set("sb-project-auth-token", "{}").unwrap();
    storage.persistent.set("theme", "dark").unwrap();
    storage.session.set("auth-flow-state", "pkce").unwrap();
    storage.session.set("last-page", "/dashboard").unwrap();
    storage
}

/// Start a manager and wait for the initial restoration to settle.
pub async fn start(provider: Arc<FakeProvider>, storage: StorageSet) -> Arc<SessionManager> {
    let manager = SessionManager::init(provider, storage, test_settings());
    settle(&manager).await;
    manager
}

/// Let queued provider events drain, then wait for loading to clear.
pub async fn settle(manager: &SessionManager) -> SessionState {
    tokio::time::sleep(Duration::from_millis(50)).await;
    manager.wait_until_settled().await
}
