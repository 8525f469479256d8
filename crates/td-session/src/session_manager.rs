use crate::{
    CleanupReport, CleanupStep, Lifecycle, LivenessGuard, SessionError, SessionResult,
    SessionSettings, run_all, with_deadline,
};

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use log::{debug, error, info, warn};
use td_core::{
    AuthChangeEvent, AuthOutcome, AuthStateChange, Profile, ProfileUpdate, Session, SessionState,
    SignInRequest, SignUpRequest,
};
use td_provider::{AuthSubscription, IdentityProvider, ProviderError, StorageSet};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

const NO_USER_MESSAGE: &str = "No user logged in";
const PROFILE_UPDATE_FAILED_MESSAGE: &str = "Failed to update profile";

/// Holds the signed-in identity, its profile and the loading flag, and
/// keeps them in step with the identity provider.
///
/// State lives in a `watch` channel; every change is a single
/// `send_modify`, so a reader never sees half of a transition.
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    storage: StorageSet,
    settings: SessionSettings,
    state: watch::Sender<SessionState>,
    // Bumped by every sign-in, sign-up and sign-out; a call only commits
    // while its number is still the latest
    generation: AtomicU64,
    // Explicit sign-ins / sign-ups in flight; they commit their own result
    in_flight: AtomicUsize,
    // Set by the first write that leaves loading off; the ceiling then stands down
    settled: AtomicBool,
    lifecycle: Lifecycle,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Marks an explicit operation as in flight until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SessionManager {
    /// Create the manager and start its background work: the provider
    /// event loop, the loading ceiling and the restoration of any
    /// persisted session. Must be called inside a Tokio runtime.
    pub fn init(
        provider: Arc<dyn IdentityProvider>,
        storage: StorageSet,
        settings: SessionSettings,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState::initial());
        let subscription = provider.subscribe();

        let manager = Arc::new(Self {
            provider,
            storage,
            settings,
            state,
            generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            settled: AtomicBool::new(false),
            lifecycle: Lifecycle::new(),
            tasks: Mutex::new(Vec::new()),
        });

        let handles = vec![
            Self::spawn_event_loop(&manager, subscription),
            Self::spawn_loading_ceiling(&manager),
            Self::spawn_restore(&manager),
        ];
        manager
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(handles);

        info!("Session manager started");
        manager
    }

    /// Stop all background work. No continuation writes state afterwards.
    pub fn dispose(&self) {
        self.lifecycle.teardown();

        let handles = {
            let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *tasks)
        };
        for handle in handles {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.is_alive()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Resolves with the first state whose `loading` flag is false.
    pub async fn wait_until_settled(&self) -> SessionState {
        let mut receiver = self.state.subscribe();
        match receiver.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Register a new account and enrich its profile row.
    pub async fn sign_up(&self, request: &SignUpRequest) -> AuthOutcome {
        if let Err(e) = request.validate() {
            return AuthOutcome::failure(e.user_message());
        }

        let guard = self.lifecycle.guard();
        let _in_flight = InFlight::enter(&self.in_flight);
        let generation = self.next_generation();
        self.write(&guard, |state| state.loading = true);

        let response = match self
            .provider
            .sign_up(&request.email, &request.password, &request.metadata())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.finish_loading(&guard, generation);
                return Self::failure_from("Sign-up", e);
            }
        };

        // Give the provider time to provision the profile row
        tokio::time::sleep(self.settings.settling_delay).await;

        let user_id = response.user.id;
        let enrichment = request.profile_update().touched();
        if let Err(e) = self.provider.update_profile(user_id, &enrichment).await {
            warn!("Profile enrichment after sign-up failed for {user_id}: {e}");
        }

        let profile = self.load_profile(user_id).await;

        if !self.is_current(generation) {
            debug!("Sign-up for {user_id} superseded, not committing");
            return AuthOutcome::Success;
        }

        match response.session {
            Some(session) => {
                info!("Signed up and signed in user {user_id}");
                self.write(&guard, |state| {
                    state.identity = Some(session.user);
                    state.profile = profile;
                    state.loading = false;
                });
            }
            None => {
                info!("Signed up user {user_id}, awaiting email confirmation");
                self.write(&guard, |state| state.loading = false);
            }
        }

        AuthOutcome::Success
    }

    /// Exchange credentials for a session, ending any existing one first.
    pub async fn sign_in(&self, request: &SignInRequest) -> AuthOutcome {
        if let Err(e) = request.validate() {
            return AuthOutcome::failure(e.user_message());
        }

        let guard = self.lifecycle.guard();
        let _in_flight = InFlight::enter(&self.in_flight);
        let generation = self.next_generation();
        self.write(&guard, |state| state.loading = true);

        match self.provider.get_session().await {
            Ok(Some(stale)) => {
                info!("Ending existing session for {} before sign-in", stale.user.id);
                self.write(&guard, |state| {
                    state.identity = None;
                    state.profile = None;
                });
                self.end_provider_session("pre-sign-in sign-out").await;
            }
            Ok(None) => {}
            Err(e) => debug!("Could not read existing session before sign-in: {e}"),
        }

        let session = match self
            .provider
            .sign_in_with_password(&request.email, &request.password)
            .await
        {
            Ok(session) => session,
            Err(e) => {
                self.finish_loading(&guard, generation);
                return Self::failure_from("Sign-in", e);
            }
        };

        let user_id = session.user.id;
        let profile = self.load_profile(user_id).await;

        if !self.is_current(generation) {
            debug!("Sign-in for {user_id} superseded, not committing");
            return AuthOutcome::Success;
        }

        info!("Signed in user {user_id}");
        self.write(&guard, |state| {
            state.identity = Some(session.user);
            state.profile = profile;
            state.loading = false;
        });

        AuthOutcome::Success
    }

    /// End the session. Local state is cleared whatever the provider does;
    /// only a provider failure (not a timeout) is reported back.
    pub async fn sign_out(&self) -> SessionResult<()> {
        let guard = self.lifecycle.guard();
        self.write(&guard, |state| state.loading = false);
        self.next_generation();

        let result = with_deadline(
            self.settings.sign_out_timeout,
            "Provider sign-out",
            self.provider.sign_out(),
        )
        .await;

        self.write(&guard, |state| {
            state.identity = None;
            state.profile = None;
            state.loading = false;
        });

        let report = self.purge_local_session().await;
        if !report.is_clean() {
            debug!("{} sign-out cleanup step(s) failed", report.failures.len());
        }

        match result {
            Ok(Ok(())) => {
                info!("Signed out");
                Ok(())
            }
            Ok(Err(e)) => {
                error!("Provider sign-out failed: {e}");
                Err(SessionError::sign_out(e))
            }
            Err(elapsed) => {
                warn!("{elapsed}; local session cleared anyway");
                Ok(())
            }
        }
    }

    /// Merge `update` into the signed-in user's profile row.
    pub async fn update_profile(&self, update: ProfileUpdate) -> AuthOutcome {
        let Some(user_id) = self.current_user_id() else {
            return AuthOutcome::failure(NO_USER_MESSAGE);
        };

        let guard = self.lifecycle.guard();
        match self.provider.upsert_profile(user_id, &update.touched()).await {
            Ok(profile) => {
                self.commit_profile(&guard, user_id, profile);
                AuthOutcome::Success
            }
            Err(e) => {
                error!("Profile update failed for {user_id}: {e}");
                AuthOutcome::failure(PROFILE_UPDATE_FAILED_MESSAGE)
            }
        }
    }

    /// Re-read the signed-in user's profile row.
    pub async fn refresh_profile(&self) {
        let Some(user_id) = self.current_user_id() else {
            return;
        };

        let guard = self.lifecycle.guard();
        if let Some(profile) = self.load_profile(user_id).await {
            self.commit_profile(&guard, user_id, profile);
        }
    }

    // =========================================================================
    // Background work
    // =========================================================================

    fn spawn_event_loop(manager: &Arc<Self>, mut subscription: AuthSubscription) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(manager);
        let mut guard = manager.lifecycle.guard();

        tokio::spawn(async move {
            loop {
                let change = tokio::select! {
                    _ = guard.torn_down() => break,
                    change = subscription.next() => change,
                };
                let Some(change) = change else {
                    break;
                };
                let Some(manager) = weak.upgrade() else {
                    break;
                };
                manager.handle_event(&guard, change).await;
            }
            subscription.unsubscribe();
            debug!("Auth event loop stopped");
        })
    }

    fn spawn_loading_ceiling(manager: &Arc<Self>) -> JoinHandle<()> {
        let weak = Arc::downgrade(manager);
        let guard = manager.lifecycle.guard();
        let ceiling = manager.settings.loading_ceiling;

        tokio::spawn(async move {
            tokio::time::sleep(ceiling).await;
            let Some(manager) = weak.upgrade() else {
                return;
            };
            if manager.settled.load(Ordering::SeqCst) {
                debug!("Loading resolved before the {ceiling:?} ceiling");
                return;
            }
            if manager.state.borrow().loading {
                warn!("Still loading after {ceiling:?}, forcing loading off");
                manager.write(&guard, |state| state.loading = false);
            }
        })
    }

    fn spawn_restore(manager: &Arc<Self>) -> JoinHandle<()> {
        let weak = Arc::downgrade(manager);
        let guard = manager.lifecycle.guard();
        let generation = manager.generation.load(Ordering::SeqCst);

        tokio::spawn(async move {
            if let Some(manager) = weak.upgrade() {
                manager.restore(&guard, generation).await;
            }
        })
    }

    /// Validate any persisted session and settle into Authenticated or
    /// Anonymous.
    async fn restore(&self, guard: &LivenessGuard, generation: u64) {
        let session = match self.provider.get_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Could not restore session: {e}");
                None
            }
        };

        if !self.is_current(generation) {
            debug!("Session restore superseded before validation");
            return;
        }

        let Some(session) = session else {
            info!("No persisted session, starting anonymous");
            self.write(guard, |state| state.loading = false);
            return;
        };

        match self.provider.get_user().await {
            Ok(identity) => {
                let profile = self.load_profile(identity.id).await;
                if !self.is_current(generation) {
                    debug!("Session restore superseded, not committing");
                    return;
                }
                info!("Restored session for user {}", identity.id);
                self.write(guard, |state| {
                    state.identity = Some(identity);
                    state.profile = profile;
                    state.loading = false;
                });
            }
            Err(e) => {
                // A newer sign-in or sign-out owns the provider session now
                if !self.is_current(generation) {
                    debug!(
                        "Persisted session for {} failed validation after being superseded: {e}",
                        session.user.id
                    );
                    return;
                }
                warn!(
                    "Persisted session for {} failed validation, signing out: {e}",
                    session.user.id
                );
                self.end_provider_session("restore sign-out").await;
                if self.is_current(generation) {
                    self.write(guard, |state| {
                        state.identity = None;
                        state.profile = None;
                        state.loading = false;
                    });
                }
            }
        }
    }

    async fn handle_event(&self, guard: &LivenessGuard, change: AuthStateChange) {
        if !guard.is_alive() {
            return;
        }
        debug!("Handling auth event {}", change.event);

        match change.event {
            AuthChangeEvent::SignedIn => {
                let Some(session) = change.session else {
                    warn!("SIGNED_IN event without a session, ignoring");
                    return;
                };
                self.handle_signed_in(guard, session).await;
            }
            AuthChangeEvent::SignedOut => self.handle_signed_out(guard).await,
            AuthChangeEvent::TokenRefreshed => {
                if let Some(session) = change.session {
                    self.write(guard, |state| {
                        let held = state.identity.as_ref().map(|identity| identity.id);
                        if held == Some(session.user.id) {
                            state.identity = Some(session.user);
                        }
                    });
                }
            }
            AuthChangeEvent::InitialSession
            | AuthChangeEvent::UserUpdated
            | AuthChangeEvent::PasswordRecovery => match change.session {
                Some(session) => {
                    let profile = self.load_profile(session.user.id).await;
                    self.write(guard, |state| {
                        state.identity = Some(session.user);
                        state.profile = profile;
                        state.loading = false;
                    });
                }
                None => {
                    self.write(guard, |state| {
                        state.identity = None;
                        state.profile = None;
                        state.loading = false;
                    });
                }
            },
        }
    }

    async fn handle_signed_out(&self, guard: &LivenessGuard) {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            debug!("SIGNED_OUT left to the sign-in in flight");
            return;
        }
        if let Ok(Some(current)) = self.provider.get_session().await {
            debug!("SIGNED_OUT superseded by a session for {}", current.user.id);
            return;
        }

        self.write(guard, |state| {
            state.identity = None;
            state.profile = None;
            state.loading = false;
        });

        if let Err(e) = self.provider.refresh_session().await {
            debug!("Refresh after sign-out failed as expected: {e}");
        }
    }

    async fn handle_signed_in(&self, guard: &LivenessGuard, session: Session) {
        let user_id = session.user.id;

        if self.in_flight.load(Ordering::SeqCst) > 0 {
            debug!("SIGNED_IN for {user_id} left to the sign-in in flight");
            return;
        }
        if self.current_user_id() == Some(user_id) && !self.state.borrow().loading {
            debug!("SIGNED_IN for {user_id} already committed");
            return;
        }
        if self.is_superseded(&session).await {
            debug!("SIGNED_IN for {user_id} superseded, ignoring");
            return;
        }

        self.write(guard, |state| {
            state.loading = true;
            state.identity = Some(session.user.clone());
        });

        let profile = self.load_profile(user_id).await;
        if self.is_superseded(&session).await {
            debug!("Profile for {user_id} arrived after the session changed, dropping it");
            return;
        }

        self.write(guard, |state| {
            state.profile = profile;
            state.loading = false;
        });
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Apply `update` as one state change, unless torn down.
    fn write(&self, guard: &LivenessGuard, update: impl FnOnce(&mut SessionState)) -> bool {
        if !guard.is_alive() {
            debug!("Session manager torn down, dropping state write");
            return false;
        }
        self.state.send_modify(update);
        if !self.state.borrow().loading {
            self.settled.store(true, Ordering::SeqCst);
        }
        true
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn finish_loading(&self, guard: &LivenessGuard, generation: u64) {
        if self.is_current(generation) {
            self.write(guard, |state| state.loading = false);
        }
    }

    fn current_user_id(&self) -> Option<Uuid> {
        self.state.borrow().identity.as_ref().map(|identity| identity.id)
    }

    /// Store `profile` only if it still belongs to the signed-in user.
    fn commit_profile(&self, guard: &LivenessGuard, user_id: Uuid, profile: Profile) {
        self.write(guard, |state| {
            if state.identity.as_ref().map(|identity| identity.id) == Some(user_id) {
                state.profile = Some(profile);
            }
        });
    }

    /// The provider no longer holds the session `session` came from.
    async fn is_superseded(&self, session: &Session) -> bool {
        match self.provider.get_session().await {
            Ok(Some(current)) => current.user.id != session.user.id,
            Ok(None) => true,
            Err(e) => {
                debug!("Could not read current session: {e}");
                false
            }
        }
    }

    /// Profile fetch failures are logged and read as "no profile".
    async fn load_profile(&self, user_id: Uuid) -> Option<Profile> {
        match self.provider.fetch_profile(user_id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                debug!("No profile row for {user_id}");
                None
            }
            Err(e) => {
                warn!("Failed to fetch profile for {user_id}: {e}");
                None
            }
        }
    }

    /// Provider sign-out under the deadline, failures logged only.
    async fn end_provider_session(&self, operation_name: &str) {
        let result = with_deadline(
            self.settings.sign_out_timeout,
            operation_name,
            self.provider.sign_out(),
        )
        .await;

        if let Ok(Err(e)) = result {
            warn!("{operation_name} failed: {e}");
        }
    }

    async fn purge_local_session(&self) -> CleanupReport {
        let patterns = self.settings.purge_patterns.as_slice();

        run_all(vec![
            CleanupStep::new("refresh session", async {
                if let Err(e) = self.provider.refresh_session().await {
                    debug!("Refresh after sign-out failed as expected: {e}");
                }
                Ok::<(), ProviderError>(())
            }),
            CleanupStep::new("purge persistent storage", async move {
                let removed = self.storage.persistent.purge_matching(patterns)?;
                debug!("Removed {} persistent key(s): {removed:?}", removed.len());
                Ok::<(), td_provider::StorageError>(())
            }),
            CleanupStep::new("purge session storage", async move {
                let removed = self.storage.session.purge_matching(patterns)?;
                debug!("Removed {} session key(s): {removed:?}", removed.len());
                Ok::<(), td_provider::StorageError>(())
            }),
            CleanupStep::new("clear provider session", self.provider.set_session(None)),
        ])
        .await
    }

    fn failure_from(operation: &str, err: ProviderError) -> AuthOutcome {
        if err.is_rejection() {
            warn!("{operation} rejected by provider: {err}");
        } else {
            error!("{operation} failed: {err}");
        }
        AuthOutcome::failure(err.user_message())
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.dispose();
    }
}
