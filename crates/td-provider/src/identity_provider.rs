use crate::ProviderResult;

use async_trait::async_trait;
use log::warn;
use td_core::{AuthStateChange, Identity, Profile, ProfileUpdate, Session, SignUpMetadata};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

/// What registration produced. `session` is `None` while the provider is
/// waiting for the address to be confirmed.
#[derive(Debug, Clone)]
pub struct SignUpResponse {
    pub user: Identity,
    pub session: Option<Session>,
}

/// Handle on the provider's auth-state-change stream.
///
/// Dropping the handle (or calling [`AuthSubscription::unsubscribe`]) ends
/// the subscription.
pub struct AuthSubscription {
    receiver: broadcast::Receiver<AuthStateChange>,
}

impl AuthSubscription {
    pub fn new(receiver: broadcast::Receiver<AuthStateChange>) -> Self {
        Self { receiver }
    }

    /// Next change in arrival order, or `None` once the provider is gone.
    pub async fn next(&mut self) -> Option<AuthStateChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Some(change),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Auth subscription lagged, {skipped} events skipped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

/// External backend-as-a-service: credential exchange, session custody and
/// the row-level `profiles` table.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> ProviderResult<SignUpResponse>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ProviderResult<Session>;

    /// Ends the session at the provider and forgets it locally.
    async fn sign_out(&self) -> ProviderResult<()>;

    /// Locally held session, refreshed first when it has expired.
    async fn get_session(&self) -> ProviderResult<Option<Session>>;

    /// "Who am I" round trip that proves the held session is still valid.
    async fn get_user(&self) -> ProviderResult<Identity>;

    async fn refresh_session(&self) -> ProviderResult<Session>;

    /// Replaces the locally held session; `None` drops it without a
    /// network call.
    async fn set_session(&self, session: Option<Session>) -> ProviderResult<()>;

    fn subscribe(&self) -> AuthSubscription;

    async fn fetch_profile(&self, user_id: Uuid) -> ProviderResult<Option<Profile>>;

    /// Partial update of an existing row.
    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> ProviderResult<()>;

    /// Insert-or-merge; returns the stored row.
    async fn upsert_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> ProviderResult<Profile>;
}
