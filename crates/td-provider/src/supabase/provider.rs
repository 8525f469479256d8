use crate::supabase::wire::{
    PasswordCredentials, ProfileUpsertBody, RefreshBody, SignUpBody, error_message,
};
use crate::{
    AuthSubscription, IdentityProvider, KeyValueStore, ProviderError, ProviderResult,
    SignUpResponse, SupabaseSettings,
};

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use td_core::{
    AuthChangeEvent, AuthStateChange, Identity, Profile, ProfileUpdate, Session, SignUpMetadata,
};
use tokio::sync::broadcast;
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Identity provider backed by a Supabase project's REST endpoints.
///
/// The current session is cached in memory and mirrored as JSON under
/// `settings.storage_key` in the persistent store, so a new process picks
/// up where the last one left off.
pub struct SupabaseProvider {
    settings: SupabaseSettings,
    client: ReqwestClient,
    store: Arc<dyn KeyValueStore>,
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthStateChange>,
}

impl SupabaseProvider {
    pub fn new(settings: SupabaseSettings, store: Arc<dyn KeyValueStore>) -> ProviderResult<Self> {
        if settings.base_url.is_empty() {
            return Err(ProviderError::config("provider url cannot be empty"));
        }
        if settings.anon_key.is_empty() {
            return Err(ProviderError::config("provider anon key cannot be empty"));
        }

        let client = ReqwestClient::builder()
            .timeout(settings.request_timeout)
            .build()?;

        let restored = Self::load_persisted(store.as_ref(), &settings.storage_key)?;
        if let Some(session) = &restored {
            info!("Restored persisted session for user {}", session.user.id);
        }

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            settings,
            client,
            store,
            current: RwLock::new(restored),
            events,
        })
    }

    pub fn settings(&self) -> &SupabaseSettings {
        &self.settings
    }

    /// Cached session without any refresh or network call.
    pub fn current_session(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn load_persisted(store: &dyn KeyValueStore, key: &str) -> ProviderResult<Option<Session>> {
        let Some(raw) = store.get(key)? else {
            return Ok(None);
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!("Discarding unreadable persisted session under '{key}': {e}");
                store.remove(key)?;
                Ok(None)
            }
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.settings.base_url, path)
    }

    fn profiles_url(&self, filter: &str) -> String {
        format!(
            "{}/rest/v1/{}{}",
            self.settings.base_url, self.settings.profiles_table, filter
        )
    }

    fn access_token(&self) -> Option<String> {
        self.current_session().map(|session| session.access_token)
    }

    /// Build a request carrying the project key and the caller's bearer
    /// token (the anon key when nobody is signed in).
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self
            .access_token()
            .unwrap_or_else(|| self.settings.anon_key.clone());

        self.client
            .request(method, url)
            .header("apikey", &self.settings.anon_key)
            .bearer_auth(bearer)
    }

    /// Send and return the body text; non-2xx statuses become `Api` errors.
    async fn send(&self, req: RequestBuilder) -> ProviderResult<String> {
        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::api(status.as_u16(), error_message(&body)));
        }

        Ok(body)
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> ProviderResult<T> {
        let body = self.send(req).await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn store_session(&self, session: &Session) -> ProviderResult<()> {
        let json = serde_json::to_string(session)?;
        self.store.set(&self.settings.storage_key, &json)?;

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn drop_session(&self) -> ProviderResult<()> {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.store.remove(&self.settings.storage_key)?;
        Ok(())
    }

    fn emit(&self, event: AuthChangeEvent, session: Option<Session>) {
        debug!("Auth event {event}");
        // No subscribers is fine
        let _ = self.events.send(AuthStateChange::new(event, session));
    }

    fn parse_session(value: Value) -> ProviderResult<Session> {
        let session: Session = serde_json::from_value(value)?;
        Ok(session.with_computed_expiry())
    }
}

#[async_trait]
impl IdentityProvider for SupabaseProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> ProviderResult<SignUpResponse> {
        let body = SignUpBody {
            email,
            password,
            data: metadata,
        };
        let req = self
            .request(Method::POST, &self.auth_url("/signup"))
            .json(&body);
        let value: Value = self.execute(req).await?;

        if value.get("access_token").is_some() {
            let session = Self::parse_session(value)?;
            self.store_session(&session)?;
            info!("Registered and signed in user {}", session.user.id);
            self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));

            return Ok(SignUpResponse {
                user: session.user.clone(),
                session: Some(session),
            });
        }

        // Confirmation pending: some deployments wrap the user, some don't
        let user: Identity = match value.get("user") {
            Some(user) if user.is_object() => serde_json::from_value(user.clone())?,
            _ => serde_json::from_value(value)?,
        };
        info!("Registered user {} (confirmation pending)", user.id);

        Ok(SignUpResponse {
            user,
            session: None,
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ProviderResult<Session> {
        let body = PasswordCredentials { email, password };
        let req = self
            .request(Method::POST, &self.auth_url("/token?grant_type=password"))
            .json(&body);
        let value: Value = self.execute(req).await?;

        let session = Self::parse_session(value)?;
        self.store_session(&session)?;
        info!("Signed in user {}", session.user.id);
        self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));

        Ok(session)
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        let result = match self.access_token() {
            Some(_) => {
                let req = self.request(Method::POST, &self.auth_url("/logout"));
                self.send(req).await.map(|_| ())
            }
            None => Ok(()),
        };

        if let Err(e) = self.drop_session() {
            warn!("Failed to remove persisted session: {e}");
        }
        self.emit(AuthChangeEvent::SignedOut, None);

        match result {
            Err(ProviderError::Api { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::NOT_FOUND.as_u16() =>
            {
                debug!("Session already gone at the provider (status {status})");
                Ok(())
            }
            other => other,
        }
    }

    async fn get_session(&self) -> ProviderResult<Option<Session>> {
        match self.current_session() {
            Some(session) if session.is_expired() => {
                debug!("Cached session expired, refreshing");
                self.refresh_session().await.map(Some)
            }
            other => Ok(other),
        }
    }

    async fn get_user(&self) -> ProviderResult<Identity> {
        if self.access_token().is_none() {
            return Err(ProviderError::no_session());
        }

        let req = self.request(Method::GET, &self.auth_url("/user"));
        self.execute(req).await
    }

    async fn refresh_session(&self) -> ProviderResult<Session> {
        let refresh_token = self
            .current_session()
            .map(|session| session.refresh_token)
            .ok_or_else(ProviderError::no_session)?;

        let body = RefreshBody {
            refresh_token: &refresh_token,
        };
        let req = self
            .request(
                Method::POST,
                &self.auth_url("/token?grant_type=refresh_token"),
            )
            .json(&body);
        let value: Value = self.execute(req).await?;

        let session = Self::parse_session(value)?;
        self.store_session(&session)?;
        self.emit(AuthChangeEvent::TokenRefreshed, Some(session.clone()));

        Ok(session)
    }

    async fn set_session(&self, session: Option<Session>) -> ProviderResult<()> {
        match session {
            Some(session) => {
                self.store_session(&session)?;
                self.emit(AuthChangeEvent::SignedIn, Some(session));
            }
            None => self.drop_session()?,
        }
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        AuthSubscription::new(self.events.subscribe())
    }

    async fn fetch_profile(&self, user_id: Uuid) -> ProviderResult<Option<Profile>> {
        let url = self.profiles_url(&format!("?id=eq.{user_id}&select=*"));
        let req = self.request(Method::GET, &url);
        let rows: Vec<Profile> = self.execute(req).await?;

        Ok(rows.into_iter().next())
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> ProviderResult<()> {
        let url = self.profiles_url(&format!("?id=eq.{user_id}"));
        let req = self
            .request(Method::PATCH, &url)
            .header("Prefer", "return=minimal")
            .json(update);

        self.send(req).await.map(|_| ())
    }

    async fn upsert_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> ProviderResult<Profile> {
        let body = ProfileUpsertBody {
            id: user_id,
            update,
        };
        let req = self
            .request(Method::POST, &self.profiles_url(""))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&body);
        let rows: Vec<Profile> = self.execute(req).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| ProviderError::empty_response("profile upsert"))
    }
}
