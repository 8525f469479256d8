#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use td_core::Session;
use td_provider::{KeyValueStore, MemoryStore, SupabaseProvider, SupabaseSettings};
use uuid::Uuid;
use wiremock::MockServer;

pub const ANON_KEY: &str = "anon-test-key";
pub const STORAGE_KEY: &str = "supabase.auth.token";

pub fn settings(server: &MockServer) -> SupabaseSettings {
    SupabaseSettings::new(&server.uri(), ANON_KEY)
}

/// Provider against the mock server with an empty in-memory persistent store.
pub fn provider(server: &MockServer) -> (SupabaseProvider, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let provider = SupabaseProvider::new(settings(server), store.clone()).unwrap();
    (provider, store)
}

/// Provider that starts with `session` already persisted.
pub fn provider_with_session(
    server: &MockServer,
    session: &Session,
) -> (SupabaseProvider, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store
        .set(STORAGE_KEY, &serde_json::to_string(session).unwrap())
        .unwrap();
    let provider = SupabaseProvider::new(settings(server), store.clone()).unwrap();
    (provider, store)
}

pub fn user_json(id: Uuid, email: &str) -> Value {
    json!({
        "id": id,
        "aud": "authenticated",
        "role": "authenticated",
        "email": email,
        "phone": "",
        "created_at": "2024-03-01T10:00:00.000000Z",
        "user_metadata": { "full_name": "Ada Lovelace" }
    })
}

pub fn session_json(id: Uuid, email: &str, access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": Utc::now().timestamp() + 3600,
        "refresh_token": format!("refresh-{access_token}"),
        "user": user_json(id, email)
    })
}

pub fn session(id: Uuid, email: &str, access_token: &str) -> Session {
    serde_json::from_value(session_json(id, email, access_token)).unwrap()
}

pub fn expired_session(id: Uuid, email: &str) -> Session {
    let mut session = session(id, email, "stale-token");
    session.expires_at = Some(Utc::now().timestamp() - 60);
    session
}

pub fn profile_json(id: Uuid) -> Value {
    json!({
        "id": id,
        "email": "ada@example.com",
        "phone": null,
        "full_name": "Ada Lovelace",
        "birthday": "1990-12-10",
        "gender": "female",
        "interested_in": ["male"],
        "looking_for": "relationship",
        "interests": null,
        "photos": [],
        "profile_completed": true,
        "created_at": "2024-03-01T10:00:00+00:00",
        "updated_at": "2024-03-02T10:00:00+00:00"
    })
}
