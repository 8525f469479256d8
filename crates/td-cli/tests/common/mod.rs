#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{Value, json};
use td_cli::App;
use td_provider::{FileStore, MemoryStore, StorageSet, SupabaseSettings};
use td_session::SessionSettings;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ANON_KEY: &str = "anon-test-key";
pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "secret1";

pub fn session_settings() -> SessionSettings {
    SessionSettings {
        settling_delay: Duration::ZERO,
        ..SessionSettings::default()
    }
}

/// App against the mock server with throwaway stores.
pub fn app(server: &MockServer) -> App {
    App::connect(
        SupabaseSettings::new(&server.uri(), ANON_KEY),
        StorageSet::in_memory(),
        session_settings(),
    )
    .unwrap()
}

/// App whose persistent store is the file at `store_path`.
pub fn app_with_file(server: &MockServer, store_path: &Path) -> App {
    let storage = StorageSet::new(
        Arc::new(FileStore::open(store_path).unwrap()),
        Arc::new(MemoryStore::new()),
    );
    App::connect(
        SupabaseSettings::new(&server.uri(), ANON_KEY),
        storage,
        session_settings(),
    )
    .unwrap()
}

pub fn user_json(id: Uuid) -> Value {
    json!({
        "id": id,
        "aud": "authenticated",
        "email": EMAIL,
        "created_at": "2024-03-01T10:00:00.000000Z",
        "user_metadata": { "full_name": "Ada Lovelace" }
    })
}

pub fn session_json(id: Uuid) -> Value {
    json!({
        "access_token": "access-token",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": Utc::now().timestamp() + 3600,
        "refresh_token": "refresh-token",
        "user": user_json(id)
    })
}

pub fn profile_json(id: Uuid, looking_for: &str) -> Value {
    json!({
        "id": id,
        "email": EMAIL,
        "full_name": "Ada Lovelace",
        "birthday": "1990-12-10",
        "gender": "female",
        "interested_in": ["male"],
        "looking_for": looking_for,
        "interests": ["chess"],
        "photos": [],
        "profile_completed": true,
        "created_at": "2024-03-01T10:00:00+00:00",
        "updated_at": "2024-03-02T10:00:00+00:00"
    })
}

pub async fn mock_password_grant(server: &MockServer, id: Uuid) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json(id)))
        .mount(server)
        .await;
}

pub async fn mock_profile_read(server: &MockServer, id: Uuid) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{id}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([profile_json(id, "relationship")])),
        )
        .mount(server)
        .await;
}
