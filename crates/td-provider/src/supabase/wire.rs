use serde::Serialize;
use serde_json::Value;
use td_core::{ProfileUpdate, SignUpMetadata};
use uuid::Uuid;

// GoTrue and PostgREST disagree on where the human-readable message lives
const ERROR_MESSAGE_KEYS: [&str; 4] = ["msg", "error_description", "message", "error"];

#[derive(Serialize)]
pub(crate) struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct SignUpBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: &'a SignUpMetadata,
}

#[derive(Serialize)]
pub(crate) struct RefreshBody<'a> {
    pub refresh_token: &'a str,
}

#[derive(Serialize)]
pub(crate) struct ProfileUpsertBody<'a> {
    pub id: Uuid,
    #[serde(flatten)]
    pub update: &'a ProfileUpdate,
}

/// Pulls the message out of a provider error body, falling back to the raw
/// body text.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let found = ERROR_MESSAGE_KEYS
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str));
        if let Some(message) = found {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        String::from("Unknown error")
    } else {
        trimmed.to_string()
    }
}
