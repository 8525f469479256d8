use crate::ProviderError;

use googletest::prelude::*;

#[test]
fn given_client_error_status_when_classified_then_is_rejection_with_provider_message() {
    let err = ProviderError::api(400, "Invalid login credentials");

    assert!(err.is_rejection());
    assert_that!(err.user_message(), eq("Invalid login credentials"));
}

#[test]
fn given_server_error_status_when_classified_then_message_is_generic() {
    let err = ProviderError::api(503, "upstream unavailable");

    assert!(!err.is_rejection());
    assert_that!(err.user_message(), eq("An unexpected error occurred"));
}

#[test]
fn given_missing_session_when_classified_then_message_is_generic() {
    let err = ProviderError::no_session();

    assert!(!err.is_rejection());
    assert_that!(err.user_message(), eq("An unexpected error occurred"));
}

#[test]
fn given_api_error_when_displayed_then_includes_status() {
    let err = ProviderError::api(422, "User already registered");

    let rendered = err.to_string();

    assert_that!(rendered, contains_substring("User already registered"));
    assert_that!(rendered, contains_substring("422"));
}
