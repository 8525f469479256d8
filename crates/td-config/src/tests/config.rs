use crate::tests::{EnvGuard, setup_config_dir, setup_provider_env};
use crate::{
    Config, DEFAULT_LOADING_CEILING_SECS, DEFAULT_SIGN_OUT_TIMEOUT_SECS, DEFAULT_STORAGE_KEY,
};

use std::time::Duration;

use googletest::assert_that;
use googletest::prelude::{anything, eq, ok};
use serial_test::serial;

// =========================================================================
// Happy Path Tests
// =========================================================================

#[test]
#[serial]
fn given_no_config_file_when_load_then_ok_with_defaults() {
    // Given
    let _env = setup_config_dir();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(
        config.session.sign_out_timeout_secs,
        eq(DEFAULT_SIGN_OUT_TIMEOUT_SECS)
    );
    assert_that!(
        config.session.loading_ceiling_secs,
        eq(DEFAULT_LOADING_CEILING_SECS)
    );
    assert_that!(config.provider.storage_key.as_str(), eq(DEFAULT_STORAGE_KEY));
    assert_that!(config.session.purge_patterns.len(), eq(2));
    assert!(config.provider.url.is_none());
}

#[test]
#[serial]
fn given_missing_config_dir_when_load_then_directory_created() {
    // Given
    let (temp, _guards) = setup_config_dir();
    let nested = temp.path().join("nested").join("dir");
    let _dir = EnvGuard::set("TD_CONFIG_DIR", nested.to_str().unwrap());

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    assert!(nested.exists());
}

#[test]
#[serial]
fn given_valid_toml_file_when_load_then_uses_toml_values() {
    // Given
    let (temp, _guards) = setup_config_dir();
    std::fs::write(
        temp.path().join("config.toml"),
        r#"
            [provider]
            url = "https://abcd.supabase.co"
            anon_key = "public-anon-key"
            profiles_table = "dating_profiles"

            [session]
            sign_out_timeout_secs = 3
            settling_delay_ms = 250
            purge_patterns = ["sb-"]
        "#,
    )
    .unwrap();

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.validate(), ok(anything()));
    assert_that!(config.provider.profiles_table.as_str(), eq("dating_profiles"));
    assert_that!(config.sign_out_timeout(), eq(Duration::from_secs(3)));
    assert_that!(config.settling_delay(), eq(Duration::from_millis(250)));
    assert_eq!(config.session.purge_patterns, vec!["sb-".to_string()]);
}

#[test]
#[serial]
fn given_env_overrides_when_load_then_env_wins_over_toml() {
    // Given
    let (temp, _guards) = setup_provider_env();
    std::fs::write(
        temp.path().join("config.toml"),
        r#"
            [session]
            loading_ceiling_secs = 8
        "#,
    )
    .unwrap();
    let _ceiling = EnvGuard::set("TD_SESSION_LOADING_CEILING_SECS", "2");
    let _patterns = EnvGuard::set("TD_SESSION_PURGE_PATTERNS", "supabase, sb-, ,token");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.loading_ceiling(), eq(Duration::from_secs(2)));
    assert_that!(
        config.provider.url.as_deref(),
        eq(Some("https://abcd.supabase.co"))
    );
    assert_eq!(
        config.session.purge_patterns,
        vec!["supabase".to_string(), "sb-".to_string(), "token".to_string()]
    );
}

#[test]
#[serial]
fn given_log_file_configured_when_resolving_path_then_under_config_dir() {
    // Given
    let (temp, _guards) = setup_config_dir();
    let _file = EnvGuard::set("TD_LOG_FILE", "truedots.log");

    // When
    let config = Config::load().unwrap();
    let path = config.log_file_path().unwrap().unwrap();

    // Then
    assert_eq!(path, temp.path().join("log").join("truedots.log"));
}

#[test]
#[serial]
fn given_unknown_log_level_when_load_then_falls_back_to_info() {
    // Given
    let (temp, _guards) = setup_config_dir();
    std::fs::write(
        temp.path().join("config.toml"),
        r#"
            [logging]
            level = "chatty"
        "#,
    )
    .unwrap();

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(*config.logging.level, eq(log::LevelFilter::Info));
}
