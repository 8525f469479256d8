mod config;

use std::env;

use tempfile::TempDir;

/// RAII guard for environment variables - automatically restores on drop
pub(crate) struct EnvGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        unsafe {
            let original = env::var(key).ok();
            env::set_var(key, value);
            Self { key, original }
        }
    }

    pub(crate) fn remove(key: &'static str) -> Self {
        unsafe {
            let original = env::var(key).ok();
            env::remove_var(key);
            Self { key, original }
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            match &self.original {
                Some(val) => env::set_var(self.key, val),
                None => env::remove_var(self.key),
            }
        }
    }
}

/// Temp config dir with TD_CONFIG_DIR pointed at it and no provider env leaking in
pub(crate) fn setup_config_dir() -> (TempDir, Vec<EnvGuard>) {
    let temp = TempDir::new().unwrap();
    let guards = vec![
        EnvGuard::set("TD_CONFIG_DIR", temp.path().to_str().unwrap()),
        EnvGuard::remove("TD_PROVIDER_URL"),
        EnvGuard::remove("TD_PROVIDER_ANON_KEY"),
    ];
    (temp, guards)
}

/// Same as `setup_config_dir` but with the required provider settings present.
/// The guards from `setup_config_dir` already restore both variables.
pub(crate) fn setup_provider_env() -> (TempDir, Vec<EnvGuard>) {
    let (temp, guards) = setup_config_dir();
    unsafe {
        env::set_var("TD_PROVIDER_URL", "https://abcd.supabase.co");
        env::set_var("TD_PROVIDER_ANON_KEY", "public-anon-key");
    }
    (temp, guards)
}
