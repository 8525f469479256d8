use crate::{CoreError, CoreResult};

/// Minimum password length accepted by the provider's default policy.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[track_caller]
pub fn validate_email(email: &str) -> CoreResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(CoreError::validation("email", "Email is required"));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(CoreError::validation("email", "Email address is invalid"));
    };

    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(CoreError::validation("email", "Email address is invalid"));
    }

    Ok(())
}

#[track_caller]
pub fn validate_password(password: &str) -> CoreResult<()> {
    if password.is_empty() {
        return Err(CoreError::validation("password", "Password is required"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::validation(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    Ok(())
}
