use crate::{CoreResult, ProfileUpdate, validate_email, validate_password};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything the signup wizard collects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub interested_in: Vec<String>,
    #[serde(default)]
    pub looking_for: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// User metadata attached to the provider registration itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl SignUpRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    #[track_caller]
    pub fn validate(&self) -> CoreResult<()> {
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(())
    }

    pub fn metadata(&self) -> SignUpMetadata {
        SignUpMetadata {
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
        }
    }

    /// Profile enrichment written once registration has settled.
    pub fn profile_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            phone: self.phone.clone(),
            full_name: self.full_name.clone(),
            birthday: self.birthday,
            gender: self.gender.clone(),
            interested_in: Some(self.interested_in.clone()),
            looking_for: self.looking_for.clone(),
            interests: Some(self.interests.clone()),
            photos: Some(self.photos.clone()),
            profile_completed: Some(true),
            ..Default::default()
        }
    }
}
