use crate::ProfileUpdate;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Application-owned user record from the `profiles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub interested_in: Vec<String>,
    #[serde(default)]
    pub looking_for: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub interests: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub photos: Vec<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub profile_completed: bool,

    // Audit
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Empty row as provisioned server-side right after registration.
    pub fn provisioned(id: Uuid, email: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            phone: None,
            full_name: None,
            birthday: None,
            gender: None,
            interested_in: Vec::new(),
            looking_for: None,
            interests: Vec::new(),
            photos: Vec::new(),
            profile_completed: false,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Merges the supplied fields; absent fields keep their current value.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(ref email) = update.email {
            self.email = Some(email.clone());
        }
        if let Some(ref phone) = update.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(ref full_name) = update.full_name {
            self.full_name = Some(full_name.clone());
        }
        if let Some(birthday) = update.birthday {
            self.birthday = Some(birthday);
        }
        if let Some(ref gender) = update.gender {
            self.gender = Some(gender.clone());
        }
        if let Some(ref interested_in) = update.interested_in {
            self.interested_in = interested_in.clone();
        }
        if let Some(ref looking_for) = update.looking_for {
            self.looking_for = Some(looking_for.clone());
        }
        if let Some(ref interests) = update.interests {
            self.interests = interests.clone();
        }
        if let Some(ref photos) = update.photos {
            self.photos = photos.clone();
        }
        if let Some(profile_completed) = update.profile_completed {
            self.profile_completed = profile_completed;
        }
        if let Some(updated_at) = update.updated_at {
            self.updated_at = Some(updated_at);
        }
    }
}

// Array and boolean columns come back as null on freshly provisioned rows
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
