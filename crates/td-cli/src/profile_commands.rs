use chrono::NaiveDate;
use clap::{Args, Subcommand};
use td_core::ProfileUpdate;

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Print the signed-in user's profile
    Show,

    /// Change profile fields; only the flags given are sent
    Update(ProfileUpdateArgs),

    /// Re-read the profile from the provider
    Refresh,
}

#[derive(Args, Debug, Default)]
pub struct ProfileUpdateArgs {
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub birthday: Option<NaiveDate>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long, value_delimiter = ',')]
    pub interested_in: Option<Vec<String>>,
    #[arg(long)]
    pub looking_for: Option<String>,
    #[arg(long, value_delimiter = ',')]
    pub interests: Option<Vec<String>>,
    #[arg(long, value_delimiter = ',')]
    pub photos: Option<Vec<String>>,
    #[arg(long)]
    pub profile_completed: Option<bool>,
}

impl ProfileUpdateArgs {
    pub fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            phone: self.phone,
            full_name: self.full_name,
            birthday: self.birthday,
            gender: self.gender,
            interested_in: self.interested_in,
            looking_for: self.looking_for,
            interests: self.interests,
            photos: self.photos,
            profile_completed: self.profile_completed,
            ..Default::default()
        }
    }
}
