use crate::ProfileCommands;

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use td_core::SignUpRequest;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account and fill in its profile
    Signup(SignUpArgs),

    /// Sign in with email and password
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// End the current session and clear local auth data
    Signout,

    /// Show the current session state
    Whoami,

    /// Profile operations
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
}

#[derive(Args, Debug)]
pub struct SignUpArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    pub birthday: Option<NaiveDate>,
    #[arg(long)]
    pub gender: Option<String>,
    /// Comma-separated
    #[arg(long, value_delimiter = ',')]
    pub interested_in: Vec<String>,
    #[arg(long)]
    pub looking_for: Option<String>,
    /// Comma-separated
    #[arg(long, value_delimiter = ',')]
    pub interests: Vec<String>,
    /// Comma-separated photo URLs
    #[arg(long, value_delimiter = ',')]
    pub photos: Vec<String>,
}

impl SignUpArgs {
    pub fn into_request(self) -> SignUpRequest {
        SignUpRequest {
            email: self.email,
            password: self.password,
            phone: self.phone,
            full_name: self.full_name,
            birthday: self.birthday,
            gender: self.gender,
            interested_in: self.interested_in,
            looking_for: self.looking_for,
            interests: self.interests,
            photos: self.photos,
        }
    }
}
