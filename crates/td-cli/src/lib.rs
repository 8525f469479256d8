//! td-cli
//!
//! Command-line front end for the TRUEdots session client. Every command
//! prints JSON on stdout; logs and errors go to stderr.

pub mod app;
pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod profile_commands;


pub use app::App;
pub use cli::Cli;
pub use commands::{Commands, SignUpArgs};
pub use error::{CliError, Result as CliResult};
pub use profile_commands::{ProfileCommands, ProfileUpdateArgs};
