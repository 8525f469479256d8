use crate::Commands;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "truedots")]
#[command(about = "TRUEdots account and session client")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}
