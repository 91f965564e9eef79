pub mod reset;
pub mod start;

use clap::{Parser, Subcommand};

/// Personal photo library backend.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Starts the web server
    Start,
    /// Resets the index and removes sidecar files after confirmation
    Reset,
}
