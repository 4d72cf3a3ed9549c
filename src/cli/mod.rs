//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{HistoryCommand, ServeCommand, StepsCommand, SubmitCommand};
use std::ffi::OsString;

/// Vendor onboarding verification service
#[derive(Debug, Parser, Clone)]
#[command(name = "vendor-verify")]
#[command(version = "0.1.0")]
#[command(about = "Verify vendor onboarding applications step by step", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to service configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeCommand),

    /// Verify one application in-process
    Submit(SubmitCommand),

    /// Show the configured verification steps
    Steps(StepsCommand),

    /// Show verification history
    History(HistoryCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
