//! CLI command definitions

use clap::Args;

/// Run the HTTP API
#[derive(Debug, Args, Clone)]
pub struct ServeCommand {
    /// Address to listen on (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Keep snapshots in memory only
    #[arg(long)]
    pub no_history: bool,
}

/// Verify one application in-process
#[derive(Debug, Args, Clone)]
pub struct SubmitCommand {
    /// Path to application payload JSON file
    #[arg(short, long)]
    pub file: String,

    /// Print the final snapshot as JSON instead of live progress
    #[arg(long)]
    pub json: bool,

    /// Don't save the application to history
    #[arg(long)]
    pub no_history: bool,
}

/// Show the configured verification steps
#[derive(Debug, Args, Clone)]
pub struct StepsCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show verification history
#[derive(Debug, Args, Clone)]
pub struct HistoryCommand {
    /// Show a single application
    #[arg(long)]
    pub application_id: Option<String>,

    /// Number of recent applications to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
