//! External command checker - runs a program per check
//!
//! The program receives `{"kind": ..., "payload": ...}` as JSON on stdin and
//! must print a [`CheckOutcome`] as JSON on stdout. A non-zero exit status or
//! unparseable output is treated as a transport failure.

use super::{CheckOutcome, Checker, CheckerError};
use crate::core::{ApplicationPayload, StepKind};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Checker backed by an external program
#[derive(Debug, Clone)]
pub struct CommandChecker {
    /// Path to the executable
    program: String,

    /// Extra arguments passed before the step kind
    args: Vec<String>,
}

impl CommandChecker {
    /// Create a checker from a command line (`["program", "arg", ...]`)
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a configured argv, `None` when it is empty
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Checker for CommandChecker {
    async fn check(&self, kind: &StepKind, payload: &ApplicationPayload) -> Result<CheckOutcome, CheckerError> {
        let input = serde_json::json!({ "kind": kind, "payload": payload }).to_string();
        debug!("Spawning checker {} for step {}", self.program, kind);

        // kill_on_drop: the engine's timeout drops this future
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(kind.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CheckerError::Transport(format!("Failed to spawn {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .map_err(|e| CheckerError::Transport(format!("Failed to write to {}: {}", self.program, e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| CheckerError::Transport(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            warn!("{} exited with code {}: {}", self.program, exit_code, stderr.trim());
            return Err(CheckerError::Transport(format!(
                "{} exited with code {}: {}",
                self.program,
                exit_code,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| CheckerError::Transport(format!("Invalid output from {}: {}", self.program, e)))
    }
}
