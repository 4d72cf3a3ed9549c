//! Verification state models

use crate::core::step::StepKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a single verification step
///
/// Valid transitions are `Pending -> InProgress -> {Completed, Failed}`,
/// plus `Pending -> Failed` when a step is skipped after a blocking failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    /// Step has not started
    Pending,
    /// Step's checker is currently running
    InProgress,
    /// Step passed
    Completed,
    /// Step failed, was unavailable, or was skipped
    Failed,
}

impl StepStatus {
    /// Check if step is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::InProgress => "in-progress",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate status of a whole application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverallStatus {
    /// No step has started
    Pending,
    /// Steps are still running or waiting
    InProgress,
    /// Every step passed
    Completed,
    /// Every blocking step passed, at least one advisory step failed
    CompletedWithWarnings,
    /// A blocking step failed
    Failed,
}

impl OverallStatus {
    /// Whether the run has reached a final outcome
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OverallStatus::Completed | OverallStatus::CompletedWithWarnings | OverallStatus::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Pending => "pending",
            OverallStatus::InProgress => "in-progress",
            OverallStatus::Completed => "completed",
            OverallStatus::CompletedWithWarnings => "completed-with-warnings",
            OverallStatus::Failed => "failed",
        }
    }

    /// Parse the wire representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OverallStatus::Pending),
            "in-progress" => Some(OverallStatus::InProgress),
            "completed" => Some(OverallStatus::Completed),
            "completed-with-warnings" => Some(OverallStatus::CompletedWithWarnings),
            "failed" => Some(OverallStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One run of a step definition within a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInstance {
    pub kind: StepKind,
    pub status: StepStatus,
    pub message: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl StepInstance {
    pub fn pending(kind: StepKind) -> Self {
        Self {
            kind,
            status: StepStatus::Pending,
            message: String::new(),
            started_at: None,
            finished_at: None,
        }
    }
}

/// Progress in percent (0.0 to 100.0) given per-step statuses.
///
/// A step counts once it is terminal, whether it passed or failed.
pub fn progress_percent<'a, I>(statuses: I) -> f64
where
    I: IntoIterator<Item = &'a StepStatus>,
{
    let mut total = 0usize;
    let mut terminal = 0usize;
    for status in statuses {
        total += 1;
        if status.is_terminal() {
            terminal += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }
    100.0 * terminal as f64 / total as f64
}
