//! Point-in-time snapshots exchanged with clients

use crate::core::{
    state::{OverallStatus, StepStatus},
    step::StepKind,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One step as seen by a polling client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSnapshot {
    pub kind: StepKind,
    pub display_name: String,
    pub status: StepStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Immutable copy of an application's verification state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSnapshot {
    pub application_id: Uuid,
    pub steps: Vec<StepSnapshot>,
    pub overall_status: OverallStatus,
    pub progress_percent: f64,
    pub created_at: DateTime<Utc>,
}

impl PipelineSnapshot {
    pub fn step(&self, kind: &str) -> Option<&StepSnapshot> {
        self.steps.iter().find(|s| s.kind == kind)
    }

    /// Whether verification has reached a final outcome
    pub fn is_finished(&self) -> bool {
        self.overall_status.is_terminal()
    }

    /// Number of steps that reached a terminal status
    pub fn finished_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.status.is_terminal()).count()
    }
}

/// Returned by submission so a client can start polling immediately
///
/// Serializes as the snapshot itself: `{applicationId, steps, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineHandle {
    #[serde(flatten)]
    pub snapshot: PipelineSnapshot,
}

impl PipelineHandle {
    pub fn application_id(&self) -> Uuid {
        self.snapshot.application_id
    }
}

impl From<PipelineSnapshot> for PipelineHandle {
    fn from(snapshot: PipelineSnapshot) -> Self {
        Self { snapshot }
    }
}
