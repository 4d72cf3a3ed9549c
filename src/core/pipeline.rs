//! Pipeline domain model
//!
//! A pipeline holds one application's step instances in registry order.
//! It enforces per-step transitions but not execution order; the engine
//! decides which step runs next.

use crate::core::{
    error::PipelineError,
    payload::ApplicationPayload,
    registry::StepRegistry,
    snapshot::{PipelineSnapshot, StepSnapshot},
    state::{self, OverallStatus, StepInstance, StepStatus},
    step::StepKind,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// One vendor application's verification run
#[derive(Debug, Clone)]
pub struct Pipeline {
    application_id: Uuid,
    registry: Arc<StepRegistry>,
    steps: Vec<StepInstance>,
    created_at: DateTime<Utc>,
}

impl Pipeline {
    /// Create a pipeline with every registered step pending
    pub fn create(
        registry: Arc<StepRegistry>,
        application_id: Uuid,
        payload: &ApplicationPayload,
    ) -> Result<Self, PipelineError> {
        payload.require_identifiers()?;

        let steps = registry
            .kinds()
            .cloned()
            .map(StepInstance::pending)
            .collect();

        Ok(Self {
            application_id,
            registry,
            steps,
            created_at: Utc::now(),
        })
    }

    pub fn application_id(&self) -> Uuid {
        self.application_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Get a step by kind
    pub fn step(&self, kind: &StepKind) -> Option<&StepInstance> {
        self.steps.iter().find(|s| &s.kind == kind)
    }

    fn step_mut(&mut self, kind: &StepKind) -> Result<&mut StepInstance, PipelineError> {
        self.steps
            .iter_mut()
            .find(|s| &s.kind == kind)
            .ok_or_else(|| PipelineError::UnknownStep(kind.clone()))
    }

    /// Move a step from `Pending` to `InProgress`
    pub fn begin_step(&mut self, kind: &StepKind) -> Result<(), PipelineError> {
        let step = self.step_mut(kind)?;
        if step.status != StepStatus::Pending {
            return Err(PipelineError::InvalidTransition {
                kind: kind.clone(),
                from: step.status,
                to: StepStatus::InProgress,
            });
        }

        step.status = StepStatus::InProgress;
        step.started_at = Some(Utc::now());
        Ok(())
    }

    /// Move a step from `InProgress` to `Completed`
    pub fn complete_step(&mut self, kind: &StepKind, message: impl Into<String>) -> Result<(), PipelineError> {
        self.finish_step(kind, StepStatus::Completed, message.into())
    }

    /// Move a step from `InProgress` to `Failed`
    pub fn fail_step(&mut self, kind: &StepKind, message: impl Into<String>) -> Result<(), PipelineError> {
        self.finish_step(kind, StepStatus::Failed, message.into())
    }

    fn finish_step(&mut self, kind: &StepKind, to: StepStatus, message: String) -> Result<(), PipelineError> {
        let step = self.step_mut(kind)?;
        match step.status {
            StepStatus::InProgress => {
                step.status = to;
                step.message = message;
                step.finished_at = Some(Utc::now());
                Ok(())
            }
            // Re-entering the same terminal state is a no-op
            current if current == to => Ok(()),
            from => Err(PipelineError::InvalidTransition {
                kind: kind.clone(),
                from,
                to,
            }),
        }
    }

    /// Fail every step that has not begun, returning the affected kinds
    pub fn skip_pending(&mut self, message: &str) -> Vec<StepKind> {
        let now = Utc::now();
        self.steps
            .iter_mut()
            .filter(|s| s.status == StepStatus::Pending)
            .map(|step| {
                step.status = StepStatus::Failed;
                step.message = message.to_string();
                step.finished_at = Some(now);
                step.kind.clone()
            })
            .collect()
    }

    /// Copy of every step in execution order
    pub fn snapshot(&self) -> Vec<StepInstance> {
        self.steps.clone()
    }

    /// Whether any step has left `Pending`
    pub fn has_started(&self) -> bool {
        self.steps.iter().any(|s| s.status != StepStatus::Pending)
    }

    /// Percentage of steps that reached a terminal status
    pub fn progress_percent(&self) -> f64 {
        state::progress_percent(self.steps.iter().map(|s| &s.status))
    }

    /// Aggregate status derived from the step statuses
    ///
    /// Checked in order: `Failed` once any blocking step failed, `Pending`
    /// while no step has left `Pending`, `InProgress` while any step is
    /// unfinished, `Completed` when every step completed, otherwise
    /// `CompletedWithWarnings`. An untouched pipeline is `Pending` rather than
    /// `InProgress` so clients can tell a queued application from a running one.
    pub fn overall_status(&self) -> OverallStatus {
        let blocking_failed = self
            .registry
            .definitions()
            .iter()
            .zip(&self.steps)
            .any(|(def, step)| def.is_blocking && step.status == StepStatus::Failed);
        if blocking_failed {
            return OverallStatus::Failed;
        }

        if self.steps.iter().all(|s| s.status == StepStatus::Pending) {
            return OverallStatus::Pending;
        }

        if self.steps.iter().any(|s| !s.status.is_terminal()) {
            return OverallStatus::InProgress;
        }

        if self.steps.iter().all(|s| s.status == StepStatus::Completed) {
            OverallStatus::Completed
        } else {
            OverallStatus::CompletedWithWarnings
        }
    }

    /// Client-facing snapshot including aggregate status and progress
    pub fn status_snapshot(&self) -> PipelineSnapshot {
        let steps = self
            .registry
            .definitions()
            .iter()
            .zip(&self.steps)
            .map(|(def, step)| StepSnapshot {
                kind: step.kind.clone(),
                display_name: def.display_name.clone(),
                status: step.status,
                message: step.message.clone(),
                started_at: step.started_at,
                finished_at: step.finished_at,
            })
            .collect();

        PipelineSnapshot {
            application_id: self.application_id,
            steps,
            overall_status: self.overall_status(),
            progress_percent: self.progress_percent(),
            created_at: self.created_at,
        }
    }
}
