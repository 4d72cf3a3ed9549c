//! Core error types

use crate::core::{state::StepStatus, step::StepKind};
use thiserror::Error;

/// Errors raised by the pipeline state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Unknown step: {0}")]
    UnknownStep(StepKind),

    #[error("Invalid transition for step {kind}: cannot move from {from} to {to}")]
    InvalidTransition {
        kind: StepKind,
        from: StepStatus,
        to: StepStatus,
    },
}

/// Startup-time configuration errors for the step registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Step registry is empty")]
    Empty,

    #[error("Duplicate step kind: {0}")]
    DuplicateKind(StepKind),

    #[error("Step ordinals must be contiguous from 1: expected {expected}, found {found}")]
    NonContiguousOrdinals { expected: u32, found: u32 },

    #[error("No checker bound for step kind: {0}")]
    UnboundChecker(StepKind),
}
