//! Checker capability - the boundary to the collaborators that actually
//! perform a verification (registry lookups, document validation, ...)

pub mod builtin;
pub mod command;

use crate::core::{ApplicationPayload, RegistryError, StepKind, StepRegistry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use builtin::{DocumentChecker, GstinFormatChecker, PanMatchChecker};
pub use command::CommandChecker;

/// Business verdict reported by a checker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Success,
    Failure,
}

/// Result of a check that ran to completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub outcome: Verdict,
    pub message: String,
}

impl CheckOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            outcome: Verdict::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            outcome: Verdict::Failure,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Verdict::Success
    }
}

/// Infrastructure errors; these are transient and may be retried
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckerError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

/// Trait for checker execution - allows for different implementations
#[async_trait]
pub trait Checker: Send + Sync {
    /// Run the check for `kind` against the application
    async fn check(&self, kind: &StepKind, payload: &ApplicationPayload) -> Result<CheckOutcome, CheckerError>;
}

#[async_trait]
impl<T: Checker + ?Sized> Checker for Arc<T> {
    async fn check(&self, kind: &StepKind, payload: &ApplicationPayload) -> Result<CheckOutcome, CheckerError> {
        (**self).check(kind, payload).await
    }
}

/// Dispatches each step kind to the checker bound to it
#[derive(Default, Clone)]
pub struct CheckerRouter {
    checkers: HashMap<StepKind, Arc<dyn Checker>>,
}

impl std::fmt::Debug for CheckerRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckerRouter")
            .field("kinds", &self.checkers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CheckerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a checker to a step kind, replacing any previous binding
    pub fn bind(mut self, kind: impl Into<StepKind>, checker: Arc<dyn Checker>) -> Self {
        self.checkers.insert(kind.into(), checker);
        self
    }

    /// Router with the built-in checker for every kind that has one
    pub fn with_builtins(registry: &StepRegistry) -> Self {
        registry.kinds().fold(Self::new(), |router, kind| match builtin::for_kind(kind) {
            Some(checker) => router.bind(kind.clone(), checker),
            None => router,
        })
    }

    pub fn is_bound(&self, kind: &StepKind) -> bool {
        self.checkers.contains_key(kind)
    }

    /// Fail unless every registered step kind has a checker
    pub fn ensure_covers(&self, registry: &StepRegistry) -> Result<(), RegistryError> {
        match registry.kinds().find(|k| !self.is_bound(k)) {
            Some(kind) => Err(RegistryError::UnboundChecker(kind.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Checker for CheckerRouter {
    async fn check(&self, kind: &StepKind, payload: &ApplicationPayload) -> Result<CheckOutcome, CheckerError> {
        match self.checkers.get(kind) {
            Some(checker) => checker.check(kind, payload).await,
            None => Err(CheckerError::Transport(format!("no checker bound for step {}", kind))),
        }
    }
}
