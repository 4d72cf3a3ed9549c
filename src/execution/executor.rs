//! Step executor - runs one step's checker with timeout and retries

use crate::{
    checker::{Checker, CheckerError},
    core::{ApplicationPayload, StepKind},
    execution::StepPolicy,
};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Result of executing a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// Checker reported success
    Passed { message: String },
    /// Checker reported non-compliance; never retried
    Rejected { message: String },
    /// Checker could not be reached within the retry budget
    Unavailable { cause: CheckerError, attempts: u32 },
}

impl StepResult {
    pub fn is_passed(&self) -> bool {
        matches!(self, StepResult::Passed { .. })
    }
}

/// Executes a single step against a checker
pub struct StepExecutor<C> {
    checker: C,
}

impl<C: Checker> StepExecutor<C> {
    pub fn new(checker: C) -> Self {
        Self { checker }
    }

    /// One bounded checker call
    pub async fn attempt(
        &self,
        kind: &StepKind,
        payload: &ApplicationPayload,
        policy: &StepPolicy,
    ) -> Result<crate::checker::CheckOutcome, CheckerError> {
        match timeout(policy.timeout, self.checker.check(kind, payload)).await {
            Ok(result) => result,
            Err(_) => Err(CheckerError::Timeout(policy.timeout)),
        }
    }

    /// Run the step, retrying transient failures per `policy`.
    ///
    /// `on_retry` is called with the retry number and the error that caused it.
    pub async fn execute<F>(
        &self,
        kind: &StepKind,
        payload: &ApplicationPayload,
        policy: &StepPolicy,
        mut on_retry: F,
    ) -> StepResult
    where
        F: FnMut(u32, &CheckerError) + Send,
    {
        let max_attempts = policy.retry.max_attempts();
        let mut attempt = 1;

        loop {
            debug!("Checking step {} (attempt {}/{})", kind, attempt, max_attempts);

            match self.attempt(kind, payload, policy).await {
                Ok(outcome) if outcome.is_success() => {
                    info!("Step {} passed: {}", kind, outcome.message);
                    return StepResult::Passed {
                        message: outcome.message,
                    };
                }
                Ok(outcome) => {
                    info!("Step {} rejected: {}", kind, outcome.message);
                    return StepResult::Rejected {
                        message: outcome.message,
                    };
                }
                Err(cause) if attempt < max_attempts => {
                    let delay = policy.retry.backoff(attempt);
                    warn!(
                        "Step {} checker unavailable ({}), retrying in {:?}",
                        kind, cause, delay
                    );
                    on_retry(attempt, &cause);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(cause) => {
                    warn!(
                        "Step {} checker unavailable after {} attempt(s): {}",
                        kind, attempt, cause
                    );
                    return StepResult::Unavailable {
                        cause,
                        attempts: attempt,
                    };
                }
            }
        }
    }
}
