//! Verification engine - drives one application's steps to completion

use crate::{
    checker::{Checker, CheckerError},
    core::{ApplicationPayload, OverallStatus, Pipeline, PipelineError, PipelineSnapshot, StepKind},
    execution::{EngineSettings, StepExecutor, StepResult},
    persistence::PersistenceBackend,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Message recorded on steps that never ran because a blocking step failed
pub const SKIPPED_MESSAGE: &str = "skipped: blocking step failed";

/// Message recorded on steps whose checker could not be reached
pub const UNAVAILABLE_MESSAGE: &str = "unavailable";

/// Why a step ended up `Failed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Checker reported non-compliance
    Rejected,
    /// Checker timed out or could not be reached
    Unavailable(CheckerError),
}

/// Events that can occur during verification
#[derive(Debug, Clone)]
pub enum VerificationEvent {
    PipelineStarted {
        application_id: Uuid,
        total_steps: usize,
    },
    StepStarted {
        application_id: Uuid,
        kind: StepKind,
    },
    StepRetrying {
        application_id: Uuid,
        kind: StepKind,
        retry: u32,
        cause: CheckerError,
    },
    StepCompleted {
        application_id: Uuid,
        kind: StepKind,
        message: String,
    },
    StepFailed {
        application_id: Uuid,
        kind: StepKind,
        message: String,
        reason: FailureReason,
    },
    StepsSkipped {
        application_id: Uuid,
        kinds: Vec<StepKind>,
    },
    PipelineFinished {
        application_id: Uuid,
        status: OverallStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&VerificationEvent) + Send + Sync>;

/// Drives pipelines step by step against a checker
pub struct VerificationEngine<C> {
    executor: StepExecutor<C>,
    settings: EngineSettings,
    store: Option<Arc<dyn PersistenceBackend>>,
    event_handlers: Vec<EventHandler>,
}

impl<C: Checker> VerificationEngine<C> {
    pub fn new(checker: C, settings: EngineSettings) -> Self {
        Self {
            executor: StepExecutor::new(checker),
            settings,
            store: None,
            event_handlers: Vec::new(),
        }
    }

    /// Save every published snapshot to `store`
    pub fn with_persistence(mut self, store: Arc<dyn PersistenceBackend>) -> Self {
        self.store = Some(store);
        self
    }

    /// Add an event handler
    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&VerificationEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store(&self) -> Option<&Arc<dyn PersistenceBackend>> {
        self.store.as_ref()
    }

    /// Emit an event to all handlers
    fn emit(&self, event: VerificationEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    /// Publish the pipeline's current state to readers and the store
    async fn publish(&self, pipeline: &Pipeline, publisher: &watch::Sender<PipelineSnapshot>) {
        let snapshot = pipeline.status_snapshot();

        // Store first so it never lags what readers have been told
        if let Some(store) = &self.store {
            if let Err(e) = store.save_snapshot(&snapshot).await {
                warn!(
                    "Failed to persist snapshot for application {}: {:#}",
                    snapshot.application_id, e
                );
            }
        }

        publisher.send_replace(snapshot);
    }

    /// Run a pipeline without external readers
    pub async fn run(
        &self,
        pipeline: &mut Pipeline,
        payload: &ApplicationPayload,
    ) -> Result<OverallStatus, PipelineError> {
        let (publisher, _) = watch::channel(pipeline.status_snapshot());
        self.execute(pipeline, payload, &publisher).await
    }

    /// Execute every step in ordinal order, publishing after each transition
    pub async fn execute(
        &self,
        pipeline: &mut Pipeline,
        payload: &ApplicationPayload,
        publisher: &watch::Sender<PipelineSnapshot>,
    ) -> Result<OverallStatus, PipelineError> {
        let application_id = pipeline.application_id();

        match self.drive(pipeline, payload, publisher).await {
            Ok(status) => {
                info!("Verification of application {} finished: {}", application_id, status);
                self.emit(VerificationEvent::PipelineFinished {
                    application_id,
                    status,
                });
                Ok(status)
            }
            Err(e) => {
                error!(
                    "Internal consistency fault while verifying application {}: {}",
                    application_id, e
                );
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        pipeline: &mut Pipeline,
        payload: &ApplicationPayload,
        publisher: &watch::Sender<PipelineSnapshot>,
    ) -> Result<OverallStatus, PipelineError> {
        let application_id = pipeline.application_id();
        let plan: Vec<(StepKind, bool)> = pipeline
            .registry()
            .definitions()
            .iter()
            .map(|d| (d.kind.clone(), d.is_blocking))
            .collect();

        info!(
            "Starting verification of application {} ({} steps)",
            application_id,
            plan.len()
        );
        self.emit(VerificationEvent::PipelineStarted {
            application_id,
            total_steps: plan.len(),
        });

        for (kind, is_blocking) in plan {
            pipeline.begin_step(&kind)?;
            self.publish(pipeline, publisher).await;
            self.emit(VerificationEvent::StepStarted {
                application_id,
                kind: kind.clone(),
            });

            let policy = self.settings.policy_for(&kind);
            let result = self
                .executor
                .execute(&kind, payload, policy, |retry, cause| {
                    self.emit(VerificationEvent::StepRetrying {
                        application_id,
                        kind: kind.clone(),
                        retry,
                        cause: cause.clone(),
                    })
                })
                .await;

            let passed = result.is_passed();
            match result {
                StepResult::Passed { message } => {
                    pipeline.complete_step(&kind, message.clone())?;
                    self.emit(VerificationEvent::StepCompleted {
                        application_id,
                        kind: kind.clone(),
                        message,
                    });
                }
                StepResult::Rejected { message } => {
                    pipeline.fail_step(&kind, message.clone())?;
                    self.emit(VerificationEvent::StepFailed {
                        application_id,
                        kind: kind.clone(),
                        message,
                        reason: FailureReason::Rejected,
                    });
                }
                StepResult::Unavailable { cause, attempts } => {
                    warn!(
                        "Step {} of application {} recorded as unavailable after {} attempt(s): {}",
                        kind, application_id, attempts, cause
                    );
                    pipeline.fail_step(&kind, UNAVAILABLE_MESSAGE)?;
                    self.emit(VerificationEvent::StepFailed {
                        application_id,
                        kind: kind.clone(),
                        message: UNAVAILABLE_MESSAGE.to_string(),
                        reason: FailureReason::Unavailable(cause),
                    });
                }
            }
            let blocked = !passed && is_blocking;
            let skipped = if blocked {
                pipeline.skip_pending(SKIPPED_MESSAGE)
            } else {
                Vec::new()
            };

            // A blocking failure and its skips become visible in the same snapshot
            self.publish(pipeline, publisher).await;

            if blocked {
                info!(
                    "Blocking step {} failed for application {}, skipping {} step(s)",
                    kind,
                    application_id,
                    skipped.len()
                );
                if !skipped.is_empty() {
                    self.emit(VerificationEvent::StepsSkipped {
                        application_id,
                        kinds: skipped,
                    });
                }
                break;
            }
        }

        Ok(pipeline.overall_status())
    }
}
