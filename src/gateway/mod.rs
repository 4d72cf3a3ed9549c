//! Submission gateway - accepts applications and serves their progress

pub mod gate;

pub use gate::StartGate;

use crate::{
    checker::Checker,
    core::{ApplicationPayload, Pipeline, PipelineError, PipelineHandle, PipelineSnapshot, StepRegistry},
    execution::VerificationEngine,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, RwLock, Semaphore};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Errors returned to gateway callers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Application not found: {0}")]
    NotFound(Uuid),

    #[error("Verification already started for application {0}")]
    AlreadyStarted(Uuid),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PipelineError> for GatewayError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidPayload(msg) => GatewayError::InvalidPayload(msg),
            other => GatewayError::Internal(other.to_string()),
        }
    }
}

/// Finished runs kept in memory when there is no store to fall back on
pub const DEFAULT_RETAINED_FINISHED: usize = 1024;

/// An application live in this process
struct Application {
    status: watch::Receiver<PipelineSnapshot>,
    gate: Arc<StartGate>,
}

#[derive(Default)]
struct Applications {
    live: HashMap<Uuid, Application>,
    /// Finished runs still in `live`, oldest first
    finished: VecDeque<Uuid>,
}

impl Applications {
    /// Release a finished run. Persisted runs are served from the store from
    /// now on; otherwise at most `retained` finished runs stay readable.
    fn release(&mut self, application_id: Uuid, persisted: bool, retained: usize) {
        if persisted {
            self.live.remove(&application_id);
            return;
        }

        self.finished.push_back(application_id);
        while self.finished.len() > retained {
            if let Some(oldest) = self.finished.pop_front() {
                debug!("Evicting finished application {} from memory", oldest);
                self.live.remove(&oldest);
            }
        }
    }
}

/// Accepts vendor applications and runs one verification task per application
pub struct SubmissionGateway<C> {
    registry: Arc<StepRegistry>,
    engine: Arc<VerificationEngine<C>>,
    applications: Arc<RwLock<Applications>>,
    permits: Arc<Semaphore>,
    retained_finished: usize,
}

impl<C: Checker + 'static> SubmissionGateway<C> {
    /// `max_concurrent` bounds how many engine runs execute at once
    pub fn new(registry: Arc<StepRegistry>, engine: VerificationEngine<C>, max_concurrent: usize) -> Self {
        Self {
            registry,
            engine: Arc::new(engine),
            applications: Arc::new(RwLock::new(Applications::default())),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            retained_finished: DEFAULT_RETAINED_FINISHED,
        }
    }

    /// How many finished runs stay readable when the engine has no store
    pub fn with_retained_finished(mut self, retained: usize) -> Self {
        self.retained_finished = retained;
        self
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Validate and accept an application; verification proceeds in the background
    pub async fn submit(&self, payload: ApplicationPayload) -> Result<PipelineHandle, GatewayError> {
        payload.validate()?;

        let application_id = Uuid::new_v4();
        let mut pipeline = Pipeline::create(self.registry.clone(), application_id, &payload)?;
        let snapshot = pipeline.status_snapshot();

        let (publisher, status) = watch::channel(snapshot.clone());
        let gate = Arc::new(StartGate::new());
        self.applications.write().await.live.insert(
            application_id,
            Application {
                status,
                gate: gate.clone(),
            },
        );

        let engine = self.engine.clone();
        let permits = self.permits.clone();
        let applications = self.applications.clone();
        let persisted = self.engine.store().is_some();
        let retained = self.retained_finished;
        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("Verification of application {} could not be scheduled: {}", application_id, e);
                    return;
                }
            };

            if !gate.try_start() {
                debug!("Application {} was cancelled before it started", application_id);
                return;
            }

            if let Err(e) = engine.execute(&mut pipeline, &payload, &publisher).await {
                debug!(
                    "Verification of application {} ended with an internal fault: {}",
                    application_id, e
                );
            }

            applications
                .write()
                .await
                .release(application_id, persisted, retained);
        });

        info!("Accepted application {} ({} steps)", application_id, snapshot.steps.len());
        Ok(PipelineHandle::from(snapshot))
    }

    /// Latest snapshot of an application
    pub async fn get_status(&self, application_id: Uuid) -> Result<PipelineSnapshot, GatewayError> {
        if let Some(app) = self.applications.read().await.live.get(&application_id) {
            return Ok(app.status.borrow().clone());
        }

        self.load_persisted(application_id)
            .await?
            .ok_or(GatewayError::NotFound(application_id))
    }

    /// Receive every snapshot published from now on
    pub async fn subscribe(&self, application_id: Uuid) -> Result<watch::Receiver<PipelineSnapshot>, GatewayError> {
        self.applications
            .read()
            .await
            .live
            .get(&application_id)
            .map(|app| app.status.clone())
            .ok_or(GatewayError::NotFound(application_id))
    }

    /// Withdraw an application whose verification has not started yet
    pub async fn cancel(&self, application_id: Uuid) -> Result<(), GatewayError> {
        {
            let mut applications = self.applications.write().await;
            if let Some(app) = applications.live.get(&application_id) {
                if !app.gate.try_cancel() {
                    return Err(GatewayError::AlreadyStarted(application_id));
                }
                applications.live.remove(&application_id);
                info!("Cancelled application {}", application_id);
                return Ok(());
            }
        }

        match self.load_persisted(application_id).await? {
            Some(_) => Err(GatewayError::AlreadyStarted(application_id)),
            None => Err(GatewayError::NotFound(application_id)),
        }
    }

    /// Resolve with the final snapshot once verification has finished
    pub async fn wait_for_completion(&self, application_id: Uuid) -> Result<PipelineSnapshot, GatewayError> {
        let mut status = match self.subscribe(application_id).await {
            Ok(status) => status,
            Err(GatewayError::NotFound(_)) => return self.settled(application_id).await,
            Err(e) => return Err(e),
        };

        let result = status.wait_for(|s| s.is_finished()).await.map(|s| s.clone());
        match result {
            Ok(snapshot) => Ok(snapshot),
            Err(_) => self.settled(application_id).await,
        }
    }

    /// Number of applications held in memory, running or finished
    pub async fn live_applications(&self) -> usize {
        self.applications.read().await.live.len()
    }

    /// Final snapshot of an application that is no longer publishing
    async fn settled(&self, application_id: Uuid) -> Result<PipelineSnapshot, GatewayError> {
        let stopped = || {
            GatewayError::Internal(format!(
                "verification of application {} stopped before finishing",
                application_id
            ))
        };

        match self.load_persisted(application_id).await? {
            Some(snapshot) if snapshot.is_finished() => Ok(snapshot),
            Some(_) => Err(stopped()),
            None if self.applications.read().await.live.contains_key(&application_id) => Err(stopped()),
            None => Err(GatewayError::NotFound(application_id)),
        }
    }

    async fn load_persisted(&self, application_id: Uuid) -> Result<Option<PipelineSnapshot>, GatewayError> {
        let Some(store) = self.engine.store() else {
            return Ok(None);
        };

        store.load_snapshot(application_id).await.map_err(|e| {
            warn!("Failed to load snapshot for application {}: {:#}", application_id, e);
            GatewayError::Internal(format!("{:#}", e))
        })
    }
}
