//! Test utility functions for vendor-verify scenarios

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;
use vendor_verify::checker::{CheckOutcome, Checker, CheckerError};
use vendor_verify::core::{
    ApplicationPayload, DocumentKind, DocumentRef, OverallStatus, Pipeline, StepKind, StepRegistry, StepStatus,
};
use vendor_verify::execution::{
    EngineSettings, RetryPolicy, StepPolicy, VerificationEngine, VerificationEvent, SKIPPED_MESSAGE,
};

/// Mock checker that replays scripted responses per step kind
#[derive(Clone, Default)]
pub struct ScriptedChecker {
    script: Arc<Mutex<HashMap<StepKind, VecDeque<Result<CheckOutcome, CheckerError>>>>>,
    calls: Arc<Mutex<Vec<StepKind>>>,
    delay: Option<Duration>,
}

impl ScriptedChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue responses for `kind`, returned in order
    pub fn script(self, kind: &str, responses: Vec<Result<CheckOutcome, CheckerError>>) -> Self {
        self.script
            .lock()
            .unwrap()
            .entry(StepKind::from(kind))
            .or_default()
            .extend(responses);
        self
    }

    pub fn pass(self, kind: &str, message: &str) -> Self {
        self.script(kind, vec![Ok(CheckOutcome::success(message))])
    }

    pub fn reject(self, kind: &str, message: &str) -> Self {
        self.script(kind, vec![Ok(CheckOutcome::failure(message))])
    }

    /// Sleep before every response
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Step kinds in the order they were checked, one entry per attempt
    pub fn calls(&self) -> Vec<StepKind> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, kind: &str) -> usize {
        self.calls().iter().filter(|k| k.as_str() == kind).count()
    }
}

#[async_trait]
impl Checker for ScriptedChecker {
    async fn check(&self, kind: &StepKind, _payload: &ApplicationPayload) -> Result<CheckOutcome, CheckerError> {
        self.calls.lock().unwrap().push(kind.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self
            .script
            .lock()
            .unwrap()
            .get_mut(kind)
            .and_then(|queue| queue.pop_front());

        next.unwrap_or_else(|| {
            Err(CheckerError::Transport(format!(
                "ScriptedChecker: no response scripted for {}",
                kind
            )))
        })
    }
}

/// Fast engine settings so retry scenarios finish quickly
pub fn fast_settings(max_retries: u32) -> EngineSettings {
    EngineSettings::new(StepPolicy {
        timeout: Duration::from_millis(200),
        retry: RetryPolicy {
            max_retries,
            base_backoff: Duration::from_millis(1),
        },
    })
}

/// A complete, valid onboarding application
pub fn sample_payload() -> ApplicationPayload {
    ApplicationPayload {
        vendor_name: "Acme Traders".to_string(),
        gstin: "27AAPFU0939F1ZV".to_string(),
        email: "accounts@acme.example".to_string(),
        address: "12 MG Road, Pune".to_string(),
        phone: "+91 20 5555 0100".to_string(),
        pan: Some("AAPFU0939F".to_string()),
        website: Some("https://acme.example".to_string()),
        documents: vec![
            DocumentRef {
                kind: DocumentKind::PanCard,
                file_name: "pan-card.pdf".to_string(),
            },
            DocumentRef {
                kind: DocumentKind::UdyamCertificate,
                file_name: "udyam.png".to_string(),
            },
        ],
    }
}

/// Run the default catalog against a scripted checker
pub async fn run_with_script(checker: ScriptedChecker, max_retries: u32) -> VerificationTestResult {
    run_registry_with_script(StepRegistry::default_catalog(), checker, max_retries).await
}

/// Run any registry against a scripted checker, recording every event
pub async fn run_registry_with_script(
    registry: StepRegistry,
    checker: ScriptedChecker,
    max_retries: u32,
) -> VerificationTestResult {
    let events = Arc::new(Mutex::new(Vec::new()));
    let recorded = events.clone();
    let engine = VerificationEngine::new(checker.clone(), fast_settings(max_retries))
        .with_event_handler(move |event| recorded.lock().unwrap().push(event.clone()));

    let payload = sample_payload();
    let mut pipeline = Pipeline::create(Arc::new(registry), Uuid::new_v4(), &payload).unwrap();
    let status = engine.run(&mut pipeline, &payload).await.unwrap();

    let events = events.lock().unwrap().clone();
    VerificationTestResult {
        pipeline,
        status,
        events,
        checker,
    }
}

/// Outcome of a scripted verification run
pub struct VerificationTestResult {
    pub pipeline: Pipeline,
    pub status: OverallStatus,
    pub events: Vec<VerificationEvent>,
    pub checker: ScriptedChecker,
}

impl VerificationTestResult {
    pub fn step_status(&self, kind: &str) -> StepStatus {
        self.pipeline
            .step(&StepKind::from(kind))
            .unwrap_or_else(|| panic!("Step '{}' not found in result", kind))
            .status
    }

    pub fn step_message(&self, kind: &str) -> String {
        self.pipeline
            .step(&StepKind::from(kind))
            .unwrap_or_else(|| panic!("Step '{}' not found in result", kind))
            .message
            .clone()
    }

    /// Kinds in the order the engine started them
    pub fn started_order(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                VerificationEvent::StepStarted { kind, .. } => Some(kind.to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn retries_for(&self, kind: &str) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                VerificationEvent::StepRetrying { kind: k, retry, .. } if k.as_str() == kind => Some(*retry),
                _ => None,
            })
            .collect()
    }
}

/// Assert a step completed with a message containing `expected`
pub fn assert_step_completed(result: &VerificationTestResult, kind: &str, expected: &str) {
    assert_eq!(
        result.step_status(kind),
        StepStatus::Completed,
        "Step '{}' should be completed (message: {})",
        kind,
        result.step_message(kind)
    );
    assert!(
        result.step_message(kind).contains(expected),
        "Step '{}' message {:?} does not contain {:?}",
        kind,
        result.step_message(kind),
        expected
    );
}

/// Assert a step failed with a message containing `expected`
pub fn assert_step_failed(result: &VerificationTestResult, kind: &str, expected: &str) {
    assert_eq!(result.step_status(kind), StepStatus::Failed, "Step '{}' should be failed", kind);
    assert!(
        result.step_message(kind).contains(expected),
        "Step '{}' message {:?} does not contain {:?}",
        kind,
        result.step_message(kind),
        expected
    );
}

/// Assert a step never ran because a blocking step failed
pub fn assert_step_skipped(result: &VerificationTestResult, kind: &str) {
    let step = result.pipeline.step(&StepKind::from(kind)).unwrap();
    assert_eq!(step.status, StepStatus::Failed);
    assert_eq!(step.message, SKIPPED_MESSAGE);
    assert!(step.started_at.is_none(), "Skipped step '{}' should never have started", kind);
    assert_eq!(result.checker.call_count(kind), 0, "Skipped step '{}' was checked", kind);
}
