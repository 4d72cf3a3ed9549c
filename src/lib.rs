//! vendor-verify - Vendor onboarding verification pipeline

pub mod checker;
pub mod cli;
pub mod core;
pub mod execution;
pub mod gateway;
pub mod persistence;
pub mod server;

// Re-export commonly used types
pub use checker::{CheckOutcome, Checker, CheckerError, CheckerRouter, Verdict};
pub use core::config::VerifyConfig;
pub use core::{
    ApplicationPayload, OverallStatus, Pipeline, PipelineError, PipelineHandle, PipelineSnapshot, RegistryError,
    StepDefinition, StepKind, StepRegistry, StepStatus,
};
pub use execution::{EngineSettings, VerificationEngine, VerificationEvent};
pub use gateway::{GatewayError, SubmissionGateway};
pub use persistence::{InMemoryPersistence, PersistenceBackend};
