//! Verification execution engine

pub mod engine;
pub mod executor;
pub mod retry;

pub use engine::{EventHandler, FailureReason, VerificationEngine, VerificationEvent, SKIPPED_MESSAGE, UNAVAILABLE_MESSAGE};
pub use executor::{StepExecutor, StepResult};
pub use retry::{EngineSettings, RetryPolicy, StepPolicy};
