//! Timeout and retry policy for checker calls

use crate::core::StepKind;
use std::collections::HashMap;
use std::time::Duration;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// How often and how patiently a transient failure is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = single attempt)
    pub max_retries: u32,

    /// Delay before the first retry; doubled on each further retry
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_backoff: Duration::ZERO,
        }
    }

    /// Total attempts allowed, including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_backoff: Duration::from_millis(500),
        }
    }
}

/// Checker policy for one step kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPolicy {
    /// Bound on a single checker call
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for StepPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Engine-wide defaults plus per-kind overrides
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub defaults: StepPolicy,
    pub overrides: HashMap<StepKind, StepPolicy>,
}

impl EngineSettings {
    pub fn new(defaults: StepPolicy) -> Self {
        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, kind: impl Into<StepKind>, policy: StepPolicy) -> Self {
        self.overrides.insert(kind.into(), policy);
        self
    }

    pub fn policy_for(&self, kind: &StepKind) -> &StepPolicy {
        self.overrides.get(kind).unwrap_or(&self.defaults)
    }
}
