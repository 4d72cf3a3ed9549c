//! Service configuration from YAML

use crate::core::{
    registry::StepRegistry,
    step::{StepDefinition, StepKind},
};
use crate::checker::{CheckerRouter, CommandChecker};
use crate::execution::{EngineSettings, RetryPolicy, StepPolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Top-level configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Step catalog (the built-in catalog is used when omitted)
    #[serde(default)]
    pub steps: Option<Vec<StepConfig>>,

    /// Default timeout for a single checker call (in seconds)
    #[serde(default = "default_checker_timeout_secs")]
    pub checker_timeout_secs: u64,

    /// Retries after a transient checker failure (global default)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries, doubled on each attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Maximum number of applications verified at the same time
    #[serde(default = "default_max_concurrent_pipelines")]
    pub max_concurrent_pipelines: usize,

    /// Address the HTTP API listens on
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// Step configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Unique step identifier
    pub kind: String,

    /// Human-readable step name
    pub display_name: String,

    /// Execution order, contiguous from 1
    pub ordinal: u32,

    /// Whether failure halts the remaining steps
    #[serde(default)]
    pub blocking: bool,

    /// Checker timeout for this step (overrides global)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Maximum retries for this step (overrides global)
    #[serde(default)]
    pub max_retries: Option<u32>,

    /// External checker program and arguments (built-in checker when omitted)
    #[serde(default)]
    pub command: Option<Vec<String>>,
}

fn default_checker_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_max_concurrent_pipelines() -> usize {
    16
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            steps: None,
            checker_timeout_secs: default_checker_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_concurrent_pipelines: default_max_concurrent_pipelines(),
            bind: default_bind(),
        }
    }
}

impl VerifyConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: VerifyConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.to_registry()?;

        if self.checker_timeout_secs == 0 {
            anyhow::bail!("checker_timeout_secs must be greater than zero");
        }
        if self.max_concurrent_pipelines == 0 {
            anyhow::bail!("max_concurrent_pipelines must be greater than zero");
        }
        if let Some(steps) = &self.steps {
            if let Some(step) = steps.iter().find(|s| s.timeout_secs == Some(0)) {
                anyhow::bail!("Step '{}' has a zero timeout", step.kind);
            }
            if let Some(step) = steps.iter().find(|s| matches!(&s.command, Some(argv) if argv.is_empty())) {
                anyhow::bail!("Step '{}' has an empty command", step.kind);
            }
        }

        Ok(())
    }

    /// Build the step registry
    pub fn to_registry(&self) -> Result<StepRegistry> {
        match &self.steps {
            None => Ok(StepRegistry::default_catalog()),
            Some(steps) => {
                let definitions = steps
                    .iter()
                    .map(|s| StepDefinition::new(s.kind.clone(), s.display_name.clone(), s.ordinal, s.blocking))
                    .collect();
                StepRegistry::new(definitions).context("Invalid step catalog")
            }
        }
    }

    /// Bind a checker to every step: configured commands first, then built-ins
    pub fn checker_router(&self, registry: &StepRegistry) -> Result<CheckerRouter> {
        let router = self
            .steps
            .iter()
            .flatten()
            .filter_map(|s| {
                let argv = s.command.as_deref()?;
                CommandChecker::from_argv(argv).map(|checker| (s.kind.as_str(), checker))
            })
            .fold(CheckerRouter::with_builtins(registry), |router, (kind, checker)| {
                router.bind(kind, Arc::new(checker))
            });

        router
            .ensure_covers(registry)
            .context("Every step needs a built-in checker or a `command`")?;
        Ok(router)
    }

    /// Engine settings with per-step overrides applied
    pub fn engine_settings(&self) -> EngineSettings {
        let defaults = StepPolicy {
            timeout: Duration::from_secs(self.checker_timeout_secs),
            retry: RetryPolicy {
                max_retries: self.max_retries,
                base_backoff: Duration::from_millis(self.retry_backoff_ms),
            },
        };

        let overrides: HashMap<StepKind, StepPolicy> = self
            .steps
            .iter()
            .flatten()
            .filter(|s| s.timeout_secs.is_some() || s.max_retries.is_some())
            .map(|s| {
                let policy = StepPolicy {
                    timeout: s.timeout_secs.map(Duration::from_secs).unwrap_or(defaults.timeout),
                    retry: RetryPolicy {
                        max_retries: s.max_retries.unwrap_or(defaults.retry.max_retries),
                        base_backoff: defaults.retry.base_backoff,
                    },
                };
                (StepKind::new(s.kind.clone()), policy)
            })
            .collect();

        EngineSettings { defaults, overrides }
    }
}
