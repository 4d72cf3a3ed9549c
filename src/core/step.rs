//! Step domain model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a verification step kind (e.g. `gstin`, `pan`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepKind(String);

impl StepKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepKind {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl PartialEq<str> for StepKind {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StepKind {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Immutable descriptor of one verification step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    /// Unique step identifier
    pub kind: StepKind,

    /// Human-readable step name
    pub display_name: String,

    /// Position in execution order, starting at 1
    pub ordinal: u32,

    /// Whether a failure of this step invalidates the application
    pub is_blocking: bool,
}

impl StepDefinition {
    pub fn new(kind: impl Into<String>, display_name: impl Into<String>, ordinal: u32, is_blocking: bool) -> Self {
        Self {
            kind: StepKind::new(kind),
            display_name: display_name.into(),
            ordinal,
            is_blocking,
        }
    }
}
