//! Step definition registry
//!
//! The registry is built once at startup and shared read-only afterwards.

use crate::core::{
    error::RegistryError,
    step::{StepDefinition, StepKind},
};
use std::collections::HashSet;

/// Ordered, validated catalog of step definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRegistry {
    definitions: Vec<StepDefinition>,
}

impl StepRegistry {
    /// Build a registry, sorting by ordinal and rejecting misconfiguration
    pub fn new(mut definitions: Vec<StepDefinition>) -> Result<Self, RegistryError> {
        if definitions.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::new();
        for def in &definitions {
            if !seen.insert(def.kind.clone()) {
                return Err(RegistryError::DuplicateKind(def.kind.clone()));
            }
        }

        definitions.sort_by_key(|d| d.ordinal);
        for (idx, def) in definitions.iter().enumerate() {
            let expected = idx as u32 + 1;
            if def.ordinal != expected {
                return Err(RegistryError::NonContiguousOrdinals {
                    expected,
                    found: def.ordinal,
                });
            }
        }

        Ok(Self { definitions })
    }

    /// The catalog used when no configuration overrides it
    pub fn default_catalog() -> Self {
        Self {
            definitions: vec![
                StepDefinition::new("gstin", "GSTIN Validation", 1, true),
                StepDefinition::new("pan", "PAN Match", 2, false),
                StepDefinition::new("documents", "Document Validation", 3, false),
            ],
        }
    }

    /// Definitions in execution order
    pub fn definitions(&self) -> &[StepDefinition] {
        &self.definitions
    }

    pub fn get(&self, kind: &StepKind) -> Option<&StepDefinition> {
        self.definitions.iter().find(|d| &d.kind == kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &StepKind> {
        self.definitions.iter().map(|d| &d.kind)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::default_catalog()
    }
}
