//! Application payload submitted by a vendor

use crate::core::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Supporting document types accepted at onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    PanCard,
    UdyamCertificate,
    TradeLicense,
}

/// Reference to an uploaded document; the file itself lives elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub kind: DocumentKind,
    pub file_name: String,
}

/// Vendor onboarding application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPayload {
    #[serde(default)]
    pub vendor_name: String,

    #[serde(default)]
    pub gstin: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default)]
    pub documents: Vec<DocumentRef>,
}

impl ApplicationPayload {
    /// Check the identifiers every step needs to run
    pub fn require_identifiers(&self) -> Result<(), PipelineError> {
        let missing: Vec<&str> = [("vendorName", &self.vendor_name), ("gstin", &self.gstin)]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::InvalidPayload(format!(
                "missing required identifiers: {}",
                missing.join(", ")
            )))
        }
    }

    /// Check every field the onboarding form marks as required
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.require_identifiers()?;

        let missing: Vec<&str> = [
            ("email", &self.email),
            ("address", &self.address),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(PipelineError::InvalidPayload(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        if let Some(doc) = self.documents.iter().find(|d| d.file_name.trim().is_empty()) {
            return Err(PipelineError::InvalidPayload(format!(
                "document {:?} has an empty file name",
                doc.kind
            )));
        }

        Ok(())
    }

    /// PAN with surrounding whitespace removed, if one was given
    pub fn pan(&self) -> Option<&str> {
        self.pan.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }
}
