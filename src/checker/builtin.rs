//! Built-in offline checkers
//!
//! These validate identifiers structurally. Live registry lookups are
//! plugged in through [`CommandChecker`](super::CommandChecker) or a
//! custom [`Checker`] implementation.

use super::{CheckOutcome, Checker, CheckerError};
use crate::core::{ApplicationPayload, StepKind};
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, OnceLock};

const GSTIN_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

fn gstin_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("GSTIN pattern is valid")
    })
}

fn pan_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("PAN pattern is valid"))
}

/// Expected GSTIN check character for the first 14 characters
fn gstin_check_char(gstin: &str) -> Option<char> {
    let mut sum = 0u32;
    for (i, byte) in gstin.bytes().take(14).enumerate() {
        let value = GSTIN_ALPHABET.iter().position(|c| *c == byte)? as u32;
        let product = value * if i % 2 == 0 { 1 } else { 2 };
        sum += product / 36 + product % 36;
    }
    let check = ((36 - sum % 36) % 36) as usize;
    Some(GSTIN_ALPHABET[check] as char)
}

fn normalize(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}

/// Validates GSTIN structure and check character
#[derive(Debug, Default, Clone)]
pub struct GstinFormatChecker;

#[async_trait]
impl Checker for GstinFormatChecker {
    async fn check(&self, _kind: &StepKind, payload: &ApplicationPayload) -> Result<CheckOutcome, CheckerError> {
        let gstin = normalize(&payload.gstin);

        if !gstin_pattern().is_match(&gstin) {
            return Ok(CheckOutcome::failure(format!("GSTIN {} is not a valid 15-character GSTIN", gstin)));
        }

        match gstin_check_char(&gstin) {
            Some(expected) if gstin.ends_with(expected) => {
                Ok(CheckOutcome::success(format!("GSTIN {} format verified", gstin)))
            }
            _ => Ok(CheckOutcome::failure(format!("GSTIN {} has an invalid check character", gstin))),
        }
    }
}

/// Checks the PAN against the one embedded in the GSTIN
#[derive(Debug, Default, Clone)]
pub struct PanMatchChecker;

#[async_trait]
impl Checker for PanMatchChecker {
    async fn check(&self, _kind: &StepKind, payload: &ApplicationPayload) -> Result<CheckOutcome, CheckerError> {
        let Some(pan) = payload.pan().map(normalize) else {
            return Ok(CheckOutcome::failure("PAN not provided"));
        };

        if !pan_pattern().is_match(&pan) {
            return Ok(CheckOutcome::failure(format!("PAN {} is not a valid PAN", pan)));
        }

        let gstin = normalize(&payload.gstin);
        match gstin.get(2..12) {
            Some(embedded) if embedded == pan => Ok(CheckOutcome::success("PAN matches GSTIN")),
            _ => Ok(CheckOutcome::failure("PAN does not match GSTIN")),
        }
    }
}

/// Checks that supporting documents were supplied in an accepted format
#[derive(Debug, Default, Clone)]
pub struct DocumentChecker;

#[async_trait]
impl Checker for DocumentChecker {
    async fn check(&self, _kind: &StepKind, payload: &ApplicationPayload) -> Result<CheckOutcome, CheckerError> {
        if payload.documents.is_empty() {
            return Ok(CheckOutcome::failure("No supporting documents provided"));
        }

        for doc in &payload.documents {
            let extension = Path::new(&doc.file_name)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
                return Ok(CheckOutcome::failure(format!(
                    "Unsupported file type for {}",
                    doc.file_name
                )));
            }
        }

        Ok(CheckOutcome::success(format!(
            "{} document(s) accepted",
            payload.documents.len()
        )))
    }
}

/// Built-in checker for a step kind, if there is one
pub fn for_kind(kind: &StepKind) -> Option<Arc<dyn Checker>> {
    match kind.as_str() {
        "gstin" => Some(Arc::new(GstinFormatChecker)),
        "pan" => Some(Arc::new(PanMatchChecker)),
        "documents" => Some(Arc::new(DocumentChecker)),
        _ => None,
    }
}
