//! Test: Advisory Failure - non-blocking failures only produce warnings

use crate::helpers::*;
use vendor_verify::checker::CheckerError;
use vendor_verify::core::OverallStatus;

/// GSTIN ok, PAN rejected, documents ok
#[tokio::test]
async fn test_pan_mismatch_completes_with_warnings() {
    let checker = ScriptedChecker::new()
        .pass("gstin", "GSTIN active")
        .reject("pan", "PAN does not match GSTIN")
        .pass("documents", "2 document(s) accepted");

    let result = run_with_script(checker, 2).await;

    assert_eq!(result.status, OverallStatus::CompletedWithWarnings);
    assert_eq!(result.pipeline.progress_percent(), 100.0);
    assert_step_failed(&result, "pan", "PAN does not match GSTIN");
    assert_step_completed(&result, "documents", "accepted");
    assert_eq!(result.started_order(), vec!["gstin", "pan", "documents"]);
}

#[tokio::test]
async fn test_unavailable_advisory_step_does_not_block() {
    let checker = ScriptedChecker::new()
        .pass("gstin", "GSTIN active")
        .script("pan", vec![Err(CheckerError::Transport("registry offline".to_string()))])
        .reject("documents", "Unsupported file type for udyam.docx");

    let result = run_with_script(checker, 0).await;

    assert_eq!(result.status, OverallStatus::CompletedWithWarnings);
    assert_step_failed(&result, "pan", "unavailable");
    assert_step_failed(&result, "documents", "Unsupported file type");
}
