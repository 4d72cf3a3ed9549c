//! Test: Blocking Failure - a failed blocking step invalidates the application

use crate::helpers::*;
use vendor_verify::checker::CheckerError;
use vendor_verify::core::{OverallStatus, StepDefinition, StepRegistry};
use vendor_verify::execution::{FailureReason, VerificationEvent, UNAVAILABLE_MESSAGE};

/// GSTIN rejected: PAN and documents are skipped, progress still reaches 100
#[tokio::test]
async fn test_gstin_rejection_skips_remaining_steps() {
    let checker = ScriptedChecker::new().reject("gstin", "GSTIN is cancelled");

    let result = run_with_script(checker, 2).await;

    assert_eq!(result.status, OverallStatus::Failed);
    assert_eq!(result.pipeline.progress_percent(), 100.0);
    assert_step_failed(&result, "gstin", "GSTIN is cancelled");
    assert_step_skipped(&result, "pan");
    assert_step_skipped(&result, "documents");
    assert_eq!(result.checker.call_count("gstin"), 1);

    let skipped = result.events.iter().find_map(|e| match e {
        VerificationEvent::StepsSkipped { kinds, .. } => Some(kinds.len()),
        _ => None,
    });
    assert_eq!(skipped, Some(2));
}

/// An unreachable blocking checker is recorded as "unavailable" and still blocks
#[tokio::test]
async fn test_unavailable_blocking_step() {
    let checker = ScriptedChecker::new().script(
        "gstin",
        vec![
            Err(CheckerError::Transport("connection refused".to_string())),
            Err(CheckerError::Transport("connection refused".to_string())),
        ],
    );

    let result = run_with_script(checker, 1).await;

    assert_eq!(result.status, OverallStatus::Failed);
    assert_step_failed(&result, "gstin", UNAVAILABLE_MESSAGE);
    assert_step_skipped(&result, "pan");
    assert!(result.events.iter().any(|e| matches!(
        e,
        VerificationEvent::StepFailed {
            reason: FailureReason::Unavailable(_),
            ..
        }
    )));
}

/// A blocking step in the middle only skips what comes after it
#[tokio::test]
async fn test_blocking_failure_mid_pipeline() {
    let registry = StepRegistry::new(vec![
        StepDefinition::new("gstin", "GSTIN Validation", 1, true),
        StepDefinition::new("bank", "Bank Account Check", 2, true),
        StepDefinition::new("documents", "Document Validation", 3, false),
    ])
    .unwrap();
    let checker = ScriptedChecker::new()
        .pass("gstin", "GSTIN active")
        .reject("bank", "Account holder name mismatch");

    let result = run_registry_with_script(registry, checker, 0).await;

    assert_eq!(result.status, OverallStatus::Failed);
    assert_step_completed(&result, "gstin", "GSTIN active");
    assert_step_failed(&result, "bank", "mismatch");
    assert_step_skipped(&result, "documents");
}
