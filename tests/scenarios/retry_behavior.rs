//! Test: Retry Behavior - transient checker errors are retried, rejections are not

use crate::helpers::*;
use std::time::Duration;
use vendor_verify::checker::{CheckOutcome, CheckerError};
use vendor_verify::core::OverallStatus;

#[tokio::test]
async fn test_transient_error_then_success() {
    let checker = ScriptedChecker::new()
        .script(
            "gstin",
            vec![
                Err(CheckerError::Transport("502 from GST portal".to_string())),
                Err(CheckerError::Timeout(Duration::from_millis(200))),
                Ok(CheckOutcome::success("GSTIN active")),
            ],
        )
        .pass("pan", "ok")
        .pass("documents", "ok");

    let result = run_with_script(checker, 2).await;

    assert_eq!(result.status, OverallStatus::Completed);
    assert_step_completed(&result, "gstin", "GSTIN active");
    assert_eq!(result.checker.call_count("gstin"), 3);
    assert_eq!(result.retries_for("gstin"), vec![1, 2]);
}

#[tokio::test]
async fn test_retry_budget_is_bounded() {
    let checker = ScriptedChecker::new()
        .pass("gstin", "ok")
        .script(
            "pan",
            vec![
                Err(CheckerError::Transport("reset".to_string())),
                Err(CheckerError::Transport("reset".to_string())),
                Err(CheckerError::Transport("reset".to_string())),
                Ok(CheckOutcome::success("too late")),
            ],
        )
        .pass("documents", "ok");

    let result = run_with_script(checker, 2).await;

    assert_eq!(result.checker.call_count("pan"), 3);
    assert_step_failed(&result, "pan", "unavailable");
    assert_eq!(result.status, OverallStatus::CompletedWithWarnings);
}

#[tokio::test]
async fn test_rejection_is_never_retried() {
    let checker = ScriptedChecker::new()
        .pass("gstin", "ok")
        .script(
            "pan",
            vec![
                Ok(CheckOutcome::failure("PAN does not match GSTIN")),
                Ok(CheckOutcome::success("should not be reached")),
            ],
        )
        .pass("documents", "ok");

    let result = run_with_script(checker, 3).await;

    assert_eq!(result.checker.call_count("pan"), 1);
    assert!(result.retries_for("pan").is_empty());
    assert_step_failed(&result, "pan", "PAN does not match GSTIN");
}

#[tokio::test]
async fn test_slow_checker_times_out() {
    // fast_settings bounds each call at 200ms
    let checker = ScriptedChecker::new()
        .with_delay(Duration::from_millis(500))
        .pass("gstin", "too slow");

    let result = run_with_script(checker, 0).await;

    assert_eq!(result.status, OverallStatus::Failed);
    assert_step_failed(&result, "gstin", "unavailable");
    assert_step_skipped(&result, "pan");
}
