//! Test: Built-in Checkers - the default catalog end to end

use crate::helpers::*;
use std::sync::Arc;
use vendor_verify::checker::CheckerRouter;
use vendor_verify::core::config::VerifyConfig;
use vendor_verify::core::{ApplicationPayload, OverallStatus, StepStatus};
use vendor_verify::execution::{VerificationEngine, SKIPPED_MESSAGE};
use vendor_verify::gateway::SubmissionGateway;

fn gateway_from_config(config: &VerifyConfig) -> SubmissionGateway<CheckerRouter> {
    let registry = Arc::new(config.to_registry().unwrap());
    let checkers = config.checker_router(&registry).unwrap();
    SubmissionGateway::new(
        registry,
        VerificationEngine::new(checkers, config.engine_settings()),
        config.max_concurrent_pipelines,
    )
}

async fn verify(payload: ApplicationPayload) -> vendor_verify::core::PipelineSnapshot {
    let gateway = gateway_from_config(&VerifyConfig::default());
    let handle = gateway.submit(payload).await.unwrap();
    gateway.wait_for_completion(handle.application_id()).await.unwrap()
}

#[tokio::test]
async fn test_valid_application_completes() {
    let done = verify(sample_payload()).await;

    assert_eq!(done.overall_status, OverallStatus::Completed);
    assert_eq!(done.progress_percent, 100.0);
}

#[tokio::test]
async fn test_pan_mismatch_is_a_warning() {
    let done = verify(ApplicationPayload {
        pan: Some("AAGCB7383J".to_string()),
        ..sample_payload()
    })
    .await;

    assert_eq!(done.overall_status, OverallStatus::CompletedWithWarnings);
    let pan = done.step("pan").unwrap();
    assert_eq!(pan.status, StepStatus::Failed);
    assert_eq!(pan.message, "PAN does not match GSTIN");
    assert_eq!(done.step("documents").unwrap().status, StepStatus::Completed);
}

#[tokio::test]
async fn test_bad_gstin_check_character_blocks() {
    let done = verify(ApplicationPayload {
        gstin: "27AAPFU0939F1ZA".to_string(),
        ..sample_payload()
    })
    .await;

    assert_eq!(done.overall_status, OverallStatus::Failed);
    assert_eq!(done.progress_percent, 100.0);
    assert_eq!(done.step("gstin").unwrap().status, StepStatus::Failed);
    for kind in ["pan", "documents"] {
        assert_eq!(done.step(kind).unwrap().message, SKIPPED_MESSAGE);
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_configured_catalog_with_command_checker() {
    let yaml = r#"
steps:
  - kind: gstin
    display_name: "GSTIN Validation"
    ordinal: 1
    blocking: true
  - kind: sanctions
    display_name: "Sanctions Screening"
    ordinal: 2
    command: ["sh", "-c", "cat > /dev/null; echo '{\"outcome\":\"success\",\"message\":\"no matches\"}'"]
max_retries: 0
"#;
    let config = VerifyConfig::from_yaml(yaml).unwrap();
    let gateway = gateway_from_config(&config);
    let handle = gateway.submit(sample_payload()).await.unwrap();
    let done = gateway.wait_for_completion(handle.application_id()).await.unwrap();

    assert_eq!(done.steps.len(), 2);
    assert_eq!(done.step("sanctions").unwrap().display_name, "Sanctions Screening");
    assert_eq!(done.step("sanctions").unwrap().message, "no matches");
    assert_eq!(done.overall_status, OverallStatus::Completed);
}
