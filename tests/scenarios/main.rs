//! Scenario-based tests for vendor-verify

mod helpers;

mod advisory_failure;
mod blocking_failure;
mod builtin_checkers;
mod retry_behavior;
