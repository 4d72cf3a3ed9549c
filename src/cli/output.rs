//! CLI output formatting

use crate::{
    core::{OverallStatus, PipelineSnapshot, StepDefinition, StepStatus},
    execution::{FailureReason, VerificationEvent},
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use uuid::Uuid;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar counting finished steps
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Format a step status for display
pub fn format_step_status(status: StepStatus) -> String {
    match status {
        StepStatus::Pending => style("PENDING").dim().to_string(),
        StepStatus::InProgress => style("IN PROGRESS").yellow().to_string(),
        StepStatus::Completed => style("COMPLETED").green().to_string(),
        StepStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format an overall status for display
pub fn format_overall_status(status: OverallStatus) -> String {
    match status {
        OverallStatus::Pending => style("PENDING").dim().to_string(),
        OverallStatus::InProgress => style("IN PROGRESS").yellow().to_string(),
        OverallStatus::Completed => style("COMPLETED").green().to_string(),
        OverallStatus::CompletedWithWarnings => style("COMPLETED WITH WARNINGS").yellow().to_string(),
        OverallStatus::Failed => style("FAILED").red().to_string(),
    }
}

fn status_icon(status: OverallStatus) -> Emoji<'static, 'static> {
    match status {
        OverallStatus::Completed => CHECK,
        OverallStatus::CompletedWithWarnings => WARN,
        OverallStatus::Failed => CROSS,
        OverallStatus::InProgress => SPINNER,
        OverallStatus::Pending => INFO,
    }
}

/// One-line summary of an application for history listings
pub fn format_snapshot_summary(snapshot: &PipelineSnapshot) -> String {
    format!(
        "{} {} - {} - {} ({}/{}) - {}",
        status_icon(snapshot.overall_status),
        style(short_id(snapshot.application_id)).dim(),
        style(snapshot.created_at.format("%Y-%m-%d %H:%M:%S")).bold(),
        format_overall_status(snapshot.overall_status),
        snapshot.finished_steps(),
        snapshot.steps.len(),
        style(format!("{:.0}%", snapshot.progress_percent)).cyan()
    )
}

/// Multi-line breakdown of every step
pub fn format_snapshot_details(snapshot: &PipelineSnapshot) -> String {
    let mut lines = vec![
        format!("{} Application Details", INFO),
        format!("  ID: {}", style(snapshot.application_id).cyan()),
        format!("  Status: {}", format_overall_status(snapshot.overall_status)),
        format!("  Submitted: {}", style(snapshot.created_at.to_rfc3339()).dim()),
        format!(
            "  Progress: {} ({}/{})",
            style(format!("{:.0}%", snapshot.progress_percent)).cyan(),
            snapshot.finished_steps(),
            snapshot.steps.len()
        ),
        String::new(),
    ];

    for step in &snapshot.steps {
        let mut line = format!(
            "  {:<24} {}",
            style(&step.display_name).bold(),
            format_step_status(step.status)
        );
        if !step.message.is_empty() {
            line.push_str(&format!(" {}", style(&step.message).dim()));
        }
        lines.push(line);
    }

    lines.join("\n")
}

/// Format the step catalog for display
pub fn format_step_definition(definition: &StepDefinition) -> String {
    let blocking = if definition.is_blocking {
        style("blocking").red().to_string()
    } else {
        style("advisory").dim().to_string()
    };
    format!(
        "  {}. {} ({}) - {}",
        definition.ordinal,
        style(&definition.display_name).bold(),
        style(&definition.kind).cyan(),
        blocking
    )
}

/// Format a verification event for display
pub fn format_verification_event(event: &VerificationEvent) -> String {
    match event {
        VerificationEvent::PipelineStarted {
            application_id,
            total_steps,
        } => format!(
            "{} Verifying application {} ({} steps)",
            ROCKET,
            style(short_id(*application_id)).dim(),
            total_steps
        ),
        VerificationEvent::StepStarted { kind, .. } => format!("{} {}", SPINNER, style(kind).cyan()),
        VerificationEvent::StepRetrying { kind, retry, cause, .. } => format!(
            "{} {} (retry {}: {})",
            WARN,
            style(kind).yellow(),
            retry,
            style(cause).dim()
        ),
        VerificationEvent::StepCompleted { kind, message, .. } => {
            format!("{} {}: {}", CHECK, style(kind).green(), style(message).dim())
        }
        VerificationEvent::StepFailed {
            kind,
            message,
            reason,
            ..
        } => match reason {
            FailureReason::Rejected => format!("{} {}: {}", CROSS, style(kind).red(), style(message).dim()),
            FailureReason::Unavailable(cause) => format!(
                "{} {}: {} ({})",
                CROSS,
                style(kind).red(),
                message,
                style(cause).dim()
            ),
        },
        VerificationEvent::StepsSkipped { kinds, .. } => {
            let names: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
            format!("{} Skipped {}", INFO, style(names.join(", ")).dim())
        }
        VerificationEvent::PipelineFinished {
            application_id,
            status,
        } => format!(
            "{} Application ({}) {}",
            status_icon(*status),
            style(short_id(*application_id)).dim(),
            format_overall_status(*status)
        ),
    }
}
