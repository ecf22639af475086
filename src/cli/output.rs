//! CLI output formatting

use crate::{
    core::{ExecutionStatus, InstallPhase, RunState, StepStatus},
    execution::InstallEvent,
    requirements::{CheckStatus, RequirementReport},
};
use std::time::Duration;

// Re-export style
pub use console::style;
use console::Emoji;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format a phase heading
pub fn format_phase(phase: InstallPhase) -> String {
    match phase {
        InstallPhase::Done => format!("{} {}", CHECK, style(phase.label()).green().bold()),
        InstallPhase::Failed => format!("{} {}", CROSS, style(phase.label()).red().bold()),
        _ => format!("{} {}", ROCKET, style(phase.label()).bold()),
    }
}

/// Render one requirement category as a small table
pub fn render_requirement_report(report: &RequirementReport) -> String {
    let mut out = format!("{}", style(report.category.label()).bold().underlined());

    if report.checks().is_empty() {
        out.push_str(&format!("\n  {}", style("nothing to check").dim()));
        return out;
    }

    let width = report
        .checks()
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0);

    for check in report.checks() {
        let (icon, message) = match check.status {
            CheckStatus::Pass => (CHECK, style(check.message.as_str()).green()),
            CheckStatus::Warn => (WARN, style(check.message.as_str()).yellow()),
            CheckStatus::Fail => (CROSS, style(check.message.as_str()).red()),
        };
        out.push_str(&format!(
            "\n  {}{:<width$}  {}",
            icon,
            check.name,
            message,
            width = width
        ));
    }

    out
}

/// Format an install event for display; `None` when nothing should be printed
pub fn format_install_event(event: &InstallEvent) -> Option<String> {
    let line = match event {
        InstallEvent::InstallStarted { execution_id } => format!(
            "{} Installing DiamanteDesk ({})",
            ROCKET,
            style(&execution_id.to_string()[..8]).dim()
        ),
        InstallEvent::PhaseStarted { phase } => match phase {
            InstallPhase::Start | InstallPhase::Done | InstallPhase::Failed => return None,
            _ => format!("\n{}", format_phase(*phase)),
        },
        InstallEvent::RequirementsChecked { report } => render_requirement_report(report),
        InstallEvent::StepStarted { command, .. } => {
            format!("{} {}", SPINNER, style(command).cyan())
        }
        InstallEvent::StepCompleted { command, duration } => format!(
            "{} {} {}",
            CHECK,
            style(command).green(),
            style(format_duration(*duration)).dim()
        ),
        InstallEvent::StepFailed { command, error } => {
            format!("{} {}: {}", CROSS, style(command).red(), style(error).dim())
        }
        InstallEvent::StepIgnored { command, error } => format!(
            "{} {}: {} ({})",
            WARN,
            style(command).yellow(),
            style(error).dim(),
            style("ignored").yellow()
        ),
        InstallEvent::StepSkipped { command, reason } => {
            format!("{} {} skipped: {}", INFO, style(command).dim(), reason)
        }
        InstallEvent::SettingsSaved { changed } => {
            format!("{} System settings saved ({} changed)", INFO, style(changed).cyan())
        }
        InstallEvent::InstallFinished {
            execution_id,
            phase,
        } => {
            let status = match phase {
                InstallPhase::Done => format!("completed {}", style("successfully").green()),
                _ => style("failed").red().to_string(),
            };
            format!(
                "\n{} Installation ({}) {}",
                INFO,
                style(&execution_id.to_string()[..8]).dim(),
                status
            )
        }
    };

    Some(line)
}

/// One-line summary of a finished run
pub fn format_run_summary(state: &RunState) -> String {
    let succeeded = state
        .outcomes()
        .iter()
        .filter(|o| o.status == StepStatus::Succeeded)
        .count();

    let mut summary = format!(
        "{} - {} commands succeeded",
        format_status(state.status),
        style(succeeded).cyan()
    );
    if state.ignored_failures() > 0 {
        summary.push_str(&format!(
            ", {} ignored failures",
            style(state.ignored_failures()).yellow()
        ));
    }
    if let (Some(started), Some(completed)) = (state.started_at, state.completed_at) {
        if let Ok(duration) = completed.signed_duration_since(started).to_std() {
            summary.push_str(&format!(" in {}", style(format_duration(duration)).dim()));
        }
    }
    summary
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
