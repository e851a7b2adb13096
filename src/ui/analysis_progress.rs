//! Analysis run progress UI.
//!
//! Consumes [`AnalysisEvent`]s in one of three modes:
//! - `full`: one spinner per task with colored status icons
//! - `minimal`: one plain line per event
//! - `json`: one JSON object per event on stdout

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use console::{Term, style};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use sbos_common::TaskKind;
use sbos_common::contracts::{DiagnosticReport, MoneyLeakReport};

use crate::analysis::{AnalysisEvent, AnalysisRunState, RunSummary, TaskFailure};
use crate::ui::icons::{CHECK, CLOCK, CROSS, RUNNING, SKIP, SPARKLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    /// Spinners and colors
    #[default]
    Full,
    /// Plain status lines
    Minimal,
    /// Newline-delimited JSON events
    Json,
}

impl std::str::FromStr for UiMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "minimal" => Ok(Self::Minimal),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Invalid UI mode '{}'. Valid values: full, minimal, json", s),
        }
    }
}

impl std::fmt::Display for UiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UiMode::Full => write!(f, "full"),
            UiMode::Minimal => write!(f, "minimal"),
            UiMode::Json => write!(f, "json"),
        }
    }
}

/// Renders progress for one analysis run.
pub struct AnalysisUi {
    mode: UiMode,
    multi: MultiProgress,
    bars: HashMap<TaskKind, ProgressBar>,
    verbose: bool,
    term: Term,
}

impl AnalysisUi {
    pub fn new(mode: UiMode, verbose: bool) -> Self {
        Self {
            mode,
            multi: MultiProgress::new(),
            bars: HashMap::new(),
            verbose,
            term: Term::stdout(),
        }
    }

    pub fn mode(&self) -> UiMode {
        self.mode
    }

    pub fn handle_event(&mut self, event: &AnalysisEvent) {
        match self.mode {
            UiMode::Json => {
                if let Some(line) = json_line(event) {
                    let _ = writeln!(&self.term, "{}", line);
                }
            }
            UiMode::Minimal => {
                if let Some(line) = minimal_line(event) {
                    let _ = writeln!(&self.term, "{}", line);
                }
            }
            UiMode::Full => self.handle_full(event),
        }
    }

    fn handle_full(&mut self, event: &AnalysisEvent) {
        match event {
            AnalysisEvent::RunStarted { company, .. } => {
                self.println(format!(
                    "{}Analyzing {}",
                    SPARKLE,
                    style(company).bold()
                ));
            }
            AnalysisEvent::PhaseStarted { phase, tasks } => {
                if self.verbose {
                    let ids: Vec<&str> = tasks.iter().map(|t| t.id()).collect();
                    self.println(format!(
                        "{} Phase {}: {}",
                        style("═".repeat(8)).cyan(),
                        style(phase).yellow().bold(),
                        style(ids.join(", ")).dim()
                    ));
                }
            }
            AnalysisEvent::TaskStarted { task } => self.on_task_started(*task),
            AnalysisEvent::TaskCompleted { task, .. } => {
                if let Some(bar) = self.bars.remove(task) {
                    bar.finish_with_message(format!("{}{}", CHECK, style("done").green()));
                }
            }
            AnalysisEvent::TaskFailed { task, failure } => {
                if let Some(bar) = self.bars.remove(task) {
                    bar.finish_with_message(format!(
                        "{}{}",
                        CROSS,
                        style(failure_summary(failure)).red()
                    ));
                }
            }
            AnalysisEvent::GrowthPlanSkipped { missing } => {
                self.println(format!(
                    "  {}{} skipped, needs {}",
                    SKIP,
                    style(TaskKind::GrowthPlan.display_name()).yellow(),
                    task_names(missing)
                ));
            }
            AnalysisEvent::RunCompleted { summary } => {
                for (_, bar) in self.bars.drain() {
                    bar.abandon();
                }
                self.println(format!(
                    "{}{} succeeded, {} failed, {} skipped{}",
                    CLOCK,
                    style(summary.succeeded).green().bold(),
                    style(summary.failed).red(),
                    style(summary.skipped).yellow(),
                    duration_suffix(summary)
                ));
            }
        }
    }

    fn on_task_started(&mut self, task: TaskKind) {
        let bar = self.multi.add(ProgressBar::new_spinner());
        if let Ok(spinner) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {prefix:.bold} {msg}") {
            bar.set_style(spinner);
        }
        bar.set_prefix(format!("{:<16}", task.display_name()));
        bar.set_message(format!("{}running", RUNNING));
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bars.insert(task, bar);
    }

    fn println(&self, line: String) {
        self.multi.println(line).ok();
    }

    /// Headline numbers and per-task status after the run.
    pub fn print_final(&self, state: &AnalysisRunState) {
        if self.mode == UiMode::Json {
            return;
        }
        for line in final_report(state) {
            let _ = writeln!(&self.term, "{}", line);
        }
    }
}

fn json_line(event: &AnalysisEvent) -> Option<String> {
    serde_json::to_string(event).ok()
}

fn minimal_line(event: &AnalysisEvent) -> Option<String> {
    let line = match event {
        AnalysisEvent::RunStarted { company, run_id } => format!("Run {} for {}", run_id, company),
        AnalysisEvent::PhaseStarted { phase, tasks } => {
            let ids: Vec<&str> = tasks.iter().map(|t| t.id()).collect();
            format!("Phase {}: {}", phase, ids.join(", "))
        }
        AnalysisEvent::TaskStarted { .. } => return None,
        AnalysisEvent::TaskCompleted { task, .. } => format!("✓ {}", task),
        AnalysisEvent::TaskFailed { task, failure } => {
            format!("✗ {} ({})", task, failure_summary(failure))
        }
        AnalysisEvent::GrowthPlanSkipped { missing } => {
            format!("⏭ {} (needs {})", TaskKind::GrowthPlan, task_ids(missing))
        }
        AnalysisEvent::RunCompleted { summary } => format!(
            "Done: {}/{} succeeded, {} failed, {} skipped",
            summary.succeeded, summary.total, summary.failed, summary.skipped
        ),
    };
    Some(line)
}

fn failure_summary(failure: &TaskFailure) -> String {
    failure.message.lines().next().unwrap_or_default().to_string()
}

fn task_ids(tasks: &[TaskKind]) -> String {
    tasks.iter().map(|t| t.id()).collect::<Vec<_>>().join(", ")
}

fn task_names(tasks: &[TaskKind]) -> String {
    tasks
        .iter()
        .map(|t| t.display_name())
        .collect::<Vec<_>>()
        .join(" and ")
}

fn duration_suffix(summary: &RunSummary) -> String {
    summary
        .duration_ms
        .map(|ms| format!(" in {:.1}s", ms as f64 / 1000.0))
        .unwrap_or_default()
}

/// Plain-text lines describing a finished run.
pub fn final_report(state: &AnalysisRunState) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(report) = state.decode::<DiagnosticReport>() {
        lines.push(format!("Health score: {}/100", report.overall_score));
    }
    if let Some(report) = state.decode::<MoneyLeakReport>() {
        lines.push(format!(
            "Potential savings: ${:.0}/mo across {} leaks",
            report.potential_savings,
            report.leaks.len()
        ));
    }
    for task in TaskKind::ALL {
        let status = state.status(task);
        let detail = match state.outcome(task).and_then(|o| o.failure()) {
            Some(failure) => format!(" ({})", failure_summary(failure)),
            None => String::new(),
        };
        lines.push(format!(
            "  {:<16} {:?}{}",
            task.display_name(),
            status,
            detail
        ));
    }
    lines
}
