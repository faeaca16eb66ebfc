//! Optional machine-readable run report.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Serialize;

use foray_search::engine::{Plan, SearchStatus};
use foray_search::statistics::SearchStatistics;
use foray_task::task::PlanningTask;

#[derive(Serialize)]
struct TaskReport {
    variables: usize,
    operators: usize,
    axioms: usize,
    mutex_groups: usize,
    unit_cost: bool,
}

#[derive(Serialize)]
struct SearchReport {
    status: &'static str,
    plan_cost: Option<i32>,
    plan_length: Option<usize>,
    plans_found: usize,
    expanded: u64,
    evaluated_states: u64,
    evaluations: u64,
    generated: u64,
    reopened: u64,
    dead_ends: u64,
}

#[derive(Serialize)]
struct RunReport {
    task: TaskReport,
    search: SearchReport,
    search_seconds: f64,
}

fn status_name(status: SearchStatus) -> &'static str {
    match status {
        SearchStatus::InProgress => "in_progress",
        SearchStatus::Solved => "solved",
        SearchStatus::Failed => "failed",
        SearchStatus::Timeout => "timeout",
        SearchStatus::OutOfMemory => "out_of_memory",
    }
}

/// Serialize the run outcome as pretty JSON at `path`.
///
/// # Errors
///
/// Propagates serialization and file-system failures with context.
pub fn write_report(
    path: &Path,
    task: &PlanningTask,
    status: SearchStatus,
    statistics: &SearchStatistics,
    plans: &[(Plan, i32)],
    search_time: Duration,
) -> anyhow::Result<()> {
    let best = plans.last();
    let report = RunReport {
        task: TaskReport {
            variables: task.variables.len(),
            operators: task.operators.len(),
            axioms: task.axioms.len(),
            mutex_groups: task.mutex_groups.len(),
            unit_cost: task.is_unit_cost(),
        },
        search: SearchReport {
            status: status_name(status),
            plan_cost: best.map(|(_, cost)| *cost),
            plan_length: best.map(|(plan, _)| plan.len()),
            plans_found: plans.len(),
            expanded: statistics.expanded(),
            evaluated_states: statistics.evaluated_states(),
            evaluations: statistics.evaluations(),
            generated: statistics.generated(),
            reopened: statistics.reopened(),
            dead_ends: statistics.dead_ends(),
        },
        search_seconds: search_time.as_secs_f64(),
    };
    let json = serde_json::to_string_pretty(&report).context("serializing the run report")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
