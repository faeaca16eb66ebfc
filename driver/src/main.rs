//! Planner entry point.
//!
//! Reads the task from stdin, binds the configuration to it in two phases
//! (task-independent factories, then task-specific components through a
//! shared component map), runs the search under its wall-clock budget,
//! writes plan files and statistics, and maps the outcome to an exit code.

#![forbid(unsafe_code)]

mod config;
mod exit_code;
mod plan_manager;
mod report;

use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use clap::{CommandFactory, FromArgMatches, Parser};
use tracing::{error, info};

use foray_search::component::{build_search_engine, ComponentMap, SearchEngineFactory};
use foray_search::engine::SearchStatus;
use foray_search::error::BuildError;
use foray_task::parse::read_task;

use exit_code::ExitCode;
use plan_manager::PlanManager;

#[derive(Parser)]
#[command(
    name = "foray",
    about = "Eager best-first search over planning tasks (task on stdin)"
)]
struct Cli {
    /// Search configuration, e.g. `eager(single(blind()))`.
    search_spec: String,

    /// Predefine a named evaluator as NAME=EXPR. Repeatable; later
    /// definitions and the search configuration can reference earlier
    /// names, and every reference shares one instance.
    #[arg(long = "evaluator", value_name = "NAME=EXPR")]
    evaluators: Vec<String>,

    /// Plan file; anytime configurations append .1, .2, ...
    #[arg(long, value_name = "PATH", default_value = "sas_plan")]
    plan_file: PathBuf,

    /// Write a machine-readable run report to this path.
    #[arg(long, value_name = "PATH")]
    stats_json: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let matches = Cli::command()
        .after_help(config::registry::help_text())
        .get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            ExitCode::SearchInputError.report_and_exit();
        }
    };

    run(&cli).report_and_exit();
}

fn run(cli: &Cli) -> ExitCode {
    info!("reading input...");
    let task = match read_task(io::stdin().lock()) {
        Ok(task) => Rc::new(task),
        Err(err) => {
            error!("malformed task input: {err}");
            return ExitCode::SearchInputError;
        }
    };
    info!(
        "done reading input: {} variables, {} operators, {} axioms, {} mutex groups",
        task.variables.len(),
        task.operators.len(),
        task.axioms.len(),
        task.mutex_groups.len()
    );

    info!("creating task-independent components...");
    let engine_factory = match config::parse_configuration(&cli.search_spec, &cli.evaluators) {
        Ok(factory) => factory,
        Err(err) => {
            error!("configuration error: {err}");
            return ExitCode::SearchInputError;
        }
    };
    if let Err(err) = engine_factory.validate(&task) {
        error!("{err}");
        return match err {
            BuildError::LazyEvaluatorDoesNotCache { .. } => ExitCode::SearchInputError,
            BuildError::UnsupportedTaskFeature { .. } => ExitCode::SearchUnsupported,
        };
    }

    info!("creating task-specific components...");
    let mut component_map = ComponentMap::new(Rc::clone(&task));
    let mut engine = build_search_engine(&engine_factory, &mut component_map, 0);

    let search_timer = Instant::now();
    let status = engine.search();
    let search_time = search_timer.elapsed();

    engine.print_statistics();
    info!("Search time: {:.6}s", search_time.as_secs_f64());

    // Statistics and any plan found so far are flushed on every
    // termination path, resource exhaustion included.
    let anytime = matches!(&*engine_factory, SearchEngineFactory::Iterated(_));
    let mut plan_manager = PlanManager::new(cli.plan_file.clone());
    for (plan, _) in engine.found_plans() {
        if let Err(err) = plan_manager.save_plan(plan, &task, anytime) {
            error!("failed to write plan file: {err}");
            return ExitCode::SearchCriticalError;
        }
    }

    if let Some(path) = &cli.stats_json {
        if let Err(err) = report::write_report(
            path,
            &task,
            status,
            engine.statistics(),
            engine.found_plans(),
            search_time,
        ) {
            error!("failed to write run report: {err:#}");
            return ExitCode::SearchCriticalError;
        }
    }

    match status {
        SearchStatus::Solved => {
            info!("Search finished: solution found.");
            ExitCode::Success
        }
        SearchStatus::Failed => {
            info!("Search finished: no solution.");
            ExitCode::SearchUnsolvedIncomplete
        }
        SearchStatus::Timeout => ExitCode::SearchTimeout,
        SearchStatus::OutOfMemory => ExitCode::SearchOutOfMemory,
        SearchStatus::InProgress => unreachable!("search() never returns InProgress"),
    }
}
