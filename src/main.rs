//! u-assign command-line entry point.
//!
//! Loads a problem (or the built-in dataset), solves it once and prints
//! the report to stdout. Logs go to stderr.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use u_assign::assign::{
    dataset, AssignmentReport, AssignmentRunner, ModelVariant, ProblemData, ProblemDocument,
};
use u_assign::config::RunConfig;
use u_assign::cp::{BranchAndBoundSolver, SolverConfig};
use u_assign::error::AssignError;

/// Solver engine selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Engine {
    /// MILP backend when no limit is set, branch-and-bound otherwise.
    Auto,
    /// MILP backend (`lp` feature); ignores search limits.
    Lp,
    /// Built-in branch-and-bound; honors every limit.
    Search,
}

#[derive(Debug, Parser)]
#[command(name = "u-assign", version, about = "Worker-task assignment solver")]
struct Cli {
    /// Model variant (overrides the model part of --config).
    #[arg(long)]
    variant: Option<ModelVariant>,

    /// Problem document (TOML, or JSON when the file ends in .json).
    #[arg(long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Run configuration (TOML with [model] and [solver] sections).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Solver time limit in milliseconds.
    #[arg(long, value_name = "N")]
    time_limit_ms: Option<u64>,

    /// Solver engine.
    #[arg(long, value_enum, default_value_t = Engine::Auto)]
    engine: Engine,
}

impl Cli {
    fn run_config(&self) -> anyhow::Result<RunConfig> {
        let mut run = match &self.config {
            Some(path) => RunConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RunConfig::variant(self.variant.unwrap_or(ModelVariant::General)),
        };
        if let (Some(variant), Some(_)) = (self.variant, &self.config) {
            run = RunConfig::variant(variant).with_solver(run.solver);
        }
        if let Some(ms) = self.time_limit_ms {
            run.solver = run.solver.with_time_limit_ms(ms);
        }
        Ok(run)
    }

    fn problem(&self) -> anyhow::Result<ProblemData> {
        Ok(match &self.data {
            Some(path) => ProblemDocument::load(path)
                .with_context(|| format!("loading problem {}", path.display()))?
                .into_problem()?,
            None => dataset::default_problem()?,
        })
    }
}

fn has_limits(solver: &SolverConfig) -> bool {
    solver.time_limit_ms.is_some() || solver.node_limit.is_some() || solver.stop_after_first
}

impl Engine {
    /// Resolves `Auto` against the solver limits of a run.
    fn resolve(self, solver: &SolverConfig) -> Self {
        match self {
            Engine::Auto if has_limits(solver) => Engine::Search,
            Engine::Auto => Engine::Lp,
            chosen => chosen,
        }
    }
}

#[cfg(feature = "lp")]
fn solve_lp(data: &ProblemData, run: &RunConfig) -> Result<AssignmentReport, AssignError> {
    AssignmentRunner::run(data, &run.model, &u_assign::cp::LpSolver::new(), &run.solver)
}

#[cfg(not(feature = "lp"))]
fn solve_lp(data: &ProblemData, run: &RunConfig) -> Result<AssignmentReport, AssignError> {
    tracing::warn!("built without the lp feature, using branch-and-bound");
    solve_search(data, run)
}

fn solve_search(data: &ProblemData, run: &RunConfig) -> Result<AssignmentReport, AssignError> {
    AssignmentRunner::run(data, &run.model, &BranchAndBoundSolver::new(), &run.solver)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "u_assign=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let run = cli.run_config()?;
    let data = cli.problem()?;

    let engine = cli.engine.resolve(&run.solver);
    info!(
        event = "problem_loaded",
        workers = data.worker_count(),
        tasks = data.task_count(),
        engine = ?engine,
    );

    let report = match engine {
        Engine::Lp => solve_lp(&data, &run)?,
        Engine::Search | Engine::Auto => solve_search(&data, &run)?,
    };
    print!("{report}");
    Ok(())
}
