//! Result interpretation: solver output back into domain terms.

use std::fmt;

use super::builder::AssignmentModel;
use super::data::ProblemData;
use crate::cp::{CpSolution, SolverStatus, VarId};
use crate::error::AssignError;

/// One selected (worker, task) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedPair {
    /// Worker position in the problem data.
    pub worker_index: usize,
    /// Task position in the problem data.
    pub task_index: usize,
    pub worker: String,
    pub task: String,
    pub cost: i64,
    /// Preference rank of the pair.
    pub preference: i64,
    /// Scheduled hours, when hours are modeled.
    pub hours: Option<i64>,
}

/// A found assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPlan {
    /// `Optimal` or `Feasible`.
    pub status: SolverStatus,
    /// Objective value (costs plus penalties), checked against the solver.
    pub objective: i64,
    /// Sum of the costs of the selected pairs.
    pub total_cost: i64,
    /// Penalty paid for selected rank-0 pairs.
    pub penalty: i64,
    /// Selected pairs, by worker then task in declaration order.
    pub pairs: Vec<AssignedPair>,
}

impl AssignmentPlan {
    /// Pairs assigned to a task.
    pub fn pairs_for_task(&self, task_index: usize) -> impl Iterator<Item = &AssignedPair> + '_ {
        self.pairs.iter().filter(move |p| p.task_index == task_index)
    }

    /// Pairs held by a worker.
    pub fn pairs_for_worker(&self, worker_index: usize) -> impl Iterator<Item = &AssignedPair> + '_ {
        self.pairs.iter().filter(move |p| p.worker_index == worker_index)
    }

    /// `(worker, task)` ids of the selected pairs.
    pub fn pair_ids(&self) -> Vec<(&str, &str)> {
        self.pairs
            .iter()
            .map(|p| (p.worker.as_str(), p.task.as_str()))
            .collect()
    }
}

/// Outcome of one solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// An assignment satisfying every active constraint.
    Assigned(AssignmentPlan),
    /// Proven that no satisfying assignment exists.
    Infeasible,
    /// Limits were reached before a solution or a proof was found.
    Unknown,
}

/// Domain-level report of a solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentReport {
    pub outcome: Outcome,
    /// Solver wall-clock time in milliseconds.
    pub solve_time_ms: i64,
    /// Search nodes reported by the solver.
    pub nodes: u64,
}

impl AssignmentReport {
    /// The plan, if one was found.
    pub fn plan(&self) -> Option<&AssignmentPlan> {
        match &self.outcome {
            Outcome::Assigned(plan) => Some(plan),
            Outcome::Infeasible | Outcome::Unknown => None,
        }
    }

    /// Whether infeasibility was proven.
    pub fn is_infeasible(&self) -> bool {
        self.outcome == Outcome::Infeasible
    }
}

/// Reads a solution back into an [`AssignmentReport`].
///
/// Variable values are only read when the solver found a solution. The
/// recomputed objective must equal the solver's; a mismatch or a missing
/// value is an error.
pub fn interpret(
    data: &ProblemData,
    built: &AssignmentModel,
    solution: &CpSolution,
) -> Result<AssignmentReport, AssignError> {
    let outcome = match solution.status {
        SolverStatus::Optimal | SolverStatus::Feasible => {
            Outcome::Assigned(read_plan(data, built, solution)?)
        }
        SolverStatus::Infeasible => Outcome::Infeasible,
        SolverStatus::Unknown => Outcome::Unknown,
        SolverStatus::ModelInvalid => {
            return Err(AssignError::InvalidModel(format!(
                "solver rejected model '{}'",
                built.model().name
            )))
        }
    };

    Ok(AssignmentReport {
        outcome,
        solve_time_ms: solution.solve_time_ms,
        nodes: solution.nodes,
    })
}

fn read_plan(
    data: &ProblemData,
    built: &AssignmentModel,
    solution: &CpSolution,
) -> Result<AssignmentPlan, AssignError> {
    let mut pairs = Vec::new();
    for ((w, t), &x) in built.assign_vars().iter() {
        let selected = solution
            .bool_value(x)
            .ok_or_else(|| AssignError::MissingValue(name_of(built, x)))?;
        if !selected {
            continue;
        }
        let hours = match built.hours_var(w, t) {
            Some(h) => Some(
                solution
                    .value(h)
                    .ok_or_else(|| AssignError::MissingValue(name_of(built, h)))?,
            ),
            None => None,
        };
        pairs.push(AssignedPair {
            worker_index: w,
            task_index: t,
            worker: data.workers()[w].id.clone(),
            task: data.tasks()[t].id.clone(),
            cost: data.cost(w, t),
            preference: data.preference(w, t),
            hours,
        });
    }

    let total_cost: i64 = pairs.iter().map(|p| p.cost).sum();
    let objective = match built.model().objective() {
        Some(obj) => obj
            .expr()
            .evaluate(|v| solution.value(v).unwrap_or_default()),
        None => total_cost,
    };
    if let Some(reported) = solution.objective_value {
        if reported != objective {
            return Err(AssignError::ObjectiveMismatch {
                reported,
                computed: objective,
            });
        }
    }

    Ok(AssignmentPlan {
        status: solution.status,
        objective,
        total_cost,
        penalty: objective - total_cost,
        pairs,
    })
}

fn name_of(built: &AssignmentModel, var: VarId) -> String {
    built
        .model()
        .variable(var)
        .map(|v| v.name.clone())
        .unwrap_or_else(|| var.to_string())
}

impl fmt::Display for AssignmentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Assigned(plan) => {
                writeln!(f, "Status: {}", plan.status.name())?;
                writeln!(f, "Total Cost = {}", plan.total_cost)?;
                if plan.penalty != 0 {
                    writeln!(f, "Preference Penalty = {}", plan.penalty)?;
                    writeln!(f, "Objective = {}", plan.objective)?;
                }
                writeln!(f)?;
                writeln!(f, "--- Assignments ---")?;
                for pair in &plan.pairs {
                    write!(
                        f,
                        "Worker {} -> {} (cost: {}",
                        pair.worker, pair.task, pair.cost
                    )?;
                    if let Some(hours) = pair.hours {
                        write!(f, ", hours: {hours}")?;
                    }
                    writeln!(f, ")")?;
                }
                Ok(())
            }
            Outcome::Infeasible => {
                writeln!(f, "Status: {}", SolverStatus::Infeasible.name())?;
                writeln!(f, "No satisfying assignment exists.")
            }
            Outcome::Unknown => {
                writeln!(f, "Status: {}", SolverStatus::Unknown.name())?;
                writeln!(f, "No assignment found within the solver limits.")
            }
        }
    }
}
