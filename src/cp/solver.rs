//! CP solver interface.

use serde::{Deserialize, Serialize};

use super::model::CpModel;
use super::variables::VarId;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not necessarily optimal) solution found.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Limits were reached before a solution or an infeasibility proof.
    Unknown,
}

impl SolverStatus {
    /// Upper-case name, as printed in reports.
    pub fn name(&self) -> &'static str {
        match self {
            SolverStatus::Optimal => "OPTIMAL",
            SolverStatus::Feasible => "FEASIBLE",
            SolverStatus::Infeasible => "INFEASIBLE",
            SolverStatus::ModelInvalid => "MODEL_INVALID",
            SolverStatus::Unknown => "UNKNOWN",
        }
    }
}

/// Solution from a CP solver.
///
/// A read-only snapshot of variable values taken when the solve returned.
#[derive(Debug, Clone)]
pub struct CpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective function value (if a solution and an objective exist).
    pub objective_value: Option<i64>,
    /// Solve time in milliseconds.
    pub solve_time_ms: i64,
    /// Search nodes explored (0 for solvers that do not report it).
    pub nodes: u64,
    model_id: u64,
    values: Vec<i64>,
}

impl CpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            solve_time_ms: 0,
            nodes: 0,
            model_id: 0,
            values: Vec::new(),
        }
    }

    /// Creates a solution carrying one value per variable of `model`.
    pub fn with_values(
        model: &CpModel,
        status: SolverStatus,
        values: Vec<i64>,
        objective_value: Option<i64>,
    ) -> Self {
        Self {
            status,
            objective_value,
            solve_time_ms: 0,
            nodes: 0,
            model_id: model.id(),
            values,
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    /// Resolved value of a variable.
    ///
    /// Returns `None` when no solution was found or when `var` belongs to
    /// a different model.
    pub fn value(&self, var: VarId) -> Option<i64> {
        if var.model != self.model_id {
            return None;
        }
        self.values.get(var.index).copied()
    }

    /// Resolved value of a boolean variable.
    pub fn bool_value(&self, var: VarId) -> Option<bool> {
        self.value(var).map(|v| v != 0)
    }
}

/// Solver configuration.
///
/// Limits are passed through to the solver unchanged. When a limit fires
/// before any solution is known the status is [`SolverStatus::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds. `None` = no limit.
    pub time_limit_ms: Option<u64>,
    /// Maximum number of search nodes. `None` = no limit.
    pub node_limit: Option<u64>,
    /// Stop after finding the first feasible solution.
    pub stop_after_first: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: None,
            node_limit: None,
            stop_after_first: false,
        }
    }
}

impl SolverConfig {
    /// Sets the time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the maximum number of search nodes.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Sets whether to stop at the first feasible solution.
    pub fn with_stop_after_first(mut self, stop: bool) -> Self {
        self.stop_after_first = stop;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.node_limit == Some(0) {
            return Err("node_limit must be positive".into());
        }
        Ok(())
    }
}

/// Trait for CP solver implementations.
///
/// Implementors provide the actual constraint solving logic.
/// This can wrap external solvers (e.g., a MILP library) or
/// provide a custom search.
pub trait CpSolver {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}
