//! Adapter to the `good_lp` MILP front-end (feature `lp`).
//!
//! Translates a [`CpModel`] into a `good_lp` problem solved by the bundled
//! pure-Rust `microlp` backend. Every variable becomes an integer variable
//! with the model's bounds.

use std::time::Instant;

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError,
    Solution, SolverModel, Variable,
};
use tracing::{debug, warn};

use super::model::{CpModel, LinearExpr, Objective, Relation};
use super::solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};

/// [`CpSolver`] backed by `good_lp`.
///
/// The backend does not expose search limits, so `time_limit_ms`,
/// `node_limit` and `stop_after_first` are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct LpSolver;

impl LpSolver {
    pub fn new() -> Self {
        Self
    }
}

fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Expression {
    let mut out = Expression::from(expr.constant() as f64);
    for &(var, coef) in expr.terms() {
        out += coef as f64 * vars[var.index()];
    }
    out
}

impl CpSolver for LpSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        if let Err(reason) = model.validate() {
            debug!(model = %model.name, %reason, "rejecting invalid model");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }
        if config.time_limit_ms.is_some() || config.node_limit.is_some() {
            warn!("lp backend ignores search limits");
        }

        let start_time = Instant::now();
        let mut problem_vars = ProblemVariables::new();
        let vars: Vec<Variable> = model
            .variables()
            .iter()
            .map(|v| {
                problem_vars.add(
                    variable()
                        .integer()
                        .min(v.min as f64)
                        .max(v.max as f64)
                        .name(v.name.clone()),
                )
            })
            .collect();

        let unsolved = match model.objective() {
            Some(Objective::Minimize(expr)) => problem_vars.minimise(to_expression(expr, &vars)),
            Some(Objective::Maximize(expr)) => problem_vars.maximise(to_expression(expr, &vars)),
            None => problem_vars.minimise(Expression::from(0.0)),
        };
        let mut problem = unsolved.using(default_solver);
        for c in model.constraints() {
            let lhs = to_expression(&c.expr, &vars);
            let rhs = c.rhs as f64;
            problem = problem.with(match c.relation {
                Relation::Le => constraint::leq(lhs, rhs),
                Relation::Ge => constraint::geq(lhs, rhs),
                Relation::Eq => constraint::eq(lhs, rhs),
            });
        }

        let mut solution = match problem.solve() {
            Ok(found) => {
                let values: Vec<i64> = vars.iter().map(|&v| found.value(v).round() as i64).collect();
                let objective_value = model
                    .objective()
                    .map(|obj| obj.expr().evaluate(|v| values[v.index()]));
                CpSolution::with_values(model, SolverStatus::Optimal, values, objective_value)
            }
            Err(ResolutionError::Infeasible) => CpSolution::empty(SolverStatus::Infeasible),
            Err(other) => {
                warn!(error = %other, "lp backend gave up");
                CpSolution::empty(SolverStatus::Unknown)
            }
        };
        solution.solve_time_ms = start_time.elapsed().as_millis() as i64;
        solution
    }
}
