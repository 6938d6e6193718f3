//! Build–solve–interpret pipeline.

use tracing::{debug, info, warn};

use super::builder::AssignmentModelBuilder;
use super::config::ModelConfig;
use super::data::ProblemData;
use super::report::{interpret, AssignmentReport, Outcome};
use super::verify::verify;
use crate::cp::{CpSolver, SolverConfig};
use crate::error::AssignError;

/// Executes one assignment run.
pub struct AssignmentRunner;

impl AssignmentRunner {
    /// Builds the model once, solves it once and interprets the result.
    ///
    /// Invalid configurations and data that fail model construction are
    /// returned as errors before the solver is called. Solver outcomes
    /// (including infeasibility) are reported through the returned
    /// [`AssignmentReport`].
    ///
    /// # Examples
    ///
    /// ```
    /// use u_assign::assign::{dataset, AssignmentRunner, ModelConfig};
    /// use u_assign::cp::{BranchAndBoundSolver, SolverConfig};
    ///
    /// let data = dataset::staffed_problem().unwrap();
    /// let report = AssignmentRunner::run(
    ///     &data,
    ///     &ModelConfig::strict(),
    ///     &BranchAndBoundSolver::new(),
    ///     &SolverConfig::default(),
    /// )
    /// .unwrap();
    /// assert_eq!(report.plan().unwrap().total_cost, 295);
    /// ```
    pub fn run<S: CpSolver>(
        data: &ProblemData,
        model_config: &ModelConfig,
        solver: &S,
        solver_config: &SolverConfig,
    ) -> Result<AssignmentReport, AssignError> {
        solver_config.validate().map_err(AssignError::Config)?;

        let built = AssignmentModelBuilder::new(data, model_config).build()?;
        info!(
            event = "solve_start",
            workers = data.worker_count(),
            tasks = data.task_count(),
            variables = built.model().variable_count(),
            constraints = built.model().constraint_count(),
        );

        let solution = solver.solve(built.model(), solver_config);
        let report = interpret(data, &built, &solution)?;

        match &report.outcome {
            Outcome::Assigned(plan) => {
                info!(
                    event = "solve_end",
                    status = plan.status.name(),
                    objective = plan.objective,
                    total_cost = plan.total_cost,
                    time_ms = report.solve_time_ms,
                );
                if let Err(violations) = verify(data, model_config, plan) {
                    // Only reachable through a solver defect.
                    for violation in &violations {
                        warn!(event = "plan_violation", %violation);
                    }
                } else {
                    debug!(event = "plan_verified", pairs = plan.pairs.len());
                }
            }
            Outcome::Infeasible => {
                warn!(event = "solve_end", status = "INFEASIBLE", time_ms = report.solve_time_ms);
            }
            Outcome::Unknown => {
                warn!(
                    event = "solve_end",
                    status = "UNKNOWN",
                    nodes = report.nodes,
                    time_ms = report.solve_time_ms,
                );
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::config::PreferenceRule;
    use crate::assign::data::{Task, Worker, MAX_VALUE};
    use crate::assign::dataset;
    use crate::cp::{BranchAndBoundSolver, CpModel, CpSolution, SolverStatus};

    fn solve(data: &ProblemData, config: &ModelConfig) -> AssignmentReport {
        AssignmentRunner::run(data, config, &BranchAndBoundSolver::new(), &SolverConfig::default())
            .unwrap()
    }

    #[test]
    fn test_staffed_strict_optimum() {
        let data = dataset::staffed_problem().unwrap();
        let report = solve(&data, &ModelConfig::strict());
        let plan = report.plan().unwrap();
        assert_eq!(plan.status, SolverStatus::Optimal);
        assert_eq!(plan.total_cost, 295);
        assert_eq!(plan.pair_ids(), vec![("A", "PJ-1"), ("C", "PJ-2"), ("D", "PJ-3")]);
    }

    #[test]
    fn test_staffed_general_optimum() {
        let data = dataset::staffed_problem().unwrap();
        let report = solve(&data, &ModelConfig::general());
        let plan = report.plan().unwrap();
        assert_eq!(plan.total_cost, 295);
        assert!(plan.pairs.iter().all(|p| p.hours.is_some()));
    }

    #[test]
    fn test_default_dataset_infeasible() {
        let data = dataset::default_problem().unwrap();
        assert!(solve(&data, &ModelConfig::strict()).is_infeasible());
        assert!(solve(&data, &ModelConfig::general()).is_infeasible());
    }

    #[test]
    fn test_largest_accepted_values_solve() {
        let data = ProblemData::builder()
            .worker(Worker::new("a", 8))
            .worker(Worker::new("b", 8))
            .task(Task::new("t", MAX_VALUE))
            .cost("a", "t", MAX_VALUE)
            .cost("b", "t", MAX_VALUE - 1)
            .preference("a", "t", 0)
            .preference("b", "t", 1)
            .build()
            .unwrap();
        let config =
            ModelConfig::strict().with_preference(PreferenceRule::Penalize { penalty: MAX_VALUE });

        let report = solve(&data, &config);
        let plan = report.plan().unwrap();
        assert_eq!(plan.pair_ids(), vec![("b", "t")]);
        assert_eq!(plan.objective, MAX_VALUE - 1);
    }

    #[test]
    fn test_invalid_solver_config() {
        let data = dataset::staffed_problem().unwrap();
        let result = AssignmentRunner::run(
            &data,
            &ModelConfig::strict(),
            &BranchAndBoundSolver::new(),
            &SolverConfig::default().with_node_limit(0),
        );
        assert!(matches!(result, Err(AssignError::Config(_))));
    }

    struct RejectingSolver;

    impl CpSolver for RejectingSolver {
        fn solve(&self, _model: &CpModel, _config: &SolverConfig) -> CpSolution {
            CpSolution::empty(SolverStatus::ModelInvalid)
        }
    }

    #[test]
    fn test_model_invalid_surfaces_as_error() {
        let data = dataset::staffed_problem().unwrap();
        let result = AssignmentRunner::run(
            &data,
            &ModelConfig::strict(),
            &RejectingSolver,
            &SolverConfig::default(),
        );
        assert!(matches!(result, Err(AssignError::InvalidModel(_))));
    }
}
