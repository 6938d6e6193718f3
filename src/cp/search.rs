//! Exact branch-and-bound search over bounded integer variables.
//!
//! # Algorithm
//!
//! 1. Normalize every linear constraint into `sum(a_i * x_i) <= b` rows
//! 2. At each node:
//!    a. Tighten variable bounds until fixpoint (bounds consistency)
//!    b. Prune when the objective lower bound cannot beat the incumbent
//!    c. Branch on the first unfixed variable, cheapest value first
//! 3. A complete search proves optimality or infeasibility; a search cut
//!    short by limits reports the incumbent as feasible or gives up
//!
//! Deterministic: variables are branched in creation order and values in
//! objective order, so identical models yield identical solutions.
//!
//! # Reference
//!
//! Land & Doig (1960), "An Automatic Method of Solving Discrete Programming Problems"
//! Achterberg (2007), "Constraint Integer Programming", Ch. 7 (domain propagation)

use std::time::Instant;

use tracing::debug;

use super::model::{CpModel, Objective, Relation};
use super::solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};

/// How often (in nodes) the wall clock is consulted after the root.
const CLOCK_CHECK_INTERVAL: u64 = 256;

/// Exact depth-first branch-and-bound solver.
///
/// Suitable for the small models this crate builds (tens of variables).
/// Honors every [`SolverConfig`] limit.
///
/// # Examples
///
/// ```
/// use u_assign::cp::{
///     BoolVar, BranchAndBoundSolver, CpModel, CpSolver, LinearExpr, Objective,
///     SolverConfig, SolverStatus,
/// };
///
/// let mut model = CpModel::new("pick-one");
/// let a = model.add_bool_var(BoolVar::new("a"));
/// let b = model.add_bool_var(BoolVar::new("b"));
/// model.add_eq("one", LinearExpr::sum([a, b]), 1);
/// model.set_objective(Objective::Minimize(LinearExpr::new().with_term(a, 7).with_term(b, 3)));
///
/// let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
/// assert_eq!(solution.status, SolverStatus::Optimal);
/// assert_eq!(solution.objective_value, Some(3));
/// assert_eq!(solution.bool_value(b), Some(true));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for BranchAndBoundSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        if let Err(reason) = model.validate() {
            debug!(model = %model.name, %reason, "rejecting invalid model");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }

        let start_time = Instant::now();
        let mut search = Search::new(model, config, start_time);
        let root: Vec<(i64, i64)> = model.variables().iter().map(|v| (v.min, v.max)).collect();
        search.dfs(root);

        let complete = !search.aborted && !search.stopped_early;
        let status = match (&search.best, complete) {
            (Some(_), true) => SolverStatus::Optimal,
            (Some(_), false) => SolverStatus::Feasible,
            (None, true) => SolverStatus::Infeasible,
            (None, false) => SolverStatus::Unknown,
        };

        debug!(
            event = "search_end",
            model = %model.name,
            status = status.name(),
            nodes = search.nodes,
            aborted = search.aborted,
        );

        let nodes = search.nodes;
        let mut solution = match search.best {
            Some((min_form_value, values)) => {
                let objective_value = match model.objective() {
                    Some(Objective::Minimize(_)) => Some(min_form_value),
                    Some(Objective::Maximize(_)) => Some(-min_form_value),
                    None => None,
                };
                CpSolution::with_values(model, status, values, objective_value)
            }
            None => CpSolution::empty(status),
        };
        solution.nodes = nodes;
        solution.solve_time_ms = start_time.elapsed().as_millis() as i64;
        solution
    }
}

/// A normalized `sum(coef * var) <= rhs` row.
struct Row {
    terms: Vec<(usize, i64)>,
    rhs: i64,
}

struct Search {
    rows: Vec<Row>,
    /// Objective in minimization form, or `None` for pure feasibility.
    objective: Option<(Vec<(usize, i64)>, i64)>,
    /// Aggregated objective coefficient per variable (branching order).
    direction: Vec<i64>,
    best: Option<(i64, Vec<i64>)>,
    nodes: u64,
    node_limit: Option<u64>,
    deadline_ms: Option<u64>,
    stop_after_first: bool,
    start: Instant,
    aborted: bool,
    stopped_early: bool,
}

impl Search {
    fn new(model: &CpModel, config: &SolverConfig, start: Instant) -> Self {
        let mut rows = Vec::with_capacity(model.constraint_count());
        for c in model.constraints() {
            let terms: Vec<(usize, i64)> =
                c.expr.terms().iter().map(|&(v, a)| (v.index(), a)).collect();
            let rhs = c.rhs - c.expr.constant();
            let negated = || Row {
                terms: terms.iter().map(|&(i, a)| (i, -a)).collect(),
                rhs: -rhs,
            };
            match c.relation {
                Relation::Le => rows.push(Row {
                    terms: terms.clone(),
                    rhs,
                }),
                Relation::Ge => rows.push(negated()),
                Relation::Eq => {
                    rows.push(negated());
                    rows.push(Row {
                        terms: terms.clone(),
                        rhs,
                    });
                }
            }
        }

        let objective = model.objective().map(|obj| {
            let sign = match obj {
                Objective::Minimize(_) => 1,
                Objective::Maximize(_) => -1,
            };
            let expr = obj.expr();
            let terms: Vec<(usize, i64)> = expr
                .terms()
                .iter()
                .map(|&(v, a)| (v.index(), sign * a))
                .collect();
            (terms, sign * expr.constant())
        });

        let mut direction = vec![0; model.variable_count()];
        if let Some((terms, _)) = &objective {
            for &(i, a) in terms {
                direction[i] += a;
            }
        }

        Self {
            rows,
            objective,
            direction,
            best: None,
            nodes: 0,
            node_limit: config.node_limit,
            deadline_ms: config.time_limit_ms,
            stop_after_first: config.stop_after_first,
            start,
            aborted: false,
            stopped_early: false,
        }
    }

    fn limits_reached(&self) -> bool {
        if let Some(limit) = self.node_limit {
            if self.nodes > limit {
                return true;
            }
        }
        if let Some(ms) = self.deadline_ms {
            let check_clock = self.nodes == 1 || self.nodes % CLOCK_CHECK_INTERVAL == 0;
            if check_clock && self.start.elapsed().as_millis() as u64 >= ms
            {
                return true;
            }
        }
        false
    }

    fn done(&self) -> bool {
        self.aborted || self.stopped_early
    }

    fn dfs(&mut self, mut domains: Vec<(i64, i64)>) {
        self.nodes += 1;
        if self.limits_reached() {
            self.aborted = true;
            return;
        }

        if !self.propagate(&mut domains) {
            return;
        }

        let bound = self.lower_bound(&domains);
        if let Some((best, _)) = &self.best {
            if self.objective.is_none() || bound >= *best {
                return;
            }
        }

        let Some(var) = domains.iter().position(|&(lo, hi)| lo < hi) else {
            let values: Vec<i64> = domains.iter().map(|&(lo, _)| lo).collect();
            self.best = Some((bound, values));
            if self.stop_after_first {
                self.stopped_early = true;
            }
            return;
        };

        let (lo, hi) = domains[var];
        let descending = self.direction[var] < 0;
        let mut value = if descending { hi } else { lo };
        loop {
            let mut child = domains.clone();
            child[var] = (value, value);
            self.dfs(child);
            if self.done() {
                return;
            }
            if descending {
                if value == lo {
                    break;
                }
                value -= 1;
            } else {
                if value == hi {
                    break;
                }
                value += 1;
            }
        }
    }

    /// Tightens bounds until fixpoint. Returns `false` on a conflict.
    fn propagate(&self, domains: &mut [(i64, i64)]) -> bool {
        loop {
            let mut changed = false;
            for row in &self.rows {
                let mut min_activity: i64 = row
                    .terms
                    .iter()
                    .map(|&(i, a)| term_min(a, domains[i]))
                    .sum();
                if min_activity > row.rhs {
                    return false;
                }
                for &(i, a) in &row.terms {
                    let (lo, hi) = domains[i];
                    let slack = row.rhs - (min_activity - term_min(a, (lo, hi)));
                    if a > 0 {
                        let new_hi = div_floor(slack, a);
                        if new_hi < hi {
                            if new_hi < lo {
                                return false;
                            }
                            domains[i].1 = new_hi;
                            changed = true;
                        }
                    } else {
                        let new_lo = div_ceil(slack, a);
                        if new_lo > lo {
                            if new_lo > hi {
                                return false;
                            }
                            domains[i].0 = new_lo;
                            changed = true;
                        }
                    }
                    min_activity = min_activity - term_min(a, (lo, hi)) + term_min(a, domains[i]);
                }
            }
            if !changed {
                return true;
            }
        }
    }

    fn lower_bound(&self, domains: &[(i64, i64)]) -> i64 {
        match &self.objective {
            Some((terms, constant)) => {
                constant
                    + terms
                        .iter()
                        .map(|&(i, a)| term_min(a, domains[i]))
                        .sum::<i64>()
            }
            None => 0,
        }
    }
}

fn term_min(coef: i64, (lo, hi): (i64, i64)) -> i64 {
    if coef > 0 {
        coef * lo
    } else {
        coef * hi
    }
}

fn div_floor(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn div_ceil(a: i64, b: i64) -> i64 {
    -div_floor(-a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{BoolVar, IntVar, LinearExpr};

    fn solve(model: &CpModel) -> CpSolution {
        BranchAndBoundSolver::new().solve(model, &SolverConfig::default())
    }

    #[test]
    fn test_division_helpers() {
        assert_eq!(div_floor(7, 2), 3);
        assert_eq!(div_floor(-7, 2), -4);
        assert_eq!(div_floor(7, -2), -4);
        assert_eq!(div_floor(-7, -2), 3);
        assert_eq!(div_ceil(-3, -2), 2);
        assert_eq!(div_ceil(3, 2), 2);
        assert_eq!(div_ceil(4, 2), 2);
    }

    #[test]
    fn test_minimize_with_cover() {
        let mut model = CpModel::new("cover");
        let a = model.add_bool_var(BoolVar::new("a"));
        let b = model.add_bool_var(BoolVar::new("b"));
        let c = model.add_bool_var(BoolVar::new("c"));
        // need at least 2 of 3
        model.add_ge("two", LinearExpr::sum([a, b, c]), 2);
        model.set_objective(Objective::Minimize(
            [(a, 5), (b, 1), (c, 3)].into_iter().collect(),
        ));

        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.objective_value, Some(4));
        assert_eq!(solution.bool_value(a), Some(false));
        assert_eq!(solution.bool_value(b), Some(true));
        assert_eq!(solution.bool_value(c), Some(true));
    }

    #[test]
    fn test_maximize() {
        let mut model = CpModel::new("max");
        let h = model.add_int_var(IntVar::new("h", 0, 8));
        let g = model.add_int_var(IntVar::new("g", 0, 8));
        model.add_le("cap", LinearExpr::sum([h, g]), 10);
        model.set_objective(Objective::Maximize(
            LinearExpr::new().with_term(h, 3).with_term(g, 2),
        ));

        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.objective_value, Some(28));
        assert_eq!(solution.value(h), Some(8));
        assert_eq!(solution.value(g), Some(2));
    }

    #[test]
    fn test_infeasible() {
        let mut model = CpModel::new("infeasible");
        let a = model.add_bool_var(BoolVar::new("a"));
        let b = model.add_bool_var(BoolVar::new("b"));
        model.add_ge("both", LinearExpr::sum([a, b]), 2);
        model.add_eq("not_a", LinearExpr::sum([a]), 0);

        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::Infeasible);
        assert!(!solution.is_solution_found());
        assert_eq!(solution.value(a), None);
    }

    #[test]
    fn test_equality_and_negative_coefficients() {
        let mut model = CpModel::new("link");
        let x = model.add_bool_var(BoolVar::new("x"));
        let h = model.add_int_var(IntVar::new("h", 0, 8));
        // h <= 8x, h >= 5
        model.add_le("link", LinearExpr::new().with_term(h, 1).with_term(x, -8), 0);
        model.add_ge("effort", LinearExpr::sum([h]), 5);
        model.set_objective(Objective::Minimize(
            LinearExpr::new().with_term(x, 10).with_term(h, 1),
        ));

        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.value(x), Some(1));
        assert_eq!(solution.value(h), Some(5));
        assert_eq!(solution.objective_value, Some(15));
    }

    #[test]
    fn test_feasibility_without_objective() {
        let mut model = CpModel::new("sat");
        let a = model.add_int_var(IntVar::new("a", 0, 3));
        let b = model.add_int_var(IntVar::new("b", 0, 3));
        model.add_eq("sum", LinearExpr::sum([a, b]), 5);

        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.objective_value, None);
        let total = solution.value(a).unwrap() + solution.value(b).unwrap();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_node_limit_gives_unknown_or_feasible() {
        let mut model = CpModel::new("limited");
        let vars: Vec<_> = (0..12)
            .map(|i| model.add_bool_var(BoolVar::new(format!("b{i}"))))
            .collect();
        model.add_ge("half", LinearExpr::sum(vars.iter().copied()), 6);
        model.set_objective(Objective::Minimize(
            vars.iter().enumerate().map(|(i, &v)| (v, (i as i64 % 5) + 1)).collect(),
        ));

        let config = SolverConfig::default().with_node_limit(1);
        let solution = BranchAndBoundSolver::new().solve(&model, &config);
        assert!(matches!(
            solution.status,
            SolverStatus::Unknown | SolverStatus::Feasible
        ));
        assert_ne!(solution.status, SolverStatus::Optimal);
    }

    #[test]
    fn test_zero_time_limit_stops_at_root() {
        let mut model = CpModel::new("timed");
        let a = model.add_bool_var(BoolVar::new("a"));
        let b = model.add_bool_var(BoolVar::new("b"));
        model.add_eq("one", LinearExpr::sum([a, b]), 1);
        model.set_objective(Objective::Minimize(
            LinearExpr::new().with_term(a, 2).with_term(b, 1),
        ));

        let config = SolverConfig::default().with_time_limit_ms(0);
        let solution = BranchAndBoundSolver::new().solve(&model, &config);
        assert_eq!(solution.status, SolverStatus::Unknown);
        assert_eq!(solution.nodes, 1);
    }

    #[test]
    fn test_stop_after_first_is_feasible() {
        let mut model = CpModel::new("first");
        let a = model.add_bool_var(BoolVar::new("a"));
        let b = model.add_bool_var(BoolVar::new("b"));
        model.add_ge("one", LinearExpr::sum([a, b]), 1);
        model.set_objective(Objective::Minimize(
            LinearExpr::new().with_term(a, 2).with_term(b, 1),
        ));

        let config = SolverConfig::default().with_stop_after_first(true);
        let solution = BranchAndBoundSolver::new().solve(&model, &config);
        assert_eq!(solution.status, SolverStatus::Feasible);
        assert!(solution.objective_value.is_some());
    }

    #[test]
    fn test_invalid_model() {
        let mut model = CpModel::new("bad");
        model.add_int_var(IntVar::new("h", 3, 1));

        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::ModelInvalid);
    }

    #[test]
    fn test_deterministic() {
        let mut model = CpModel::new("ties");
        let vars: Vec<_> = (0..6)
            .map(|i| model.add_bool_var(BoolVar::new(format!("b{i}"))))
            .collect();
        model.add_eq("three", LinearExpr::sum(vars.iter().copied()), 3);
        model.set_objective(Objective::Minimize(
            vars.iter().map(|&v| (v, 1)).collect(),
        ));

        let first = solve(&model);
        let second = solve(&model);
        let read = |s: &CpSolution| vars.iter().map(|&v| s.value(v)).collect::<Vec<_>>();
        assert_eq!(read(&first), read(&second));
        assert_eq!(first.objective_value, Some(3));
    }
}
