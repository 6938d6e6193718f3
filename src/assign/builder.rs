//! Translation of problem data into a CP model.
//!
//! Builds one [`CpModel`] per call from [`ProblemData`] and a
//! [`ModelConfig`]. Variables are kept in [`PairGrid`]s so the result
//! interpreter can read them back by (worker, task) position.
//!
//! # Reference
//! - Pentico (2007), "Assignment problems: A golden anniversary survey"
//! - Van den Bergh et al. (2013), "Personnel scheduling: A literature review"

use tracing::debug;

use super::config::{Coverage, ModelConfig};
use super::data::ProblemData;
use super::grid::PairGrid;
use crate::cp::{BoolVar, CpModel, IntVar, LinearExpr, Objective, VarId};
use crate::error::{AssignError, DataError};

/// A built model together with its per-pair variable handles.
#[derive(Debug, Clone)]
pub struct AssignmentModel {
    model: CpModel,
    assign: PairGrid<VarId>,
    hours: Option<PairGrid<VarId>>,
}

impl AssignmentModel {
    /// The underlying CP model.
    pub fn model(&self) -> &CpModel {
        &self.model
    }

    /// Indicator `x[w, t]`.
    pub fn assign_var(&self, worker: usize, task: usize) -> VarId {
        self.assign[(worker, task)]
    }

    /// Hours variable `hours[w, t]`, when hours are modeled.
    pub fn hours_var(&self, worker: usize, task: usize) -> Option<VarId> {
        self.hours.as_ref().map(|grid| grid[(worker, task)])
    }

    /// All indicator variables.
    pub fn assign_vars(&self) -> &PairGrid<VarId> {
        &self.assign
    }

    /// Whether hours variables exist.
    pub fn has_hours(&self) -> bool {
        self.hours.is_some()
    }
}

/// Builds an [`AssignmentModel`] from problem data.
///
/// # Example
/// ```
/// use u_assign::assign::{dataset, AssignmentModelBuilder, ModelConfig};
///
/// let data = dataset::staffed_problem().unwrap();
/// let config = ModelConfig::strict();
/// let built = AssignmentModelBuilder::new(&data, &config).build().unwrap();
/// // one indicator per pair, no hours in the strict variant
/// assert_eq!(built.model().variable_count(), 12);
/// assert!(!built.has_hours());
/// ```
pub struct AssignmentModelBuilder<'a> {
    data: &'a ProblemData,
    config: &'a ModelConfig,
}

impl<'a> AssignmentModelBuilder<'a> {
    /// Creates a new builder.
    pub fn new(data: &'a ProblemData, config: &'a ModelConfig) -> Self {
        Self { data, config }
    }

    /// Builds the model.
    ///
    /// Creates:
    /// - A boolean `x[w, t]` per pair (and `hours[w, t]` when configured)
    /// - The cost objective, plus penalties for rank-0 pairs if configured
    /// - Every constraint family enabled in the configuration
    pub fn build(&self) -> Result<AssignmentModel, AssignError> {
        self.config.validate().map_err(AssignError::Config)?;

        let data = self.data;
        let config = self.config;
        let workers = data.workers();
        let tasks = data.tasks();
        let mut model = CpModel::new("assignment");

        let assign = PairGrid::from_fn(workers.len(), tasks.len(), |w, t| {
            model.add_bool_var(BoolVar::new(format!("x_{}_{}", workers[w].id, tasks[t].id)))
        });
        let hours = config.hours.then(|| {
            PairGrid::from_fn(workers.len(), tasks.len(), |w, t| {
                model.add_int_var(IntVar::new(
                    format!("hours_{}_{}", workers[w].id, tasks[t].id),
                    0,
                    config.slot_hours,
                ))
            })
        });

        // Objective: total cost (+ penalty per rank-0 pair)
        let penalty = config.preference.penalty();
        let objective: LinearExpr = assign
            .iter()
            .map(|((w, t), &x)| {
                let mut coef = data.cost(w, t);
                if let Some(p) = penalty {
                    if data.preference(w, t) == 0 {
                        coef += p;
                    }
                }
                (x, coef)
            })
            .collect();
        model.set_objective(Objective::Minimize(objective));

        for (t, task) in tasks.iter().enumerate() {
            let staff = LinearExpr::sum(assign.column(t).copied());
            match config.coverage {
                Coverage::AtLeastOne => model.add_ge(format!("cover[{}]", task.id), staff, 1),
                Coverage::ExactlyOne => model.add_eq(format!("cover[{}]", task.id), staff, 1),
            }

            if config.skill_sufficiency {
                for (skill, level) in task.requirements() {
                    let mut contributed = LinearExpr::new();
                    for w in 0..workers.len() {
                        contributed.add_term(assign[(w, t)], self.skill_of(w, t, skill)?);
                    }
                    model.add_ge(format!("skill[{},{}]", task.id, skill), contributed, level);
                }
            }

            if config.budget {
                let spend: LinearExpr = (0..workers.len())
                    .map(|w| (assign[(w, t)], data.cost(w, t)))
                    .collect();
                model.add_le(format!("budget[{}]", task.id), spend, task.budget);
            }
        }

        for ((w, t), &x) in assign.iter() {
            let (worker, task) = (&workers[w], &tasks[t]);

            if config.skill_gate {
                for (skill, level) in task.requirements() {
                    if level >= config.gate_threshold && self.skill_of(w, t, skill)? < level {
                        model.add_eq(
                            format!("gate[{},{},{}]", worker.id, task.id, skill),
                            LinearExpr::sum([x]),
                            0,
                        );
                        break;
                    }
                }
            }

            if config.preference.forbids() && data.preference(w, t) == 0 {
                model.add_eq(
                    format!("preference[{},{}]", worker.id, task.id),
                    LinearExpr::sum([x]),
                    0,
                );
            }
        }

        if config.exclusivity {
            for (w, worker) in workers.iter().enumerate() {
                model.add_le(
                    format!("exclusive[{}]", worker.id),
                    LinearExpr::sum(assign.row(w).iter().copied()),
                    1,
                );
            }
        }

        if let Some(hours) = &hours {
            for (w, worker) in workers.iter().enumerate() {
                model.add_le(
                    format!("capacity[{}]", worker.id),
                    LinearExpr::sum(hours.row(w).iter().copied()),
                    worker.hours_limit(),
                );
            }
            // no hours without the assignment
            for ((w, t), &h) in hours.iter() {
                model.add_le(
                    format!("link[{},{}]", workers[w].id, tasks[t].id),
                    LinearExpr::new()
                        .with_term(h, 1)
                        .with_term(assign[(w, t)], -config.slot_hours),
                    0,
                );
            }
            for (t, task) in tasks.iter().enumerate() {
                if task.effort_hours > 0 {
                    model.add_ge(
                        format!("effort[{}]", task.id),
                        LinearExpr::sum(hours.column(t).copied()),
                        task.effort_hours,
                    );
                }
            }
        }

        debug!(
            event = "model_built",
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            coverage = ?config.coverage,
            hours = config.hours,
        );

        Ok(AssignmentModel {
            model,
            assign,
            hours,
        })
    }

    fn skill_of(&self, worker: usize, task: usize, skill: &str) -> Result<i64, DataError> {
        let w = &self.data.workers()[worker];
        w.skill_level(skill).ok_or_else(|| DataError::MissingSkill {
            worker: w.id.clone(),
            task: self.data.tasks()[task].id.clone(),
            skill: skill.to_string(),
        })
    }
}
