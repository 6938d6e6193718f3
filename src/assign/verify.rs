//! Independent verification of a reported plan.
//!
//! Re-checks every hard rule enabled in a [`ModelConfig`] directly against
//! the problem data, without looking at the CP model. Detects:
//! - Workers holding more than one task
//! - Tasks with too few or too many assignees
//! - Aggregate skill shortfalls and hard skill-gate breaches
//! - Budget overruns and forbidden preference pairs
//! - Hours over capacity, hours without effort coverage

use std::fmt;

use super::config::{Coverage, ModelConfig};
use super::data::ProblemData;
use super::report::AssignmentPlan;

/// Categories of rule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Exclusivity,
    Coverage,
    SkillSufficiency,
    SkillGate,
    Budget,
    Preference,
    HoursCapacity,
    HoursLink,
    Effort,
}

/// A broken rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Rule category.
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Checks a plan against the rules active in `config`.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(violations)` with every issue found.
pub fn verify(
    data: &ProblemData,
    config: &ModelConfig,
    plan: &AssignmentPlan,
) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();
    let workers = data.workers();

    for (w, worker) in workers.iter().enumerate() {
        let held: Vec<_> = plan.pairs_for_worker(w).collect();
        if config.exclusivity && held.len() > 1 {
            violations.push(Violation::new(
                ViolationKind::Exclusivity,
                format!("worker {} holds {} tasks", worker.id, held.len()),
            ));
        }

        if config.hours {
            let total: i64 = held.iter().filter_map(|p| p.hours).sum();
            if total > worker.hours_limit() {
                violations.push(Violation::new(
                    ViolationKind::HoursCapacity,
                    format!(
                        "worker {} scheduled {} hours, limit {}",
                        worker.id,
                        total,
                        worker.hours_limit()
                    ),
                ));
            }
        }
    }

    for (t, task) in data.tasks().iter().enumerate() {
        let staff: Vec<_> = plan.pairs_for_task(t).collect();

        let covered = match config.coverage {
            Coverage::AtLeastOne => !staff.is_empty(),
            Coverage::ExactlyOne => staff.len() == 1,
        };
        if !covered {
            violations.push(Violation::new(
                ViolationKind::Coverage,
                format!("task {} has {} assignees", task.id, staff.len()),
            ));
        }

        for (skill, level) in task.requirements() {
            let levels = staff
                .iter()
                .map(|p| workers[p.worker_index].skill_level(skill).unwrap_or(0));

            if config.skill_sufficiency {
                let combined: i64 = levels.clone().sum();
                if combined < level {
                    violations.push(Violation::new(
                        ViolationKind::SkillSufficiency,
                        format!("task {} has {skill} {combined}, needs {level}", task.id),
                    ));
                }
            }

            if config.skill_gate && level >= config.gate_threshold {
                for (pair, have) in staff.iter().zip(levels) {
                    if have < level {
                        violations.push(Violation::new(
                            ViolationKind::SkillGate,
                            format!(
                                "worker {} has {skill} {have} on task {} (gate {level})",
                                pair.worker, task.id
                            ),
                        ));
                    }
                }
            }
        }

        if config.budget {
            let spend: i64 = staff.iter().map(|p| p.cost).sum();
            if spend > task.budget {
                violations.push(Violation::new(
                    ViolationKind::Budget,
                    format!("task {} costs {spend}, budget {}", task.id, task.budget),
                ));
            }
        }

        if config.hours && task.effort_hours > 0 {
            let hours: i64 = staff.iter().filter_map(|p| p.hours).sum();
            if hours < task.effort_hours {
                violations.push(Violation::new(
                    ViolationKind::Effort,
                    format!(
                        "task {} gets {hours} hours, needs {}",
                        task.id, task.effort_hours
                    ),
                ));
            }
        }
    }

    for pair in &plan.pairs {
        if config.preference.forbids() && pair.preference == 0 {
            violations.push(Violation::new(
                ViolationKind::Preference,
                format!("worker {} placed on unwanted task {}", pair.worker, pair.task),
            ));
        }
        if let Some(hours) = pair.hours {
            if hours < 0 || hours > config.slot_hours {
                violations.push(Violation::new(
                    ViolationKind::HoursLink,
                    format!(
                        "worker {} has {hours} hours on {} (slot max {})",
                        pair.worker, pair.task, config.slot_hours
                    ),
                ));
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::dataset;
    use crate::assign::report::AssignedPair;
    use crate::cp::SolverStatus;

    fn plan_of(data: &ProblemData, picks: &[(usize, usize, Option<i64>)]) -> AssignmentPlan {
        let pairs: Vec<AssignedPair> = picks
            .iter()
            .map(|&(w, t, hours)| AssignedPair {
                worker_index: w,
                task_index: t,
                worker: data.workers()[w].id.clone(),
                task: data.tasks()[t].id.clone(),
                cost: data.cost(w, t),
                preference: data.preference(w, t),
                hours,
            })
            .collect();
        let total_cost = pairs.iter().map(|p| p.cost).sum();
        AssignmentPlan {
            status: SolverStatus::Feasible,
            objective: total_cost,
            total_cost,
            penalty: 0,
            pairs,
        }
    }

    fn kinds(result: Result<(), Vec<Violation>>) -> Vec<ViolationKind> {
        result.err().unwrap_or_default().into_iter().map(|v| v.kind).collect()
    }

    #[test]
    fn test_valid_plan() {
        let data = dataset::staffed_problem().unwrap();
        let plan = plan_of(&data, &[(0, 0, None), (2, 1, None), (3, 2, None)]);
        assert!(verify(&data, &ModelConfig::strict(), &plan).is_ok());
    }

    #[test]
    fn test_exclusivity_and_coverage() {
        let data = dataset::staffed_problem().unwrap();
        let plan = plan_of(&data, &[(0, 0, None), (0, 1, None)]);
        let found = kinds(verify(&data, &ModelConfig::strict(), &plan));
        assert!(found.contains(&ViolationKind::Exclusivity));
        // PJ-3 uncovered
        assert!(found.contains(&ViolationKind::Coverage));
    }

    #[test]
    fn test_skill_gate_and_sufficiency() {
        let data = dataset::default_problem().unwrap();
        // C alone on PJ-3: design ok, programming short
        let plan = plan_of(&data, &[(0, 0, None), (1, 1, None), (2, 2, None)]);
        let found = kinds(verify(&data, &ModelConfig::strict(), &plan));
        assert!(found.contains(&ViolationKind::SkillSufficiency));

        // B on PJ-1 fails the programming gate even with A's help
        let plan = plan_of(&data, &[(0, 0, None), (1, 0, None)]);
        let found = kinds(verify(&data, &ModelConfig::general(), &plan));
        assert!(found.contains(&ViolationKind::SkillGate));
    }

    #[test]
    fn test_budget() {
        let data = dataset::staffed_problem().unwrap();
        // A on PJ-2 costs 150 > 100
        let plan = plan_of(&data, &[(0, 1, None)]);
        let found = kinds(verify(&data, &ModelConfig::strict(), &plan));
        assert!(found.contains(&ViolationKind::Budget));
    }

    #[test]
    fn test_hours_capacity() {
        let data = dataset::staffed_problem().unwrap();
        // D has 4 regular hours and no overtime
        let plan = plan_of(&data, &[(3, 2, Some(5))]);
        let found = kinds(verify(&data, &ModelConfig::general(), &plan));
        assert!(found.contains(&ViolationKind::HoursCapacity));

        let plan = plan_of(&data, &[(3, 2, Some(9))]);
        let found = kinds(verify(&data, &ModelConfig::general(), &plan));
        assert!(found.contains(&ViolationKind::HoursLink));
    }

    #[test]
    fn test_violation_display() {
        let v = Violation::new(ViolationKind::Budget, "task x costs 5, budget 4");
        assert_eq!(v.to_string(), "Budget: task x costs 5, budget 4");
    }
}
