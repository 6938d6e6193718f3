//! Built-in sample datasets.
//!
//! Four workers (A–D) and three projects (PJ-1 high priority, PJ-2 tight
//! deadline, PJ-3 specialist) with two skills, `programming` and `design`.

use super::data::{ProblemData, ProblemDataBuilder, Task, Worker};
use crate::error::DataError;

pub const PROGRAMMING: &str = "programming";
pub const DESIGN: &str = "design";

const WORKERS: [&str; 4] = ["A", "B", "C", "D"];
const TASKS: [&str; 3] = ["PJ-1", "PJ-2", "PJ-3"];

const COSTS: [[i64; 3]; 4] = [
    [100, 150, 250],
    [120, 90, 180],
    [150, 100, 110],
    [130, 110, 95],
];

const PREFERENCES: [[i64; 3]; 4] = [
    [5, 3, 1],
    [3, 5, 4],
    [1, 3, 5],
    [4, 3, 5],
];

fn builder(design_of_d: i64) -> ProblemDataBuilder {
    let mut builder = ProblemData::builder()
        .worker(
            Worker::new("A", 8)
                .with_skill(PROGRAMMING, 2)
                .with_skill(DESIGN, 1)
                .with_overtime(10),
        )
        // reduced hours
        .worker(
            Worker::new("B", 6)
                .with_skill(PROGRAMMING, 1)
                .with_skill(DESIGN, 0),
        )
        .worker(
            Worker::new("C", 8)
                .with_skill(PROGRAMMING, 0)
                .with_skill(DESIGN, 2)
                .with_overtime(10),
        )
        .worker(
            Worker::new("D", 4)
                .with_skill(PROGRAMMING, 3)
                .with_skill(DESIGN, design_of_d),
        )
        .task(Task::new("PJ-1", 130).requires(PROGRAMMING, 2).requires(DESIGN, 0))
        .task(Task::new("PJ-2", 100).requires(PROGRAMMING, 0).requires(DESIGN, 1))
        .task(Task::new("PJ-3", 120).requires(PROGRAMMING, 1).requires(DESIGN, 2));

    for (w, worker) in WORKERS.iter().enumerate() {
        for (t, task) in TASKS.iter().enumerate() {
            builder = builder
                .cost(*worker, *task, COSTS[w][t])
                .preference(*worker, *task, PREFERENCES[w][t]);
        }
    }
    builder
}

/// The reference dataset.
///
/// Infeasible under every model variant: PJ-3 gates on design level 2,
/// which only C reaches, and C has no programming skill for PJ-3's
/// programming requirement.
pub fn default_problem() -> Result<ProblemData, DataError> {
    builder(1).build()
}

/// The reference dataset with D's design level raised to 2.
///
/// Feasible; the unique optimum is A→PJ-1, C→PJ-2, D→PJ-3 at cost 295.
pub fn staffed_problem() -> Result<ProblemData, DataError> {
    builder(2).build()
}
