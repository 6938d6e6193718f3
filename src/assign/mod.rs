//! Worker–task assignment.
//!
//! Selects which workers staff which tasks so that coverage, skill,
//! budget, preference and (optionally) working-hour rules hold while the
//! total cost, plus any preference penalty, is minimized.
//!
//! # Key Components
//!
//! - **Data**: [`ProblemData`] — validated workers, tasks, cost and
//!   preference matrices; loaded from a [`ProblemDocument`] or built in code
//! - **Configuration**: [`ModelConfig`] — which constraint families apply
//!   ([`ModelConfig::general`] and [`ModelConfig::strict`] are provided)
//! - **Builder**: [`AssignmentModelBuilder`] — translates data plus
//!   configuration into a [`CpModel`](crate::cp::CpModel)
//! - **Interpreter**: [`interpret`] — reads a solution back into an
//!   [`AssignmentReport`]
//! - **Verification**: [`verify`] — re-checks a plan against the data
//! - **Runner**: [`AssignmentRunner`] — build, solve and interpret once
//!
//! # Examples
//!
//! ```
//! use u_assign::assign::{AssignmentRunner, ModelConfig, ProblemData, Task, Worker};
//! use u_assign::cp::{BranchAndBoundSolver, SolverConfig};
//!
//! let data = ProblemData::builder()
//!     .worker(Worker::new("ann", 8).with_skill("rust", 3))
//!     .worker(Worker::new("bob", 8).with_skill("rust", 1))
//!     .task(Task::new("parser", 200).requires("rust", 2))
//!     .cost("ann", "parser", 150)
//!     .cost("bob", "parser", 80)
//!     .preference("ann", "parser", 4)
//!     .preference("bob", "parser", 5)
//!     .build()
//!     .unwrap();
//!
//! let report = AssignmentRunner::run(
//!     &data,
//!     &ModelConfig::strict(),
//!     &BranchAndBoundSolver::new(),
//!     &SolverConfig::default(),
//! )
//! .unwrap();
//! assert_eq!(report.plan().unwrap().pair_ids(), vec![("ann", "parser")]);
//! ```

mod builder;
mod config;
mod data;
pub mod dataset;
mod grid;
mod report;
mod runner;
mod verify;

pub use builder::{AssignmentModel, AssignmentModelBuilder};
pub use config::{
    Coverage, ModelConfig, ModelVariant, PreferenceRule, DEFAULT_GATE_THRESHOLD,
    DEFAULT_PREFERENCE_PENALTY, DEFAULT_SLOT_HOURS,
};
pub use data::{
    PairValue, ProblemData, ProblemDataBuilder, ProblemDocument, Task, Worker,
    DEFAULT_OVERTIME_CEILING, MAX_VALUE,
};
pub use grid::PairGrid;
pub use report::{interpret, AssignedPair, AssignmentPlan, AssignmentReport, Outcome};
pub use runner::AssignmentRunner;
pub use verify::{verify, Violation, ViolationKind};
