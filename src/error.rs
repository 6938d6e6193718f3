//! Error types for u-assign.

use thiserror::Error;

/// Data-integrity error raised while constructing [`ProblemData`](crate::assign::ProblemData).
///
/// Always fatal: no model is built and no solve is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("problem has no workers")]
    NoWorkers,

    #[error("problem has no tasks")]
    NoTasks,

    #[error("duplicate worker id: {0}")]
    DuplicateWorker(String),

    #[error("duplicate task id: {0}")]
    DuplicateTask(String),

    #[error("unknown worker referenced: {0}")]
    UnknownWorker(String),

    #[error("unknown task referenced: {0}")]
    UnknownTask(String),

    #[error("duplicate {kind} entry for ({worker}, {task})")]
    DuplicateEntry {
        kind: &'static str,
        worker: String,
        task: String,
    },

    #[error("missing cost for ({worker}, {task})")]
    MissingCost { worker: String, task: String },

    #[error("missing preference for ({worker}, {task})")]
    MissingPreference { worker: String, task: String },

    #[error("worker {worker} does not declare skill '{skill}' required by task {task}")]
    MissingSkill {
        worker: String,
        task: String,
        skill: String,
    },

    #[error("negative {field} for {owner}: {value}")]
    Negative {
        field: &'static str,
        owner: String,
        value: i64,
    },

    #[error("{field} for {owner} exceeds {max}: {value}")]
    TooLarge {
        field: &'static str,
        owner: String,
        value: i64,
        max: i64,
    },
}

/// Main error type for model building and interpretation.
#[derive(Debug, Error)]
pub enum AssignError {
    /// Problem data failed integrity checks.
    #[error("data integrity error: {0}")]
    Data(#[from] DataError),

    /// Model or solver configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The solver rejected the generated model (internal defect).
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// Objective recomputed from the assignment disagrees with the solver.
    #[error("objective mismatch: solver reported {reported}, assignment sums to {computed}")]
    ObjectiveMismatch { reported: i64, computed: i64 },

    /// A variable could not be read back from the solution.
    #[error("no value for variable {0}")]
    MissingValue(String),
}

/// Result type alias for u-assign operations.
pub type Result<T> = std::result::Result<T, AssignError>;
