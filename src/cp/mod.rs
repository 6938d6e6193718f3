//! Constraint Programming (CP) framework.
//!
//! Provides a small model for expressing constrained optimization
//! problems over bounded integer and boolean variables with linear
//! constraints and a linear objective.
//!
//! # Key Components
//!
//! - **Variables**: [`IntVar`], [`BoolVar`] — decision variables, addressed by [`VarId`]
//! - **Constraints**: [`LinearConstraint`] — `expr <= | >= | == rhs`
//! - **Model**: [`CpModel`] — container for variables, constraints, objective
//! - **Solver**: [`CpSolver`] trait — interface for solver implementations
//!
//! # Design
//!
//! The modeling layer knows nothing about workers or tasks. The
//! [`CpSolver`] trait allows plugging in external engines
//! ([`LpSolver`] behind the `lp` feature) or the built-in exact
//! [`BranchAndBoundSolver`].
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

#[cfg(feature = "lp")]
mod lp;
mod model;
mod search;
mod solver;
mod variables;

#[cfg(feature = "lp")]
pub use lp::LpSolver;
pub use model::{CpModel, LinearConstraint, LinearExpr, Objective, Relation, MAX_ACTIVITY};
pub use search::BranchAndBoundSolver;
pub use solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};
pub use variables::{BoolVar, IntVar, VarId};
