//! Constraint-based worker–task assignment.
//!
//! Provides:
//!
//! - **CP (Constraint Programming)**: Domain-agnostic modeling layer for
//!   constrained optimization with integer and boolean variables, linear
//!   constraints and a linear objective, plus an exact branch-and-bound
//!   solver (and a MILP adapter behind the `lp` feature).
//! - **Assignment**: Problem data, model builder, result interpretation
//!   and plan verification for staffing tasks with skilled workers under
//!   coverage, skill, budget, preference and working-hour rules.
//! - **Configuration**: TOML run files combining model and solver settings.
//!
//! # Architecture
//!
//! The assignment layer only talks to the solver through the
//! [`cp::CpSolver`] trait, so solver engines can be swapped without
//! touching model construction.

pub mod assign;
pub mod config;
pub mod cp;
pub mod error;
