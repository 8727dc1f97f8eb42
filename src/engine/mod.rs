//! Constraint programming engine.
//!
//! A small CP layer for disjunctive scheduling: integer and interval
//! variables, no-overlap, linear and max-equality constraints, and a
//! single-variable objective.
//!
//! # Architecture
//!
//! - [`CpModel`]: model definition, addressed through [`VarId`] / [`IntervalId`]
//! - [`CpSolver`]: solver trait, so the search engine can be swapped
//! - [`BranchAndBoundSolver`]: bundled complete solver
//! - [`CpSolution`]: status, objective value and variable assignments
//!
//! # Reference
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod model;
mod search;
mod solver;
mod variables;

pub use model::{Constraint, CpModel, ModelError, Objective};
pub use search::BranchAndBoundSolver;
pub use solver::{CpSolution, CpSolver, SearchStats, SolverConfig, SolverStatus};
pub use variables::{IntVar, IntervalId, IntervalVar, VarId};
