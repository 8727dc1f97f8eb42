//! CP-based job-shop formulation.
//!
//! Translates an [`Instance`](crate::models::Instance) into a
//! [`CpModel`](crate::engine::CpModel), solves it with any
//! [`CpSolver`](crate::engine::CpSolver), and reads the assignment back
//! into a [`MachineSchedule`](crate::models::MachineSchedule).
//!
//! # Pipeline
//!
//! 1. [`JobShopCpBuilder`]: instance → [`JobShopModel`]
//! 2. [`solve`]: model → [`SolveOutcome`]
//! 3. [`extract_solution`]: outcome → machine schedule
//! 4. [`TimetableFormatter`](crate::report::TimetableFormatter): schedule → text
//!
//! [`JobShopSolver`] runs all four steps.
//!
//! # Reference
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

mod builder;
mod driver;
mod extract;

pub use builder::{JobShopCpBuilder, JobShopModel, TaskVars};
pub use driver::{solve, JobShopReport, JobShopSolver, SolveOutcome};
pub use extract::{extract_solution, try_extract_solution};
