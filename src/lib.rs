//! Job-shop scheduling for the U-Engine ecosystem.
//!
//! Formulates job-shop instances as constraint models, solves them with a
//! pluggable CP engine, and reports the result as per-machine timetables.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Instance`, `Job`, `Operation`,
//!   `AssignedTask`, `MachineSchedule`, `Violation`
//! - **`engine`**: CP modeling layer, `CpSolver` trait, bundled
//!   `BranchAndBoundSolver`
//! - **`cp`**: Job-shop formulation, solve driver, solution extraction,
//!   `JobShopSolver` pipeline
//! - **`report`**: `TimetableFormatter` and `ScheduleKpi`
//! - **`validation`**: Input checks and schedule verification
//! - **`logging`**: `SolveLogger` sinks
//! - **`samples`**: Built-in instances and a random generator
//!
//! # Example
//!
//! ```
//! use u_jobshop::cp::JobShopSolver;
//! use u_jobshop::logging::NoopLogger;
//! use u_jobshop::models::Instance;
//!
//! let instance = Instance::new(vec![
//!     vec![(0, 3), (1, 2), (2, 2)],
//!     vec![(0, 2), (2, 1), (1, 4)],
//!     vec![(1, 4), (2, 3)],
//! ])
//! .unwrap();
//!
//! let report = JobShopSolver::new().with_logger(NoopLogger).run(&instance);
//! assert_eq!(report.makespan, Some(11));
//! print!("{}", report.timetable.unwrap());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Baptiste, Le Pape & Nuijten (2001), "Constraint-Based Scheduling"
//! - Brucker (2007), "Scheduling Algorithms"

pub mod cp;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod samples;
pub mod validation;

pub use error::{InstanceError, ScheduleError};
