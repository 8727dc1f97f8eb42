//! Schedule reporting.
//!
//! - [`TimetableFormatter`]: per-machine text timetable
//! - [`ScheduleKpi`]: makespan, utilization, lower bound and gap
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1-3

mod kpi;
mod timetable;

pub use kpi::ScheduleKpi;
pub use timetable::TimetableFormatter;
