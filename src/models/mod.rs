//! Job-shop domain models.
//!
//! Provides the data types for job-shop instances and their solutions.
//!
//! # Domain Mappings
//!
//! | u-jobshop | Manufacturing | Computing | Logistics |
//! |-----------|--------------|-----------|-----------|
//! | Job | Order | Batch job | Shipment |
//! | Operation | Process step | Stage | Transport leg |
//! | Machine | Workstation | Processor | Dock |
//! | MachineSchedule | Production plan | Gantt chart | Dock plan |

mod instance;
mod schedule;

pub use instance::{Instance, Job, Operation, TaskCoord};
pub use schedule::{AssignedTask, MachineSchedule, Violation, ViolationType};
