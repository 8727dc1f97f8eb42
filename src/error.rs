//! Error types.

use thiserror::Error;

use crate::engine::SolverStatus;
use crate::models::TaskCoord;

/// A job-shop instance that cannot be modeled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    /// The job list is empty.
    #[error("instance has no jobs")]
    NoJobs,
    /// A job has no operations.
    #[error("job {job_id} has no operations")]
    EmptyJob { job_id: usize },
    /// An operation has a zero or negative duration.
    #[error("{coord} has non-positive duration {duration}")]
    NonPositiveDuration { coord: TaskCoord, duration: i64 },
    /// An operation names a negative machine id.
    #[error("{coord} references negative machine {machine}")]
    NegativeMachine { coord: TaskCoord, machine: i64 },
    /// An operation names a machine id above [`MAX_MACHINE_ID`](crate::validation::MAX_MACHINE_ID).
    #[error(
        "{coord} references machine {machine}, above the limit of {}",
        crate::validation::MAX_MACHINE_ID
    )]
    MachineOutOfRange { coord: TaskCoord, machine: i64 },
    /// The sum of all durations does not fit in `i64`.
    #[error("total processing time overflows i64")]
    HorizonOverflow,
}

/// Failure to turn solver output into a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Extraction was requested although the solve produced no assignment.
    #[error("cannot extract a schedule from a {status} result")]
    IllegalExtraction { status: SolverStatus },
    /// The engine reported a solution but no value for a start variable.
    #[error("solver returned no start time for {coord}")]
    MissingValue { coord: TaskCoord },
    /// A task was placed on a machine the schedule has no bucket for.
    #[error("{coord} placed on unknown machine {machine}")]
    UnknownMachine { coord: TaskCoord, machine: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = InstanceError::NonPositiveDuration {
            coord: TaskCoord::new(1, 2),
            duration: 0,
        };
        assert_eq!(err.to_string(), "job_1_task_2 has non-positive duration 0");

        let err = ScheduleError::IllegalExtraction {
            status: SolverStatus::Infeasible,
        };
        assert_eq!(
            err.to_string(),
            "cannot extract a schedule from a INFEASIBLE result"
        );
    }
}
