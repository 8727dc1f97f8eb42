//! Reads a solved model back into a per-machine schedule.

use crate::engine::SolverStatus;
use crate::error::ScheduleError;
use crate::models::{AssignedTask, MachineSchedule};

use super::builder::JobShopModel;
use super::driver::SolveOutcome;

/// Builds the machine schedule of a solved model.
///
/// Returns `None` when the outcome carries no solution, which is a normal
/// result for infeasible or interrupted solves. Each bucket is sorted by
/// `(start, job_id, task_id)`.
pub fn extract_solution(model: &JobShopModel, outcome: &SolveOutcome) -> Option<MachineSchedule> {
    if !outcome.is_solution_found() {
        return None;
    }
    try_extract_solution(model, outcome).ok()
}

/// Checked form of [`extract_solution`].
///
/// # Errors
/// - [`ScheduleError::IllegalExtraction`] if the status is neither
///   `Optimal` nor `Feasible`
/// - [`ScheduleError::MissingValue`] if the solution lacks a start value
/// - [`ScheduleError::UnknownMachine`] if a task names a machine outside
///   the model
pub fn try_extract_solution(
    model: &JobShopModel,
    outcome: &SolveOutcome,
) -> Result<MachineSchedule, ScheduleError> {
    if !matches!(outcome.status, SolverStatus::Optimal | SolverStatus::Feasible) {
        return Err(ScheduleError::IllegalExtraction {
            status: outcome.status,
        });
    }

    let mut schedule = MachineSchedule::new(model.machine_count());
    for (coord, vars) in model.tasks() {
        let start = outcome
            .solution
            .value(vars.start)
            .ok_or(ScheduleError::MissingValue { coord })?;
        schedule.push(
            vars.machine,
            AssignedTask::new(start, coord.job_id, coord.task_id, vars.duration),
        )?;
    }
    schedule.sort();

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::builder::JobShopCpBuilder;
    use crate::engine::CpSolution;
    use crate::models::TaskCoord;
    use crate::samples::single_job;

    fn outcome(status: SolverStatus, values: Vec<i64>) -> SolveOutcome {
        let mut solution = CpSolution::empty(status);
        solution.values = values;
        SolveOutcome::new(solution)
    }

    #[test]
    fn test_extract_from_values() {
        let instance = single_job();
        let model = JobShopCpBuilder::new(&instance).build();
        // start_0_0, end_0_0, start_0_1, end_0_1, start_0_2, end_0_2, makespan
        let result = outcome(SolverStatus::Feasible, vec![0, 3, 3, 5, 5, 7, 7]);

        let schedule = extract_solution(&model, &result).unwrap();
        assert_eq!(schedule.machine_count(), 3);
        assert_eq!(schedule.task_count(), 3);
        assert_eq!(schedule.tasks_on(2), &[AssignedTask::new(5, 0, 2, 2)]);
        assert_eq!(schedule.makespan(), 7);
    }

    #[test]
    fn test_no_solution_is_none() {
        let instance = single_job();
        let model = JobShopCpBuilder::new(&instance).build();

        for status in [SolverStatus::Infeasible, SolverStatus::Unknown, SolverStatus::ModelInvalid] {
            let result = outcome(status, Vec::new());
            assert!(extract_solution(&model, &result).is_none());
            assert_eq!(
                try_extract_solution(&model, &result),
                Err(ScheduleError::IllegalExtraction { status })
            );
        }
    }

    #[test]
    fn test_missing_value() {
        let instance = single_job();
        let model = JobShopCpBuilder::new(&instance).build();
        let result = outcome(SolverStatus::Optimal, vec![0, 3]);

        assert_eq!(
            try_extract_solution(&model, &result),
            Err(ScheduleError::MissingValue {
                coord: TaskCoord::new(0, 1)
            })
        );
        assert!(extract_solution(&model, &result).is_none());
    }
}
