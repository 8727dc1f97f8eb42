//! Validation for job-shop instances and schedules.
//!
//! Two checks:
//! - [`validate_jobs`]: structural integrity of raw input before an
//!   [`Instance`] is built (empty input, empty jobs, bad machines and
//!   durations, horizon overflow).
//! - [`verify_schedule`]: a schedule against its instance (coverage,
//!   machine assignment, durations, job order, machine exclusivity).
//!
//! Both report every problem found rather than stopping at the first.

use std::collections::HashMap;

use crate::error::InstanceError;
use crate::models::{Instance, MachineSchedule, TaskCoord, Violation, ViolationType};

/// Largest machine id an instance may reference.
///
/// Machine buckets are allocated densely up to the largest id.
pub const MAX_MACHINE_ID: i64 = 65_535;

/// Input validation result.
pub type ValidationResult = Result<(), Vec<InstanceError>>;

/// Validates raw `(machine, duration)` job data.
///
/// Checks:
/// 1. At least one job
/// 2. Every job has at least one operation
/// 3. Machine ids lie in `0..=MAX_MACHINE_ID`
/// 4. Durations are strictly positive
/// 5. The sum of durations fits in `i64`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_jobs(jobs: &[Vec<(i64, i64)>]) -> ValidationResult {
    if jobs.is_empty() {
        return Err(vec![InstanceError::NoJobs]);
    }

    let mut errors = Vec::new();
    let mut horizon: Option<i64> = Some(0);

    for (job_id, ops) in jobs.iter().enumerate() {
        if ops.is_empty() {
            errors.push(InstanceError::EmptyJob { job_id });
        }

        for (task_id, &(machine, duration)) in ops.iter().enumerate() {
            let coord = TaskCoord::new(job_id, task_id);
            if machine < 0 {
                errors.push(InstanceError::NegativeMachine { coord, machine });
            } else if machine > MAX_MACHINE_ID {
                errors.push(InstanceError::MachineOutOfRange { coord, machine });
            }
            if duration <= 0 {
                errors.push(InstanceError::NonPositiveDuration { coord, duration });
            } else {
                horizon = horizon.and_then(|h| h.checked_add(duration));
            }
        }
    }

    if horizon.is_none() {
        errors.push(InstanceError::HorizonOverflow);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Verifies that `schedule` is a feasible solution of `instance`.
///
/// Checks:
/// 1. Every scheduled task is an operation of the instance, scheduled once
/// 2. Every operation of the instance is scheduled
/// 3. Tasks sit on their operation's machine with its duration
/// 4. No task starts before zero
/// 5. Job order: each operation starts after its predecessor ends
/// 6. No two tasks overlap on a machine
pub fn verify_schedule(
    instance: &Instance,
    schedule: &MachineSchedule,
) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();
    let mut starts: HashMap<TaskCoord, i64> = HashMap::new();

    for (machine, tasks) in schedule.iter() {
        for task in tasks {
            let coord = task.coord();
            let Some(op) = instance.operation(coord) else {
                violations.push(Violation::new(
                    ViolationType::UnknownTask,
                    coord.to_string(),
                    format!("{coord} is not an operation of the instance"),
                ));
                continue;
            };

            if starts.insert(coord, task.start).is_some() {
                violations.push(Violation::new(
                    ViolationType::DuplicateTask,
                    coord.to_string(),
                    format!("{coord} is scheduled more than once"),
                ));
            }
            if op.machine != machine {
                violations.push(Violation::new(
                    ViolationType::WrongMachine,
                    coord.to_string(),
                    format!(
                        "{coord} placed on machine {machine}, expected {}",
                        op.machine
                    ),
                ));
            }
            if op.duration != task.duration {
                violations.push(Violation::new(
                    ViolationType::DurationMismatch,
                    coord.to_string(),
                    format!(
                        "{coord} has duration {}, expected {}",
                        task.duration, op.duration
                    ),
                ));
            }
            if task.start < 0 {
                violations.push(Violation::new(
                    ViolationType::NegativeStart,
                    coord.to_string(),
                    format!("{coord} starts at {}", task.start),
                ));
            }
        }
    }

    for (coord, _) in instance.operations() {
        if !starts.contains_key(&coord) {
            violations.push(Violation::new(
                ViolationType::MissingTask,
                coord.to_string(),
                format!("{coord} is not scheduled"),
            ));
        }
    }

    // Job order
    for job in instance.jobs() {
        for (task_id, pair) in job.operations.windows(2).enumerate() {
            let prev = TaskCoord::new(job.id, task_id);
            let next = TaskCoord::new(job.id, task_id + 1);
            if let (Some(&prev_start), Some(&next_start)) = (starts.get(&prev), starts.get(&next)) {
                let prev_end = prev_start + pair[0].duration;
                if next_start < prev_end {
                    violations.push(Violation::precedence_violation(
                        next,
                        format!("{next} starts at {next_start} before {prev} ends at {prev_end}"),
                    ));
                }
            }
        }
    }

    // Machine exclusivity
    for (machine, tasks) in schedule.iter() {
        let mut sorted = tasks.to_vec();
        sorted.sort_unstable();
        let mut latest: Option<(TaskCoord, i64)> = None;
        for task in &sorted {
            if let Some((other, end)) = latest {
                if task.start < end {
                    violations.push(Violation::machine_overlap(
                        machine,
                        format!(
                            "{} starts at {} while {other} runs until {end}",
                            task.coord(),
                            task.start
                        ),
                    ));
                }
            }
            if latest.map_or(true, |(_, end)| task.end() > end) {
                latest = Some((task.coord(), task.end()));
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssignedTask;

    fn sample_instance() -> Instance {
        Instance::new(vec![vec![(0, 3), (1, 2)], vec![(1, 2), (0, 1)]]).unwrap()
    }

    fn sample_schedule() -> MachineSchedule {
        let mut s = MachineSchedule::new(2);
        s.push(0, AssignedTask::new(0, 0, 0, 3)).unwrap();
        s.push(0, AssignedTask::new(3, 1, 1, 1)).unwrap();
        s.push(1, AssignedTask::new(0, 1, 0, 2)).unwrap();
        s.push(1, AssignedTask::new(3, 0, 1, 2)).unwrap();
        s.sort();
        s
    }

    fn kinds(violations: &[Violation]) -> Vec<ViolationType> {
        violations.iter().map(|v| v.violation_type).collect()
    }

    #[test]
    fn test_valid_jobs() {
        assert!(validate_jobs(&[vec![(0, 3), (1, 2)], vec![(1, 1)]]).is_ok());
    }

    #[test]
    fn test_no_jobs() {
        assert_eq!(validate_jobs(&[]), Err(vec![InstanceError::NoJobs]));
    }

    #[test]
    fn test_multiple_errors() {
        let errors = validate_jobs(&[vec![], vec![(-2, 0)]]).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], InstanceError::EmptyJob { job_id: 0 });
        assert!(matches!(errors[1], InstanceError::NegativeMachine { machine: -2, .. }));
        assert!(matches!(
            errors[2],
            InstanceError::NonPositiveDuration { duration: 0, .. }
        ));
    }

    #[test]
    fn test_horizon_overflow() {
        let errors = validate_jobs(&[vec![(0, i64::MAX)], vec![(0, 1)]]).unwrap_err();
        assert_eq!(errors, vec![InstanceError::HorizonOverflow]);
    }

    #[test]
    fn test_verify_valid_schedule() {
        assert!(verify_schedule(&sample_instance(), &sample_schedule()).is_ok());
    }

    #[test]
    fn test_verify_missing_task() {
        let mut s = MachineSchedule::new(2);
        s.push(0, AssignedTask::new(0, 0, 0, 3)).unwrap();
        let violations = verify_schedule(&sample_instance(), &s).unwrap_err();
        assert_eq!(
            kinds(&violations)
                .iter()
                .filter(|&&k| k == ViolationType::MissingTask)
                .count(),
            3
        );
    }

    #[test]
    fn test_verify_wrong_machine_and_duration() {
        let mut s = sample_schedule();
        s.push(1, AssignedTask::new(10, 0, 0, 4)).unwrap();
        let violations = verify_schedule(&sample_instance(), &s).unwrap_err();
        let k = kinds(&violations);
        assert!(k.contains(&ViolationType::DuplicateTask));
        assert!(k.contains(&ViolationType::WrongMachine));
        assert!(k.contains(&ViolationType::DurationMismatch));
    }

    #[test]
    fn test_verify_unknown_task() {
        let mut s = sample_schedule();
        s.push(0, AssignedTask::new(20, 5, 0, 1)).unwrap();
        let violations = verify_schedule(&sample_instance(), &s).unwrap_err();
        assert_eq!(kinds(&violations), vec![ViolationType::UnknownTask]);
    }

    #[test]
    fn test_verify_precedence() {
        let mut s = MachineSchedule::new(2);
        s.push(0, AssignedTask::new(0, 0, 0, 3)).unwrap();
        s.push(0, AssignedTask::new(5, 1, 1, 1)).unwrap();
        s.push(1, AssignedTask::new(0, 1, 0, 2)).unwrap();
        s.push(1, AssignedTask::new(2, 0, 1, 2)).unwrap();
        let violations = verify_schedule(&sample_instance(), &s).unwrap_err();
        assert_eq!(kinds(&violations), vec![ViolationType::PrecedenceViolation]);
        assert_eq!(violations[0].entity_id, "job_0_task_1");
    }

    #[test]
    fn test_verify_overlap_with_long_task() {
        let inst = Instance::new(vec![vec![(0, 10)], vec![(0, 1)], vec![(0, 1)]]).unwrap();
        let mut s = MachineSchedule::new(1);
        s.push(0, AssignedTask::new(0, 0, 0, 10)).unwrap();
        s.push(0, AssignedTask::new(2, 1, 0, 1)).unwrap();
        s.push(0, AssignedTask::new(5, 2, 0, 1)).unwrap();
        let violations = verify_schedule(&inst, &s).unwrap_err();
        assert_eq!(
            kinds(&violations),
            vec![ViolationType::MachineOverlap, ViolationType::MachineOverlap]
        );
    }
}
