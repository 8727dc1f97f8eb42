//! Schedule (solution) model.
//!
//! A schedule lists, per machine, the operations it processes and when
//! they start. It is produced from a solved model and may be checked
//! against its instance, which reports violations.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};

use super::instance::TaskCoord;
use crate::error::ScheduleError;

/// An operation placed in time.
///
/// Field order is the sort order: `(start, job_id, task_id, duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssignedTask {
    /// Start time.
    pub start: i64,
    /// Job index.
    pub job_id: usize,
    /// Operation index within the job.
    pub task_id: usize,
    /// Processing time.
    pub duration: i64,
}

impl AssignedTask {
    /// Creates a new assigned task.
    pub fn new(start: i64, job_id: usize, task_id: usize, duration: i64) -> Self {
        Self {
            start,
            job_id,
            task_id,
            duration,
        }
    }

    /// End time (exclusive).
    #[inline]
    pub fn end(&self) -> i64 {
        self.start + self.duration
    }

    /// The operation this task schedules.
    #[inline]
    pub fn coord(&self) -> TaskCoord {
        TaskCoord::new(self.job_id, self.task_id)
    }
}

/// Assigned tasks grouped by machine.
///
/// One bucket per machine id, created up front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSchedule {
    machines: Vec<Vec<AssignedTask>>,
}

impl MachineSchedule {
    /// Creates `machine_count` empty buckets.
    pub fn new(machine_count: usize) -> Self {
        Self {
            machines: vec![Vec::new(); machine_count],
        }
    }

    /// Number of machine buckets.
    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }

    /// Appends a task to `machine`'s bucket.
    ///
    /// # Errors
    /// [`ScheduleError::UnknownMachine`] if `machine` has no bucket.
    pub fn push(&mut self, machine: usize, task: AssignedTask) -> Result<(), ScheduleError> {
        let bucket = self
            .machines
            .get_mut(machine)
            .ok_or(ScheduleError::UnknownMachine {
                coord: task.coord(),
                machine,
            })?;
        bucket.push(task);
        Ok(())
    }

    /// Sorts every bucket by `(start, job_id, task_id)`.
    pub fn sort(&mut self) {
        for tasks in &mut self.machines {
            tasks.sort_unstable();
        }
    }

    /// Tasks on `machine` (empty for an unknown machine).
    pub fn tasks_on(&self, machine: usize) -> &[AssignedTask] {
        self.machines.get(machine).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterates `(machine, tasks)` in machine order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[AssignedTask])> + '_ {
        self.machines
            .iter()
            .enumerate()
            .map(|(m, tasks)| (m, tasks.as_slice()))
    }

    /// Total number of assigned tasks.
    pub fn task_count(&self) -> usize {
        self.machines.iter().map(Vec::len).sum()
    }

    /// Whether no task is assigned.
    pub fn is_empty(&self) -> bool {
        self.machines.iter().all(Vec::is_empty)
    }

    /// Finds the machine and assignment for an operation.
    pub fn find(&self, coord: TaskCoord) -> Option<(usize, &AssignedTask)> {
        self.iter().find_map(|(m, tasks)| {
            tasks
                .iter()
                .find(|t| t.coord() == coord)
                .map(|t| (m, t))
        })
    }

    /// Latest end time across all machines.
    pub fn makespan(&self) -> i64 {
        self.machines
            .iter()
            .flatten()
            .map(AssignedTask::end)
            .max()
            .unwrap_or(0)
    }

    /// Latest end time of a job's operations.
    pub fn job_completion(&self, job_id: usize) -> Option<i64> {
        self.machines
            .iter()
            .flatten()
            .filter(|t| t.job_id == job_id)
            .map(AssignedTask::end)
            .max()
    }

    /// Total processing time on `machine`.
    pub fn machine_busy_time(&self, machine: usize) -> i64 {
        self.tasks_on(machine).iter().map(|t| t.duration).sum()
    }
}

/// A schedule defect found by verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (`job_{j}_task_{t}` or `machine_{m}`).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// An operation of the instance is not scheduled.
    MissingTask,
    /// An operation is scheduled more than once.
    DuplicateTask,
    /// A task that does not belong to the instance.
    UnknownTask,
    /// An operation is placed on a machine other than its own.
    WrongMachine,
    /// A task's duration differs from the operation's.
    DurationMismatch,
    /// A task starts before time zero.
    NegativeStart,
    /// An operation starts before its predecessor in the job finished.
    PrecedenceViolation,
    /// Two tasks overlap on one machine.
    MachineOverlap,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let severity = match violation_type {
            ViolationType::MissingTask | ViolationType::UnknownTask => 100,
            ViolationType::MachineOverlap | ViolationType::PrecedenceViolation => 95,
            ViolationType::DuplicateTask | ViolationType::WrongMachine => 90,
            ViolationType::DurationMismatch | ViolationType::NegativeStart => 80,
        };
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity,
        }
    }

    /// Creates a precedence violation.
    pub fn precedence_violation(coord: TaskCoord, message: impl Into<String>) -> Self {
        Self::new(ViolationType::PrecedenceViolation, coord.to_string(), message)
    }

    /// Creates a machine overlap violation.
    pub fn machine_overlap(machine: usize, message: impl Into<String>) -> Self {
        Self::new(ViolationType::MachineOverlap, format!("machine_{machine}"), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MachineSchedule {
        let mut s = MachineSchedule::new(2);
        s.push(0, AssignedTask::new(3, 1, 0, 2)).unwrap();
        s.push(0, AssignedTask::new(0, 0, 0, 3)).unwrap();
        s.push(1, AssignedTask::new(3, 0, 1, 4)).unwrap();
        s.sort();
        s
    }

    #[test]
    fn test_assigned_task_ordering() {
        let a = AssignedTask::new(2, 1, 0, 5);
        let b = AssignedTask::new(2, 0, 3, 1);
        let c = AssignedTask::new(1, 9, 9, 9);
        let mut tasks = vec![a, b, c];
        tasks.sort();
        assert_eq!(tasks, vec![c, b, a]);
        assert_eq!(a.end(), 7);
        assert_eq!(a.coord(), TaskCoord::new(1, 0));
    }

    #[test]
    fn test_buckets_created_up_front() {
        let s = MachineSchedule::new(3);
        assert_eq!(s.machine_count(), 3);
        assert!(s.is_empty());
        assert!(s.tasks_on(2).is_empty());
        assert!(s.tasks_on(7).is_empty());
        assert_eq!(s.makespan(), 0);
    }

    #[test]
    fn test_sort_and_queries() {
        let s = sample();
        assert_eq!(s.tasks_on(0)[0].job_id, 0);
        assert_eq!(s.tasks_on(0)[1].job_id, 1);
        assert_eq!(s.task_count(), 3);
        assert_eq!(s.makespan(), 7);
        assert_eq!(s.job_completion(0), Some(7));
        assert_eq!(s.job_completion(1), Some(5));
        assert_eq!(s.job_completion(4), None);
        assert_eq!(s.machine_busy_time(0), 5);
    }

    #[test]
    fn test_find() {
        let s = sample();
        let (machine, task) = s.find(TaskCoord::new(0, 1)).unwrap();
        assert_eq!(machine, 1);
        assert_eq!(task.start, 3);
        assert!(s.find(TaskCoord::new(5, 0)).is_none());
    }

    #[test]
    fn test_push_rejects_unknown_machine() {
        let mut s = MachineSchedule::new(1);
        let err = s.push(2, AssignedTask::new(0, 0, 0, 1)).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::UnknownMachine {
                coord: TaskCoord::new(0, 0),
                machine: 2,
            }
        );
        assert_eq!(s.machine_count(), 1);
        assert!(s.is_empty());
    }

    #[test]
    fn test_violation_severity() {
        let v = Violation::machine_overlap(2, "overlap");
        assert_eq!(v.entity_id, "machine_2");
        assert_eq!(v.severity, 95);

        let v = Violation::new(ViolationType::MissingTask, "job_0_task_0", "missing");
        assert_eq!(v.severity, 100);
    }
}
