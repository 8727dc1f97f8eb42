//! Job-shop instance model.
//!
//! An instance is a list of jobs; each job is a fixed-order list of
//! operations, and each operation occupies one machine for a known
//! duration. Machine count and horizon are derived once at construction.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 7

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use crate::error::InstanceError;
use crate::validation::validate_jobs;

/// One step of a job: a machine and how long it is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    /// Machine index.
    pub machine: usize,
    /// Processing time (strictly positive).
    pub duration: i64,
}

impl Operation {
    /// Creates a new operation.
    pub fn new(machine: usize, duration: i64) -> Self {
        Self { machine, duration }
    }
}

/// An ordered sequence of operations.
///
/// Operation `i` must finish before operation `i + 1` starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Zero-based job index.
    pub id: usize,
    /// Operations in processing order.
    pub operations: Vec<Operation>,
}

impl Job {
    /// Sum of the job's processing times.
    pub fn total_duration(&self) -> i64 {
        self.operations.iter().map(|op| op.duration).sum()
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the job has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Position of an operation: job index and index within the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskCoord {
    /// Job index.
    pub job_id: usize,
    /// Operation index within the job.
    pub task_id: usize,
}

impl TaskCoord {
    /// Creates a new coordinate.
    pub fn new(job_id: usize, task_id: usize) -> Self {
        Self { job_id, task_id }
    }
}

impl fmt::Display for TaskCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job_{}_task_{}", self.job_id, self.task_id)
    }
}

/// A validated job-shop instance.
///
/// Read-only after construction. Serializes as
/// `{"jobs": [[[machine, duration], ...], ...]}`; deserialization runs the
/// same checks as [`Instance::new`].
///
/// # Examples
///
/// ```
/// use u_jobshop::models::Instance;
///
/// let instance = Instance::new(vec![
///     vec![(0, 3), (1, 2), (2, 2)],
///     vec![(0, 2), (2, 1), (1, 4)],
///     vec![(1, 4), (2, 3)],
/// ])
/// .unwrap();
///
/// assert_eq!(instance.machine_count(), 3);
/// assert_eq!(instance.horizon(), 23);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInstance", into = "RawInstance")]
pub struct Instance {
    jobs: Vec<Job>,
    machine_count: usize,
    horizon: i64,
}

/// Wire form: one `(machine, duration)` pair per operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawInstance {
    jobs: Vec<Vec<(i64, i64)>>,
}

impl Instance {
    /// Builds an instance from raw `(machine, duration)` pairs.
    ///
    /// # Errors
    /// The first [`InstanceError`] found; see
    /// [`validate_jobs`](crate::validation::validate_jobs) for all of them.
    pub fn new<J, O>(jobs: J) -> Result<Self, InstanceError>
    where
        J: IntoIterator<Item = O>,
        O: IntoIterator<Item = (i64, i64)>,
    {
        let raw: Vec<Vec<(i64, i64)>> = jobs
            .into_iter()
            .map(|job| job.into_iter().collect())
            .collect();
        Self::from_raw(raw)
    }

    fn from_raw(raw: Vec<Vec<(i64, i64)>>) -> Result<Self, InstanceError> {
        if let Err(mut errors) = validate_jobs(&raw) {
            return Err(errors.swap_remove(0));
        }

        let mut jobs = Vec::with_capacity(raw.len());
        let mut machine_count = 0;
        let mut horizon: i64 = 0;

        for (job_id, ops) in raw.into_iter().enumerate() {
            let mut operations = Vec::with_capacity(ops.len());
            for (task_id, (machine, duration)) in ops.into_iter().enumerate() {
                let machine = usize::try_from(machine).map_err(|_| {
                    InstanceError::NegativeMachine {
                        coord: TaskCoord::new(job_id, task_id),
                        machine,
                    }
                })?;
                machine_count = machine_count.max(machine + 1);
                horizon = horizon
                    .checked_add(duration)
                    .ok_or(InstanceError::HorizonOverflow)?;
                operations.push(Operation::new(machine, duration));
            }
            jobs.push(Job {
                id: job_id,
                operations,
            });
        }

        Ok(Self {
            jobs,
            machine_count,
            horizon,
        })
    }

    /// All jobs in index order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Looks up a job by index.
    pub fn job(&self, job_id: usize) -> Option<&Job> {
        self.jobs.get(job_id)
    }

    /// Looks up an operation by coordinate.
    pub fn operation(&self, coord: TaskCoord) -> Option<&Operation> {
        self.jobs
            .get(coord.job_id)
            .and_then(|job| job.operations.get(coord.task_id))
    }

    /// Every operation with its coordinate, in job then task order.
    pub fn operations(&self) -> impl Iterator<Item = (TaskCoord, &Operation)> + '_ {
        self.jobs.iter().flat_map(|job| {
            job.operations
                .iter()
                .enumerate()
                .map(move |(task_id, op)| (TaskCoord::new(job.id, task_id), op))
        })
    }

    /// One more than the largest machine id referenced.
    pub fn machine_count(&self) -> usize {
        self.machine_count
    }

    /// Sum of all durations; an upper bound on any optimal makespan.
    pub fn horizon(&self) -> i64 {
        self.horizon
    }

    /// Machine ids `0..machine_count`.
    pub fn machines(&self) -> Range<usize> {
        0..self.machine_count
    }

    /// Number of jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Total number of operations.
    pub fn operation_count(&self) -> usize {
        self.jobs.iter().map(Job::len).sum()
    }

    /// Total processing time required on `machine`.
    pub fn machine_load(&self, machine: usize) -> i64 {
        self.operations()
            .filter(|(_, op)| op.machine == machine)
            .map(|(_, op)| op.duration)
            .sum()
    }

    /// Trivial makespan lower bound: the longest job or the busiest machine.
    pub fn lower_bound(&self) -> i64 {
        let longest_job = self.jobs.iter().map(Job::total_duration).max().unwrap_or(0);
        let busiest_machine = self
            .machines()
            .map(|m| self.machine_load(m))
            .max()
            .unwrap_or(0);
        longest_job.max(busiest_machine)
    }
}

impl TryFrom<RawInstance> for Instance {
    type Error = InstanceError;

    fn try_from(raw: RawInstance) -> Result<Self, Self::Error> {
        Self::from_raw(raw.jobs)
    }
}

impl From<Instance> for RawInstance {
    fn from(instance: Instance) -> Self {
        let jobs = instance
            .jobs
            .into_iter()
            .map(|job| {
                job.operations
                    .into_iter()
                    .map(|op| (op.machine as i64, op.duration))
                    .collect()
            })
            .collect();
        Self { jobs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::MAX_MACHINE_ID;

    fn three_jobs() -> Instance {
        Instance::new(vec![
            vec![(0, 3), (1, 2), (2, 2)],
            vec![(0, 2), (2, 1), (1, 4)],
            vec![(1, 4), (2, 3)],
        ])
        .unwrap()
    }

    #[test]
    fn test_derived_constants() {
        let inst = three_jobs();
        assert_eq!(inst.job_count(), 3);
        assert_eq!(inst.operation_count(), 8);
        assert_eq!(inst.machine_count(), 3);
        assert_eq!(inst.machines(), 0..3);
        assert_eq!(inst.horizon(), 23);
    }

    #[test]
    fn test_machine_count_from_max_id() {
        let inst = Instance::new(vec![vec![(4, 1)]]).unwrap();
        assert_eq!(inst.machine_count(), 5);
        assert_eq!(inst.machine_load(0), 0);
        assert_eq!(inst.machine_load(4), 1);
    }

    #[test]
    fn test_operation_lookup() {
        let inst = three_jobs();
        assert_eq!(
            inst.operation(TaskCoord::new(1, 2)),
            Some(&Operation::new(1, 4))
        );
        assert_eq!(inst.operation(TaskCoord::new(2, 2)), None);
        assert_eq!(inst.operation(TaskCoord::new(3, 0)), None);
    }

    #[test]
    fn test_operations_order() {
        let inst = three_jobs();
        let coords: Vec<String> = inst.operations().map(|(c, _)| c.to_string()).collect();
        assert_eq!(coords[0], "job_0_task_0");
        assert_eq!(coords[3], "job_1_task_0");
        assert_eq!(coords[7], "job_2_task_1");
    }

    #[test]
    fn test_lower_bound() {
        let inst = three_jobs();
        // Machine loads: m0 = 5, m1 = 10, m2 = 6; longest job = 7.
        assert_eq!(inst.machine_load(1), 10);
        assert_eq!(inst.lower_bound(), 10);
    }

    #[test]
    fn test_rejects_empty() {
        let err = Instance::new(Vec::<Vec<(i64, i64)>>::new()).unwrap_err();
        assert_eq!(err, InstanceError::NoJobs);

        let err = Instance::new(vec![vec![(0, 1)], vec![]]).unwrap_err();
        assert_eq!(err, InstanceError::EmptyJob { job_id: 1 });
    }

    #[test]
    fn test_rejects_bad_operations() {
        let err = Instance::new(vec![vec![(0, 3), (1, 0)]]).unwrap_err();
        assert_eq!(
            err,
            InstanceError::NonPositiveDuration {
                coord: TaskCoord::new(0, 1),
                duration: 0,
            }
        );

        let err = Instance::new(vec![vec![(-1, 3)]]).unwrap_err();
        assert!(matches!(err, InstanceError::NegativeMachine { machine: -1, .. }));
    }

    #[test]
    fn test_rejects_huge_machine_id() {
        let err = Instance::new(vec![vec![(i64::MAX, 1)]]).unwrap_err();
        assert_eq!(
            err,
            InstanceError::MachineOutOfRange {
                coord: TaskCoord::new(0, 0),
                machine: i64::MAX,
            }
        );

        let err =
            Instance::new(vec![vec![(0, 2)], vec![(MAX_MACHINE_ID + 1, 1)]]).unwrap_err();
        assert!(matches!(err, InstanceError::MachineOutOfRange { .. }));

        let inst = Instance::new(vec![vec![(MAX_MACHINE_ID, 1)]]).unwrap();
        assert_eq!(inst.machine_count(), MAX_MACHINE_ID as usize + 1);
    }

    #[test]
    fn test_deserialize_rejects_huge_machine_id() {
        let result: Result<Instance, _> =
            serde_json::from_str(r#"{"jobs":[[[9223372036854775807,1]]]}"#);
        assert!(result.unwrap_err().to_string().contains("above the limit"));
    }

    #[test]
    fn test_rejects_horizon_overflow() {
        let err = Instance::new(vec![vec![(0, i64::MAX), (1, 1)]]).unwrap_err();
        assert_eq!(err, InstanceError::HorizonOverflow);
    }

    #[test]
    fn test_serde_shape() {
        let inst = Instance::new(vec![vec![(0, 3), (1, 2)]]).unwrap();
        let json = serde_json::to_string(&inst).unwrap();
        assert_eq!(json, r#"{"jobs":[[[0,3],[1,2]]]}"#);

        let back: Instance = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inst);
    }

    #[test]
    fn test_deserialize_validates() {
        let result: Result<Instance, _> = serde_json::from_str(r#"{"jobs":[[[0,0]]]}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("non-positive duration"));
    }
}
