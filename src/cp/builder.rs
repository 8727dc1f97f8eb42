//! Job-shop CP formulation.
//!
//! # Formulation
//!
//! For every operation `(j, t)` with duration `d`:
//! - `start_j_t, end_j_t ∈ [0, horizon]`
//! - `interval_j_t` enforcing `end = start + d`
//!
//! Constraints:
//! - `NoOverlap` over the intervals of each machine
//! - `start_j_(t+1) >= end_j_t` within each job
//! - `makespan = max_j(end of last operation of j)`, minimized
//!
//! # Reference
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

use serde::{Deserialize, Serialize};

use crate::engine::{CpModel, IntervalId, VarId};
use crate::models::{Instance, TaskCoord};

/// Variables created for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskVars {
    /// Start time variable.
    pub start: VarId,
    /// End time variable.
    pub end: VarId,
    /// Interval tying start and end.
    pub interval: IntervalId,
    /// Machine the operation runs on.
    pub machine: usize,
    /// Processing time.
    pub duration: i64,
}

/// A built job-shop model: the CP model plus the handles needed to read
/// a solution back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobShopModel {
    model: CpModel,
    all_tasks: Vec<Vec<TaskVars>>,
    machine_to_intervals: Vec<Vec<IntervalId>>,
    makespan: VarId,
    horizon: i64,
}

impl JobShopModel {
    /// The underlying CP model.
    pub fn cp_model(&self) -> &CpModel {
        &self.model
    }

    /// Variables of one operation.
    pub fn task(&self, coord: TaskCoord) -> Option<&TaskVars> {
        self.all_tasks
            .get(coord.job_id)
            .and_then(|job| job.get(coord.task_id))
    }

    /// Variables of every operation, in job then task order.
    pub fn tasks(&self) -> impl Iterator<Item = (TaskCoord, &TaskVars)> + '_ {
        self.all_tasks.iter().enumerate().flat_map(|(job_id, job)| {
            job.iter()
                .enumerate()
                .map(move |(task_id, vars)| (TaskCoord::new(job_id, task_id), vars))
        })
    }

    /// Intervals on `machine`, in job/task discovery order.
    pub fn machine_intervals(&self, machine: usize) -> &[IntervalId] {
        self.machine_to_intervals
            .get(machine)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of machines.
    pub fn machine_count(&self) -> usize {
        self.machine_to_intervals.len()
    }

    /// The makespan variable (the objective).
    pub fn makespan(&self) -> VarId {
        self.makespan
    }

    /// Upper bound of every time variable.
    pub fn horizon(&self) -> i64 {
        self.horizon
    }
}

/// Builds a [`JobShopModel`] from an [`Instance`].
///
/// Deterministic: the same instance always yields the same variables,
/// constraints and handles.
///
/// # Example
/// ```
/// use u_jobshop::cp::JobShopCpBuilder;
/// use u_jobshop::samples::minimal_jobshop;
///
/// let instance = minimal_jobshop();
/// let model = JobShopCpBuilder::new(&instance).build();
/// assert_eq!(model.cp_model().interval_count(), 8);
/// ```
pub struct JobShopCpBuilder<'a> {
    instance: &'a Instance,
}

impl<'a> JobShopCpBuilder<'a> {
    /// Creates a new builder.
    pub fn new(instance: &'a Instance) -> Self {
        Self { instance }
    }

    /// Builds the model.
    pub fn build(&self) -> JobShopModel {
        let horizon = self.instance.horizon();
        let mut model = CpModel::new("jobshop");
        let mut machine_to_intervals = vec![Vec::new(); self.instance.machine_count()];
        let mut all_tasks = Vec::with_capacity(self.instance.job_count());

        // Variables
        for job in self.instance.jobs() {
            let mut job_vars = Vec::with_capacity(job.len());
            for (task_id, op) in job.operations.iter().enumerate() {
                let suffix = format!("_{}_{}", job.id, task_id);
                let start = model.new_int_var(0, horizon, format!("start{suffix}"));
                let end = model.new_int_var(0, horizon, format!("end{suffix}"));
                let interval =
                    model.new_interval_var(start, op.duration, end, format!("interval{suffix}"));
                machine_to_intervals[op.machine].push(interval);
                job_vars.push(TaskVars {
                    start,
                    end,
                    interval,
                    machine: op.machine,
                    duration: op.duration,
                });
            }
            all_tasks.push(job_vars);
        }

        // Machine exclusivity
        for intervals in &machine_to_intervals {
            model.add_no_overlap(intervals.iter().copied());
        }

        // Job order
        for job_vars in &all_tasks {
            for pair in job_vars.windows(2) {
                model.add_greater_or_equal(pair[1].start, pair[0].end);
            }
        }

        // Objective
        let makespan = model.new_int_var(0, horizon, "makespan");
        model.add_max_equality(
            makespan,
            all_tasks
                .iter()
                .filter_map(|job_vars| job_vars.last().map(|v| v.end)),
        );
        model.minimize(makespan);

        JobShopModel {
            model,
            all_tasks,
            machine_to_intervals,
            makespan,
            horizon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Constraint, Objective};
    use crate::samples::{minimal_jobshop, single_job};

    #[test]
    fn test_build_model() {
        let instance = minimal_jobshop();
        let jsm = JobShopCpBuilder::new(&instance).build();
        let model = jsm.cp_model();

        // 8 operations × (start, end) + makespan
        assert_eq!(model.int_var_count(), 17);
        assert_eq!(model.interval_count(), 8);
        // 3 no-overlap + 5 precedence + 1 max-equality
        assert_eq!(model.constraint_count(), 9);
        assert_eq!(model.objective(), Some(Objective::Minimize(jsm.makespan())));
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_variable_domains_and_names() {
        let instance = minimal_jobshop();
        let jsm = JobShopCpBuilder::new(&instance).build();
        let vars = jsm.task(TaskCoord::new(1, 2)).unwrap();

        let start = jsm.cp_model().int_var(vars.start).unwrap();
        assert_eq!(start.name, "start_1_2");
        assert_eq!((start.min, start.max), (0, 23));

        let interval = jsm.cp_model().interval(vars.interval).unwrap();
        assert_eq!(interval.name, "interval_1_2");
        assert_eq!(interval.duration, 4);
        assert_eq!(vars.machine, 1);
    }

    #[test]
    fn test_machine_index() {
        let instance = minimal_jobshop();
        let jsm = JobShopCpBuilder::new(&instance).build();

        assert_eq!(jsm.machine_count(), 3);
        // Machine 1 hosts job_0_task_1, job_1_task_2, job_2_task_0.
        let expected: Vec<IntervalId> = [(0, 1), (1, 2), (2, 0)]
            .iter()
            .map(|&(j, t)| jsm.task(TaskCoord::new(j, t)).unwrap().interval)
            .collect();
        assert_eq!(jsm.machine_intervals(1), expected.as_slice());
        assert!(jsm.machine_intervals(9).is_empty());

        let total: usize = (0..3).map(|m| jsm.machine_intervals(m).len()).sum();
        assert_eq!(total, instance.operation_count());
    }

    #[test]
    fn test_precedence_constraints() {
        let instance = single_job();
        let jsm = JobShopCpBuilder::new(&instance).build();
        let t0 = jsm.task(TaskCoord::new(0, 0)).unwrap();
        let t1 = jsm.task(TaskCoord::new(0, 1)).unwrap();

        let expected = Constraint::Linear {
            terms: vec![(t1.start, 1), (t0.end, -1)],
            lower_bound: 0,
        };
        assert!(jsm.cp_model().constraints().contains(&expected));
    }

    #[test]
    fn test_makespan_over_last_operations() {
        let instance = minimal_jobshop();
        let jsm = JobShopCpBuilder::new(&instance).build();
        let lasts: Vec<VarId> = [(0, 2), (1, 2), (2, 1)]
            .iter()
            .map(|&(j, t)| jsm.task(TaskCoord::new(j, t)).unwrap().end)
            .collect();

        let expected = Constraint::MaxEquality {
            target: jsm.makespan(),
            vars: lasts,
        };
        assert!(jsm.cp_model().constraints().contains(&expected));
    }

    #[test]
    fn test_deterministic() {
        let instance = minimal_jobshop();
        let a = JobShopCpBuilder::new(&instance).build();
        let b = JobShopCpBuilder::new(&instance).build();
        assert_eq!(a.cp_model().constraints(), b.cp_model().constraints());
        assert_eq!(a.cp_model().int_vars(), b.cp_model().int_vars());
    }
}
