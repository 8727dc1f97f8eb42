//! Schedule quality metrics (KPIs).
//!
//! Computes standard job-shop performance indicators from a schedule and
//! its instance.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest completion time |
//! | Lower Bound | max(longest job, busiest machine) |
//! | Gap | (C_max - LB) / LB |
//! | Utilization | busy time / makespan, per machine |
//! | Avg Flow Time | Mean job completion time (all jobs released at 0) |
//! | Idle Time | Sum over machines of makespan - busy time |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};

use crate::models::{Instance, MachineSchedule};

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Makespan: latest completion time.
    pub makespan: i64,
    /// Trivial lower bound of the instance.
    pub lower_bound: i64,
    /// Relative distance of the makespan above the lower bound (0.0 = tight).
    pub gap: f64,
    /// Busy time per machine.
    pub busy_time_by_machine: Vec<i64>,
    /// Utilization per machine (0.0..1.0).
    pub utilization_by_machine: Vec<f64>,
    /// Average machine utilization (0.0..1.0).
    pub avg_utilization: f64,
    /// Average job completion time.
    pub avg_flow_time: f64,
    /// Total machine idle time before the makespan.
    pub total_idle_time: i64,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its instance.
    pub fn calculate(schedule: &MachineSchedule, instance: &Instance) -> Self {
        let makespan = schedule.makespan();
        let lower_bound = instance.lower_bound();

        let busy_time_by_machine: Vec<i64> = instance
            .machines()
            .map(|m| schedule.machine_busy_time(m))
            .collect();

        let utilization_by_machine: Vec<f64> = busy_time_by_machine
            .iter()
            .map(|&busy| {
                if makespan > 0 {
                    busy as f64 / makespan as f64
                } else {
                    0.0
                }
            })
            .collect();

        let avg_utilization = if utilization_by_machine.is_empty() {
            0.0
        } else {
            utilization_by_machine.iter().sum::<f64>() / utilization_by_machine.len() as f64
        };

        let completions: Vec<i64> = instance
            .jobs()
            .iter()
            .filter_map(|job| schedule.job_completion(job.id))
            .collect();
        let avg_flow_time = if completions.is_empty() {
            0.0
        } else {
            completions.iter().sum::<i64>() as f64 / completions.len() as f64
        };

        let total_idle_time = busy_time_by_machine
            .iter()
            .map(|&busy| (makespan - busy).max(0))
            .sum();

        let gap = if lower_bound > 0 {
            (makespan - lower_bound) as f64 / lower_bound as f64
        } else {
            0.0
        };

        Self {
            makespan,
            lower_bound,
            gap,
            busy_time_by_machine,
            utilization_by_machine,
            avg_utilization,
            avg_flow_time,
            total_idle_time,
        }
    }

    /// Whether the makespan provably matches the lower bound.
    pub fn is_lower_bound_tight(&self) -> bool {
        self.makespan == self.lower_bound
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_gap: f64, min_utilization: f64) -> bool {
        self.gap <= max_gap && self.avg_utilization >= min_utilization
    }
}
