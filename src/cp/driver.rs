//! Solve driver and end-to-end pipeline.
//!
//! [`solve`] runs an engine against a built model and logs the outcome.
//! [`JobShopSolver`] chains build, solve, extraction and formatting into a
//! single [`JobShopReport`].

use serde::{Deserialize, Serialize};

use crate::engine::{
    BranchAndBoundSolver, CpSolution, CpSolver, SearchStats, SolverConfig, SolverStatus,
};
use crate::logging::{LogFacade, SolveLogger};
use crate::models::{Instance, MachineSchedule};
use crate::report::TimetableFormatter;

use super::builder::{JobShopCpBuilder, JobShopModel};
use super::extract::try_extract_solution;

/// Status and assignment of one solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Solver status.
    pub status: SolverStatus,
    /// Raw engine output; values are read through [`CpSolution::value`].
    pub solution: CpSolution,
}

impl SolveOutcome {
    /// Wraps an engine result.
    pub fn new(solution: CpSolution) -> Self {
        Self {
            status: solution.status,
            solution,
        }
    }

    /// Whether the status is `Optimal` or `Feasible`.
    pub fn is_solution_found(&self) -> bool {
        self.status.is_solution()
    }

    /// Objective value, if a solution was found.
    pub fn objective_value(&self) -> Option<i64> {
        if self.is_solution_found() {
            self.solution.objective_value
        } else {
            None
        }
    }
}

/// Runs `solver` on `model` under `config`.
///
/// Logs `"Start solving model..."` before the run, then either
/// `"Solve finished successfully."` or a `"No solution found."` warning.
pub fn solve<S: CpSolver>(
    model: &JobShopModel,
    solver: &S,
    config: &SolverConfig,
    logger: &dyn SolveLogger,
) -> SolveOutcome {
    logger.info("Start solving model...");
    let outcome = SolveOutcome::new(solver.solve(model.cp_model(), config));

    if outcome.is_solution_found() {
        logger.info("Solve finished successfully.");
    } else {
        logger.warning("No solution found.");
    }

    outcome
}

/// Result of [`JobShopSolver::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobShopReport {
    /// Final solver status.
    pub status: SolverStatus,
    /// Makespan of the reported schedule.
    pub makespan: Option<i64>,
    /// Per-machine schedule, present only for `Optimal` and `Feasible`.
    pub schedule: Option<MachineSchedule>,
    /// Rendered timetable, present together with the schedule.
    pub timetable: Option<String>,
    /// Engine search counters.
    pub stats: SearchStats,
    /// Engine wall-clock time in milliseconds.
    pub solve_time_ms: u64,
}

impl JobShopReport {
    /// Whether a schedule is available.
    pub fn is_solution_found(&self) -> bool {
        self.schedule.is_some()
    }

    /// One-line description of the result.
    pub fn summary(&self) -> String {
        match (&self.schedule, self.makespan) {
            (Some(schedule), Some(makespan)) => format!(
                "{}: makespan {} ({} tasks on {} machines, {} nodes, {} ms)",
                self.status,
                makespan,
                schedule.task_count(),
                schedule.machine_count(),
                self.stats.nodes,
                self.solve_time_ms
            ),
            _ => format!("{}: no schedule available", self.status),
        }
    }
}

/// Build → solve → extract → format pipeline.
///
/// # Example
/// ```
/// use u_jobshop::cp::JobShopSolver;
/// use u_jobshop::engine::SolverStatus;
/// use u_jobshop::samples::minimal_jobshop;
///
/// let report = JobShopSolver::new().run(&minimal_jobshop());
/// assert_eq!(report.status, SolverStatus::Optimal);
/// assert_eq!(report.makespan, Some(11));
/// ```
pub struct JobShopSolver<S = BranchAndBoundSolver> {
    solver: S,
    config: SolverConfig,
    formatter: TimetableFormatter,
    logger: Box<dyn SolveLogger>,
}

impl JobShopSolver<BranchAndBoundSolver> {
    /// Creates a pipeline with the bundled engine, default config and
    /// the `log` facade.
    pub fn new() -> Self {
        Self {
            solver: BranchAndBoundSolver::new(),
            config: SolverConfig::default(),
            formatter: TimetableFormatter::default(),
            logger: Box::new(LogFacade),
        }
    }
}

impl Default for JobShopSolver<BranchAndBoundSolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CpSolver> JobShopSolver<S> {
    /// Replaces the engine.
    pub fn with_solver<T: CpSolver>(self, solver: T) -> JobShopSolver<T> {
        JobShopSolver {
            solver,
            config: self.config,
            formatter: self.formatter,
            logger: self.logger,
        }
    }

    /// Sets the solver configuration.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the timetable formatter.
    pub fn with_formatter(mut self, formatter: TimetableFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Sets the logging sink.
    pub fn with_logger(mut self, logger: impl SolveLogger + 'static) -> Self {
        self.logger = Box::new(logger);
        self
    }

    /// The solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves `instance` and renders the result.
    ///
    /// A missing solution is not an error: the report then carries the
    /// status and no schedule, and a warning is logged.
    pub fn run(&self, instance: &Instance) -> JobShopReport {
        let model = JobShopCpBuilder::new(instance).build();
        let outcome = solve(&model, &self.solver, &self.config, &*self.logger);

        let mut report = JobShopReport {
            status: outcome.status,
            makespan: None,
            schedule: None,
            timetable: None,
            stats: outcome.solution.stats,
            solve_time_ms: outcome.solution.solve_time_ms,
        };

        if !outcome.is_solution_found() {
            self.logger.warning("No feasible solution to log.");
            return report;
        }

        let schedule = match try_extract_solution(&model, &outcome) {
            Ok(schedule) => schedule,
            Err(e) => {
                self.logger.warning(&e.to_string());
                return report;
            }
        };

        let makespan = outcome
            .objective_value()
            .unwrap_or_else(|| schedule.makespan());
        let timetable = self.formatter.format(&schedule);

        self.logger.info(&format!("Optimal Schedule Length: {makespan}"));
        self.logger.info(&format!("\n{timetable}"));

        report.makespan = Some(makespan);
        report.timetable = Some(timetable);
        report.schedule = Some(schedule);
        report
    }
}
