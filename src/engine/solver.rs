//! CP solver interface.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::model::CpModel;
use super::variables::VarId;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not necessarily optimal) solution found.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Search stopped before finding a solution or proving there is none.
    Unknown,
}

impl SolverStatus {
    /// Whether this status carries a usable assignment.
    pub fn is_solution(self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolverStatus::Optimal => "OPTIMAL",
            SolverStatus::Feasible => "FEASIBLE",
            SolverStatus::Infeasible => "INFEASIBLE",
            SolverStatus::ModelInvalid => "MODEL_INVALID",
            SolverStatus::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Search counters reported alongside a solution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Search nodes explored.
    pub nodes: u64,
    /// Nodes closed by a propagation failure.
    pub failures: u64,
    /// Improving solutions found.
    pub solutions: u64,
}

/// Solution from a CP solver.
///
/// `values` is indexed by [`VarId`] and is empty unless
/// [`is_solution_found`](Self::is_solution_found) holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective value of the reported assignment (if any).
    pub objective_value: Option<i64>,
    /// Integer variable assignments.
    pub values: Vec<i64>,
    /// Solve time in milliseconds.
    pub solve_time_ms: u64,
    /// Search counters.
    pub stats: SearchStats,
}

impl CpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: Vec::new(),
            solve_time_ms: 0,
            stats: SearchStats::default(),
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        self.status.is_solution()
    }

    /// Resolved value of `var`.
    ///
    /// `None` when no solution was found or the handle is out of range.
    pub fn value(&self, var: VarId) -> Option<i64> {
        if !self.is_solution_found() {
            return None;
        }
        self.values.get(var.index()).copied()
    }
}

/// Solver configuration.
///
/// # Builder Pattern
///
/// ```
/// use u_jobshop::engine::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_time_limit_ms(5_000)
///     .with_node_limit(1_000_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Optional wall-clock time limit in milliseconds.
    ///
    /// When the limit is hit the solver returns the best solution found so
    /// far (`Feasible`) or `Unknown`. `None` searches to completion.
    pub time_limit_ms: Option<u64>,
    /// Optional cap on explored search nodes, same semantics as the time limit.
    pub node_limit: Option<u64>,
    /// Stop after finding the first feasible solution.
    pub stop_after_first: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: None,
            node_limit: None,
            stop_after_first: false,
        }
    }
}

impl SolverConfig {
    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the node limit.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Stops at the first solution instead of proving optimality.
    pub fn with_stop_after_first(mut self, stop: bool) -> Self {
        self.stop_after_first = stop;
        self
    }

    /// Preset for interactive use: ten seconds, best solution found.
    pub fn quick() -> Self {
        Self {
            time_limit_ms: Some(10_000),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive or None".into());
        }
        if self.node_limit == Some(0) {
            return Err("node_limit must be positive or None".into());
        }
        Ok(())
    }
}

/// Trait for CP solver implementations.
///
/// Implementors provide the actual constraint solving logic. This can wrap
/// an external engine (e.g., OR-Tools CP-SAT) or run the bundled
/// [`BranchAndBoundSolver`](super::BranchAndBoundSolver).
pub trait CpSolver {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

impl<S: CpSolver + ?Sized> CpSolver for &S {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        (**self).solve(model, config)
    }
}

impl<S: CpSolver + ?Sized> CpSolver for Box<S> {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        (**self).solve(model, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(SolverStatus::Optimal.to_string(), "OPTIMAL");
        assert_eq!(SolverStatus::Unknown.to_string(), "UNKNOWN");
        assert!(SolverStatus::Feasible.is_solution());
        assert!(!SolverStatus::Infeasible.is_solution());
        assert!(!SolverStatus::ModelInvalid.is_solution());
    }

    #[test]
    fn test_value_requires_solution() {
        let mut solution = CpSolution::empty(SolverStatus::Unknown);
        solution.values = vec![4, 5];
        assert_eq!(solution.value(VarId(0)), None);

        solution.status = SolverStatus::Feasible;
        assert_eq!(solution.value(VarId(1)), Some(5));
        assert_eq!(solution.value(VarId(2)), None);
    }

    #[test]
    fn test_solver_config_default() {
        let config = SolverConfig::default();
        assert_eq!(config.time_limit_ms, None);
        assert_eq!(config.node_limit, None);
        assert!(!config.stop_after_first);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_solver_config_validate() {
        assert!(SolverConfig::default().with_time_limit_ms(0).validate().is_err());
        assert!(SolverConfig::default().with_node_limit(0).validate().is_err());
        assert!(SolverConfig::quick().validate().is_ok());
    }

    #[test]
    fn test_solver_config_from_partial_json() {
        let config: SolverConfig = serde_json::from_str(r#"{"time_limit_ms": 250}"#).unwrap();
        assert_eq!(config.time_limit_ms, Some(250));
        assert!(!config.stop_after_first);
    }
}
