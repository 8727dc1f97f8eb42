//! CP model definition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::variables::{IntVar, IntervalId, IntervalVar, VarId};

/// A constraint in the CP model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    /// Non-overlapping intervals on a shared resource.
    ///
    /// No two intervals in the set may overlap in time.
    NoOverlap {
        /// Intervals that must not overlap.
        intervals: Vec<IntervalId>,
    },

    /// Linear inequality: `sum(coef * var) >= lower_bound`.
    Linear {
        /// (variable, coefficient) pairs.
        terms: Vec<(VarId, i64)>,
        /// Right-hand side.
        lower_bound: i64,
    },

    /// `target = max(vars)`.
    MaxEquality {
        /// Variable bound to the maximum.
        target: VarId,
        /// Variables the maximum is taken over.
        vars: Vec<VarId>,
    },
}

/// Objective function for the CP model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    /// Minimize a single integer variable.
    Minimize(VarId),
    /// Maximize a single integer variable.
    Maximize(VarId),
}

impl Objective {
    /// The variable being optimized.
    pub fn var(&self) -> VarId {
        match *self {
            Objective::Minimize(v) | Objective::Maximize(v) => v,
        }
    }
}

/// Reasons a model is rejected before search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A constraint or interval references a variable that does not exist.
    #[error("undefined variable: {0}")]
    UnknownVariable(VarId),
    /// A constraint references an interval that does not exist.
    #[error("undefined interval: {0}")]
    UnknownInterval(IntervalId),
    /// A variable was declared with `min > max`.
    #[error("variable '{name}' has an empty domain [{min}, {max}]")]
    EmptyDomain { name: String, min: i64, max: i64 },
    /// An interval was declared with a negative duration.
    #[error("interval '{name}' has negative duration {duration}")]
    NegativeDuration { name: String, duration: i64 },
    /// A max-equality constraint has nothing to take the maximum over.
    #[error("max-equality on {target} has no operands")]
    EmptyMaxEquality { target: VarId },
}

/// A constraint programming model.
///
/// Contains variables, constraints, and an optional objective function.
/// Variables are addressed through the handles returned on creation.
///
/// # Examples
///
/// ```
/// use u_jobshop::engine::CpModel;
///
/// let mut model = CpModel::new("example");
/// let s1 = model.new_int_var(0, 100, "s1");
/// let e1 = model.new_int_var(0, 100, "e1");
/// let op1 = model.new_interval_var(s1, 50, e1, "op1");
/// let s2 = model.new_int_var(0, 100, "s2");
/// let e2 = model.new_int_var(0, 100, "e2");
/// let op2 = model.new_interval_var(s2, 30, e2, "op2");
/// model.add_no_overlap([op1, op2]);
///
/// let makespan = model.new_int_var(0, 100, "makespan");
/// model.add_max_equality(makespan, [e1, e2]);
/// model.minimize(makespan);
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    /// Integer variables, indexed by [`VarId`].
    int_vars: Vec<IntVar>,
    /// Interval variables, indexed by [`IntervalId`].
    intervals: Vec<IntervalVar>,
    /// Constraints.
    constraints: Vec<Constraint>,
    /// Objective function.
    objective: Option<Objective>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds an integer variable with domain `[min, max]`.
    pub fn new_int_var(&mut self, min: i64, max: i64, name: impl Into<String>) -> VarId {
        self.int_vars.push(IntVar::new(name, min, max));
        VarId(self.int_vars.len() - 1)
    }

    /// Adds an integer variable fixed to `value`.
    pub fn new_constant(&mut self, value: i64, name: impl Into<String>) -> VarId {
        self.int_vars.push(IntVar::fixed(name, value));
        VarId(self.int_vars.len() - 1)
    }

    /// Adds an interval enforcing `end = start + duration`.
    pub fn new_interval_var(
        &mut self,
        start: VarId,
        duration: i64,
        end: VarId,
        name: impl Into<String>,
    ) -> IntervalId {
        self.intervals.push(IntervalVar::new(name, start, duration, end));
        IntervalId(self.intervals.len() - 1)
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: add a no-overlap constraint.
    pub fn add_no_overlap(&mut self, intervals: impl IntoIterator<Item = IntervalId>) {
        self.add_constraint(Constraint::NoOverlap {
            intervals: intervals.into_iter().collect(),
        });
    }

    /// Posts `sum(coef * var) >= lower_bound`.
    pub fn add_linear_ge(&mut self, terms: impl IntoIterator<Item = (VarId, i64)>, lower_bound: i64) {
        self.add_constraint(Constraint::Linear {
            terms: terms.into_iter().collect(),
            lower_bound,
        });
    }

    /// Posts `sum(coef * var) <= upper_bound`.
    pub fn add_linear_le(&mut self, terms: impl IntoIterator<Item = (VarId, i64)>, upper_bound: i64) {
        self.add_constraint(Constraint::Linear {
            terms: terms.into_iter().map(|(v, c)| (v, -c)).collect(),
            lower_bound: -upper_bound,
        });
    }

    /// Posts `lhs >= rhs`.
    pub fn add_greater_or_equal(&mut self, lhs: VarId, rhs: VarId) {
        self.add_linear_ge([(lhs, 1), (rhs, -1)], 0);
    }

    /// Posts `target = max(vars)`.
    pub fn add_max_equality(&mut self, target: VarId, vars: impl IntoIterator<Item = VarId>) {
        self.add_constraint(Constraint::MaxEquality {
            target,
            vars: vars.into_iter().collect(),
        });
    }

    /// Sets the objective to minimizing `var`.
    pub fn minimize(&mut self, var: VarId) {
        self.objective = Some(Objective::Minimize(var));
    }

    /// Sets the objective to maximizing `var`.
    pub fn maximize(&mut self, var: VarId) {
        self.objective = Some(Objective::Maximize(var));
    }

    /// The objective, if one was set.
    pub fn objective(&self) -> Option<Objective> {
        self.objective
    }

    /// Looks up an integer variable.
    pub fn int_var(&self, id: VarId) -> Option<&IntVar> {
        self.int_vars.get(id.0)
    }

    /// Looks up an interval variable.
    pub fn interval(&self, id: IntervalId) -> Option<&IntervalVar> {
        self.intervals.get(id.0)
    }

    /// All integer variables in creation order.
    pub fn int_vars(&self) -> &[IntVar] {
        &self.int_vars
    }

    /// All interval variables in creation order.
    pub fn intervals(&self) -> &[IntervalVar] {
        &self.intervals
    }

    /// All constraints in posting order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every referenced handle exists, that domains are
    /// non-empty, and that durations are non-negative.
    pub fn validate(&self) -> Result<(), ModelError> {
        for var in &self.int_vars {
            if var.min > var.max {
                return Err(ModelError::EmptyDomain {
                    name: var.name.clone(),
                    min: var.min,
                    max: var.max,
                });
            }
        }

        for interval in &self.intervals {
            self.check_var(interval.start)?;
            self.check_var(interval.end)?;
            if interval.duration < 0 {
                return Err(ModelError::NegativeDuration {
                    name: interval.name.clone(),
                    duration: interval.duration,
                });
            }
        }

        for constraint in &self.constraints {
            match constraint {
                Constraint::NoOverlap { intervals } => {
                    for &id in intervals {
                        if id.0 >= self.intervals.len() {
                            return Err(ModelError::UnknownInterval(id));
                        }
                    }
                }
                Constraint::Linear { terms, .. } => {
                    for &(var, _) in terms {
                        self.check_var(var)?;
                    }
                }
                Constraint::MaxEquality { target, vars } => {
                    self.check_var(*target)?;
                    if vars.is_empty() {
                        return Err(ModelError::EmptyMaxEquality { target: *target });
                    }
                    for &var in vars {
                        self.check_var(var)?;
                    }
                }
            }
        }

        if let Some(objective) = self.objective {
            self.check_var(objective.var())?;
        }

        Ok(())
    }

    fn check_var(&self, id: VarId) -> Result<(), ModelError> {
        if id.0 < self.int_vars.len() {
            Ok(())
        } else {
            Err(ModelError::UnknownVariable(id))
        }
    }

    /// Returns the number of integer variables.
    pub fn int_var_count(&self) -> usize {
        self.int_vars.len()
    }

    /// Returns the number of interval variables.
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}
