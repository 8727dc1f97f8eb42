//! CP variable types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an integer variable inside a [`CpModel`](super::CpModel).
///
/// Handles are plain indices; they are only meaningful for the model
/// that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in creation order.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Handle to an interval variable inside a [`CpModel`](super::CpModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntervalId(pub(crate) usize);

impl IntervalId {
    /// Position of the interval in creation order.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// An integer variable with a domain [min, max].
///
/// Represents a decision variable that takes integer values within
/// the specified bounds. Can be fixed to a single value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntVar {
    /// Variable name (for diagnostics; uniqueness is not enforced).
    pub name: String,
    /// Minimum value.
    pub min: i64,
    /// Maximum value.
    pub max: i64,
}

impl IntVar {
    /// Creates a new integer variable with the given bounds.
    pub fn new(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    /// Creates a fixed integer variable.
    pub fn fixed(name: impl Into<String>, value: i64) -> Self {
        Self::new(name, value, value)
    }

    /// Whether this variable is fixed to a single value.
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Domain size (max - min + 1), zero for an empty domain.
    pub fn domain_size(&self) -> i64 {
        (self.max - self.min + 1).max(0)
    }
}

/// An interval variable representing an activity with start, end, and duration.
///
/// The invariant `end = start + duration` is maintained by the solver.
/// Start and end are ordinary integer variables of the same model, so
/// they can appear in linear and max-equality constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalVar {
    /// Variable name.
    pub name: String,
    /// Start time variable.
    pub start: VarId,
    /// Fixed duration.
    pub duration: i64,
    /// End time variable.
    pub end: VarId,
}

impl IntervalVar {
    /// Creates an interval linking `start`, a fixed `duration` and `end`.
    pub fn new(name: impl Into<String>, start: VarId, duration: i64, end: VarId) -> Self {
        Self {
            name: name.into(),
            start,
            duration,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_var() {
        let v = IntVar::new("x", 0, 10);
        assert_eq!(v.domain_size(), 11);
        assert!(!v.is_fixed());

        let f = IntVar::fixed("y", 5);
        assert!(f.is_fixed());
        assert_eq!(f.domain_size(), 1);
    }

    #[test]
    fn test_empty_domain_size() {
        let v = IntVar::new("broken", 5, 3);
        assert_eq!(v.domain_size(), 0);
    }

    #[test]
    fn test_interval_var() {
        let iv = IntervalVar::new("op1", VarId(0), 50, VarId(1));
        assert_eq!(iv.name, "op1");
        assert_eq!(iv.start.index(), 0);
        assert_eq!(iv.end.index(), 1);
        assert_eq!(iv.duration, 50);
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(VarId(3).to_string(), "v3");
        assert_eq!(IntervalId(7).to_string(), "i7");
    }
}
