//! Logging sinks for the solve pipeline.
//!
//! The pipeline reports progress through [`SolveLogger`] so the library
//! never configures a global logger. [`LogFacade`] forwards to the `log`
//! crate; binaries decide where that goes.

use std::cell::RefCell;
use std::rc::Rc;

use log::Level;

/// Log target used by [`LogFacade`].
pub const LOG_TARGET: &str = "jsp";

/// Sink for pipeline messages.
///
/// ```
/// use u_jobshop::cp::JobShopSolver;
/// use u_jobshop::logging::{LogFacade, NoopLogger};
/// use u_jobshop::samples::single_job;
///
/// let quiet = JobShopSolver::new().with_logger(NoopLogger).run(&single_job());
/// let logged = JobShopSolver::new().with_logger(LogFacade).run(&single_job());
/// assert_eq!(quiet.makespan, logged.makespan);
/// ```
pub trait SolveLogger {
    /// Progress message.
    fn info(&self, message: &str);
    /// Something the caller should notice (no solution, for example).
    fn warning(&self, message: &str);
}

impl<L: SolveLogger + ?Sized> SolveLogger for &L {
    fn info(&self, message: &str) {
        (**self).info(message);
    }

    fn warning(&self, message: &str) {
        (**self).warning(message);
    }
}

impl<L: SolveLogger + ?Sized> SolveLogger for Box<L> {
    fn info(&self, message: &str) {
        (**self).info(message);
    }

    fn warning(&self, message: &str) {
        (**self).warning(message);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl SolveLogger for NoopLogger {
    fn info(&self, _message: &str) {}

    fn warning(&self, _message: &str) {}
}

/// Forwards to the `log` facade under target [`LOG_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;

impl SolveLogger for LogFacade {
    fn info(&self, message: &str) {
        log::info!(target: LOG_TARGET, "{message}");
    }

    fn warning(&self, message: &str) {
        log::warn!(target: LOG_TARGET, "{message}");
    }
}

/// Records messages in memory.
///
/// Clones share the same record list, so a clone can be handed to a
/// pipeline and inspected afterwards.
///
/// ```
/// use u_jobshop::logging::{MemoryLogger, SolveLogger};
///
/// let logger = MemoryLogger::new();
/// let sink = logger.clone();
/// sink.warning("No solution found.");
/// assert_eq!(logger.messages(), vec!["No solution found.".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    records: Rc<RefCell<Vec<(Level, String)>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in arrival order.
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.borrow().clone()
    }

    /// Message texts in arrival order.
    pub fn messages(&self) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Whether any record at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records
            .borrow()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl SolveLogger for MemoryLogger {
    fn info(&self, message: &str) {
        self.records
            .borrow_mut()
            .push((Level::Info, message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.records
            .borrow_mut()
            .push((Level::Warn, message.to_string()));
    }
}
