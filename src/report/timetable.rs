//! Plain-text machine timetable.
//!
//! Two lines per machine: task names, then their `[start,end]` intervals,
//! each in a fixed-width column so the lines align.
//!
//! ```text
//! Machine 0: job_0_task_0   job_1_task_0
//!            [0,3]          [3,5]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::models::MachineSchedule;

/// Renders a [`MachineSchedule`] as aligned text.
///
/// Pure: the same schedule always yields the same text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableFormatter {
    /// Minimum width of each column; longer cells are not truncated.
    pub column_width: usize,
}

impl Default for TimetableFormatter {
    fn default() -> Self {
        Self { column_width: 15 }
    }
}

impl TimetableFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the column width.
    pub fn with_column_width(mut self, width: usize) -> Self {
        self.column_width = width;
        self
    }

    /// Formats every machine bucket in machine order.
    ///
    /// Buckets are printed in their stored order; extraction leaves them
    /// sorted by `(start, job_id, task_id)`.
    pub fn format(&self, schedule: &MachineSchedule) -> String {
        let width = self.column_width;
        let mut output = String::new();

        for (machine, tasks) in schedule.iter() {
            let prefix = format!("Machine {machine}: ");
            let mut names = prefix.clone();
            let mut spans = " ".repeat(prefix.len());

            for task in tasks {
                let name = task.coord().to_string();
                let span = format!("[{},{}]", task.start, task.end());
                let _ = write!(names, "{name:<width$}");
                let _ = write!(spans, "{span:<width$}");
            }

            output.push_str(&names);
            output.push('\n');
            output.push_str(&spans);
            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssignedTask;

    fn sample() -> MachineSchedule {
        let mut s = MachineSchedule::new(2);
        s.push(0, AssignedTask::new(0, 0, 0, 3)).unwrap();
        s.push(0, AssignedTask::new(3, 1, 0, 2)).unwrap();
        s.push(1, AssignedTask::new(3, 0, 1, 2)).unwrap();
        s
    }

    #[test]
    fn test_format_layout() {
        let text = TimetableFormatter::default().format(&sample());
        let expected = concat!(
            "Machine 0: job_0_task_0   job_1_task_0   \n",
            "           [0,3]          [3,5]          \n",
            "Machine 1: job_0_task_1   \n",
            "           [3,5]          \n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_empty_machine_still_printed() {
        let text = TimetableFormatter::default().format(&MachineSchedule::new(1));
        assert_eq!(text, "Machine 0: \n           \n");
    }

    #[test]
    fn test_indent_follows_prefix() {
        let mut s = MachineSchedule::new(11);
        s.push(10, AssignedTask::new(0, 0, 0, 1)).unwrap();
        let text = TimetableFormatter::default().format(&s);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[20], "Machine 10: job_0_task_0   ");
        assert_eq!(lines[21], "            [0,1]          ");
    }

    #[test]
    fn test_long_cells_not_truncated() {
        let mut s = MachineSchedule::new(1);
        s.push(0, AssignedTask::new(100, 12, 34, 5)).unwrap();
        let text = TimetableFormatter::new().with_column_width(4).format(&s);
        assert_eq!(text, "Machine 0: job_12_task_34\n           [100,105]\n");
    }
}
