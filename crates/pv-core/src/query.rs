//! Read-only queries over a loaded [`TraceIndex`].

use std::fmt;

use serde::Serialize;

use crate::error::QueryError;
use crate::format::Fixed;
use crate::hierarchy::{Task, Thread};
use crate::index::TraceIndex;

/// A located task: its row and its `(process, thread, position)` address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hit {
    pub row: usize,
    pub process: usize,
    pub thread: usize,
    pub position: usize,
}

/// Description of a selected task, for highlighting and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub process: usize,
    pub thread: usize,
    pub start: Fixed,
    pub length: Fixed,
    pub name: String,
    pub vertex_index: u32,
}

impl fmt::Display for TaskSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) [ {}, {} ] name=[{}]",
            self.process, self.thread, self.start, self.length, self.name
        )
    }
}

/// A keyboard-driven selection move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Previous row, nearest task to the current selection's midpoint.
    Up,
    /// Next row, nearest task to the current selection's midpoint.
    Down,
    /// Previous task in the same row.
    Left,
    /// Next task in the same row.
    Right,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// Distance in display units from `time` to the task interval; 0 inside it.
fn gap(task: &Task, time: f64) -> f64 {
    let (start, end) = (task.display_start(), task.display_end());
    if time < start {
        start - time
    } else if time > end {
        time - end
    } else {
        0.0
    }
}

impl TraceIndex {
    fn resolve(&self, thread: &Thread, position: usize) -> &Task {
        &self.hierarchy().tasks()[thread.tasks()[position]]
    }

    /// Finds the task in `row` whose interval is nearest to `time` (display units).
    ///
    /// A binary search narrows to a candidate, then the neighbours on either side
    /// replace it when they are strictly closer.
    pub fn find_nearest(&self, row: usize, time: f64) -> Result<Hit, QueryError> {
        let entry = self.rows().get(row).ok_or(QueryError::RowOutOfRange {
            row,
            rows: self.row_count(),
        })?;
        let thread = self.thread(entry.process, entry.thread)?;
        let len = thread.len();
        if len == 0 {
            return Err(QueryError::TaskOutOfRange {
                process: entry.process,
                thread: entry.thread,
                position: 0,
                len,
            });
        }

        let mut a = 0usize;
        let mut b = len - 1;
        let mut pos = (a + b) / 2;
        while a <= b {
            pos = (a + b) / 2;
            let task = self.resolve(thread, pos);
            if task.display_start() > time {
                if pos == 0 {
                    break;
                }
                b = pos - 1;
                continue;
            }
            if task.display_end() < time {
                a = pos + 1;
                continue;
            }
            break;
        }

        let here = gap(self.resolve(thread, pos), time);
        let before = pos
            .checked_sub(1)
            .map(|p| (p, gap(self.resolve(thread, p), time)));
        let after = (pos + 1 < len).then(|| (pos + 1, gap(self.resolve(thread, pos + 1), time)));

        let position = match (before, after) {
            (Some((p, d)), Some((_, e))) if d < here && d <= e => p,
            (Some((p, d)), None) if d < here => p,
            (_, Some((n, e))) if e < here => n,
            _ => pos,
        };

        Ok(Hit {
            row,
            process: entry.process,
            thread: entry.thread,
            position,
        })
    }

    /// Describes the task at `position` of the `(process, thread)` row.
    pub fn select(
        &self,
        process: usize,
        thread: usize,
        position: usize,
    ) -> Result<TaskSummary, QueryError> {
        let task = self.task_at(process, thread, position)?;
        Ok(TaskSummary {
            process,
            thread,
            start: Fixed(task.start),
            length: Fixed(task.length),
            name: self.task_name(task).to_string(),
            vertex_index: task.vertex_index,
        })
    }

    /// Row nearest to a vertical coordinate.
    pub fn row_at(&self, y: f32) -> Option<usize> {
        self.rows().nearest(y)
    }

    /// Moves a selection one step.
    ///
    /// Vertical steps keep the time position by searching the new row at the
    /// midpoint of the currently selected task. Steps past the first or last
    /// row or task fail with [`QueryError::NoStep`].
    pub fn step(&self, from: Hit, step: Step) -> Result<Hit, QueryError> {
        let current = self.task_at(from.process, from.thread, from.position)?;
        let no_step = QueryError::NoStep { step };
        match step {
            Step::Up | Step::Down => {
                let row = if step == Step::Up {
                    from.row.checked_sub(1).ok_or(no_step)?
                } else {
                    Some(from.row + 1)
                        .filter(|&r| r < self.row_count())
                        .ok_or(no_step)?
                };
                let middle = (current.display_start() + current.display_end()) / 2.0;
                self.find_nearest(row, middle)
            }
            Step::Left => {
                let position = from.position.checked_sub(1).ok_or(no_step)?;
                Ok(Hit { position, ..from })
            }
            Step::Right => {
                let len = self.thread(from.process, from.thread)?.len();
                let position = Some(from.position + 1)
                    .filter(|&p| p < len)
                    .ok_or(no_step)?;
                Ok(Hit { position, ..from })
            }
        }
    }
}
