//! Per-process time normalization and aggregate statistics.

use serde::Serialize;

use crate::hierarchy::{Hierarchy, Task};
use crate::ingest::NameTable;

/// Shifts every process so that its earliest task starts at 0.
///
/// Processes are normalized independently. Returns the subtracted base of each
/// process, indexed by dense process id.
pub fn normalize_times(hierarchy: &mut Hierarchy) -> Vec<u64> {
    let bases: Vec<u64> = hierarchy
        .processes()
        .iter()
        .map(|process| {
            process
                .threads()
                .iter()
                .filter_map(|thread| thread.tasks().first())
                .filter_map(|&slot| hierarchy.task(slot))
                .map(|task| task.start)
                .min()
                .unwrap_or(0)
        })
        .collect();

    for task in hierarchy.tasks_mut() {
        task.start -= bases[task.process];
    }

    tracing::debug!(processes = bases.len(), "normalized");
    bases
}

/// Totals for one task name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameStats {
    pub name_id: usize,
    pub name: String,
    /// Number of tasks with this name.
    pub count: u64,
    /// Summed task length, raw units.
    pub total: u64,
}

/// Aggregate statistics over a normalized trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub task_count: usize,
    /// Latest normalized task end.
    pub end_time: u64,
    /// Sum of all task lengths.
    pub busy_time: u64,
    /// `busy_time / end_time`, or 0 for a zero-length trace.
    pub parallelism: f64,
    /// One entry per defined name, ascending by total time. Ties keep name-table order.
    pub names: Vec<NameStats>,
}

impl Summary {
    /// Accumulates statistics over `tasks`, which must already be normalized.
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(tasks: &[Task], names: &NameTable) -> Self {
        let mut stats: Vec<NameStats> = names
            .iter()
            .enumerate()
            .map(|(name_id, name)| NameStats {
                name_id,
                name: name.to_string(),
                count: 0,
                total: 0,
            })
            .collect();

        let mut end_time = 0u64;
        let mut busy_time = 0u64;
        for task in tasks {
            if let Some(entry) = stats.get_mut(task.name_id) {
                entry.count += 1;
                entry.total = entry.total.saturating_add(task.length);
            }
            end_time = end_time.max(task.end());
            busy_time = busy_time.saturating_add(task.length);
        }

        stats.sort_by_key(|s| s.total);

        let parallelism = if end_time == 0 {
            0.0
        } else {
            busy_time as f64 / end_time as f64
        };

        tracing::debug!(names = stats.len(), "binned");
        Self {
            task_count: tasks.len(),
            end_time,
            busy_time,
            parallelism,
            names: stats,
        }
    }

    /// Looks up the entry for a name.
    pub fn by_name(&self, name: &str) -> Option<&NameStats> {
        self.names.iter().find(|s| s.name == name)
    }
}
