//! The loaded, immutable trace index and the load pipeline.
//!
//! Loading runs lexing, ingestion, hierarchy normalization, time normalization,
//! aggregation and geometry generation once, in that order. It either returns
//! a complete [`LoadedTrace`] or an error; nothing partial escapes.

use std::path::Path;

use crate::error::{LoadError, QueryError};
use crate::geometry::Geometry;
use crate::hierarchy::{Hierarchy, Task, Thread};
use crate::ingest::{Ingested, NameTable, ingest};
use crate::layout::{Layout, RowMap};
use crate::stats::{Summary, normalize_times};

/// Everything produced by a load: the query index and the render geometry.
#[derive(Debug, Clone)]
pub struct LoadedTrace {
    pub index: TraceIndex,
    pub geometry: Geometry,
}

/// Normalized hierarchy, name table, row map and statistics of one log.
///
/// Read-only after construction, so shared references can be queried from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct TraceIndex {
    hierarchy: Hierarchy,
    names: NameTable,
    rows: RowMap,
    summary: Summary,
    process_bases: Vec<u64>,
}

impl TraceIndex {
    /// Parses and indexes a complete log buffer.
    pub fn load(bytes: &[u8], layout: &Layout) -> Result<LoadedTrace, LoadError> {
        layout.validate()?;
        let ingested = ingest(bytes)?;
        Self::from_ingested(ingested, layout)
    }

    /// Reads `path` fully and indexes it.
    pub fn load_file(path: &Path, layout: &Layout) -> Result<LoadedTrace, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "read log");
        Self::load(&bytes, layout)
    }

    /// Runs the pipeline from already-ingested tasks.
    pub fn from_ingested(ingested: Ingested, layout: &Layout) -> Result<LoadedTrace, LoadError> {
        layout.validate()?;
        if ingested.tasks.is_empty() {
            return Err(LoadError::Empty);
        }
        let Ingested { tasks, names } = ingested;

        let mut hierarchy = Hierarchy::build(tasks);
        let process_bases = normalize_times(&mut hierarchy);
        let summary = Summary::compute(hierarchy.tasks(), &names);
        let rows = RowMap::build(&hierarchy, layout);
        let geometry = Geometry::generate(&mut hierarchy, &rows, layout)?;

        tracing::info!(
            tasks = hierarchy.tasks().len(),
            names = names.len(),
            processes = hierarchy.process_count(),
            rows = rows.len(),
            "trace loaded"
        );

        Ok(LoadedTrace {
            index: Self {
                hierarchy,
                names,
                rows,
                summary,
                process_bases,
            },
            geometry,
        })
    }

    pub const fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub const fn names(&self) -> &NameTable {
        &self.names
    }

    pub const fn rows(&self) -> &RowMap {
        &self.rows
    }

    pub const fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Raw start time that was subtracted from every task of `process`.
    pub fn process_base(&self, process: usize) -> Option<u64> {
        self.process_bases.get(process).copied()
    }

    /// Number of visual rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of tasks in `row`.
    pub fn row_len(&self, row: usize) -> Result<usize, QueryError> {
        let entry = self.rows.get(row).ok_or(QueryError::RowOutOfRange {
            row,
            rows: self.rows.len(),
        })?;
        Ok(self.thread(entry.process, entry.thread)?.len())
    }

    /// Name of a task, or the empty string for an id outside the table.
    pub fn task_name(&self, task: &Task) -> &str {
        self.names.get(task.name_id).unwrap_or_default()
    }

    pub(crate) fn thread(&self, process: usize, thread: usize) -> Result<&Thread, QueryError> {
        let processes = self.hierarchy.processes();
        let entry = processes
            .get(process)
            .ok_or(QueryError::ProcessOutOfRange {
                process,
                processes: processes.len(),
            })?;
        entry
            .threads()
            .get(thread)
            .ok_or(QueryError::ThreadOutOfRange {
                process,
                thread,
                threads: entry.threads().len(),
            })
    }

    /// Task at `position` in the `(process, thread)` row.
    pub fn task_at(&self, process: usize, thread: usize, position: usize) -> Result<&Task, QueryError> {
        let bucket = self.thread(process, thread)?;
        bucket
            .tasks()
            .get(position)
            .and_then(|&slot| self.hierarchy.task(slot))
            .ok_or(QueryError::TaskOutOfRange {
                process,
                thread,
                position,
                len: bucket.len(),
            })
    }
}
