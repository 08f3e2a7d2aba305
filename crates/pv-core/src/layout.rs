//! Visual row layout.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::hierarchy::Hierarchy;

/// Vertical layout constants, in display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Distance between consecutive row centers.
    pub row_height: f32,
    /// Height of a task triangle.
    pub bar_height: f32,
    /// Extra space inserted after each process.
    pub process_gap: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            row_height: 1.0,
            bar_height: 0.8,
            process_gap: 2.5,
        }
    }
}

impl Layout {
    /// Rejects non-finite or non-positive heights and negative gaps.
    pub fn validate(&self) -> Result<(), LayoutError> {
        for (field, value) in [
            ("row_height", self.row_height),
            ("bar_height", self.bar_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::NotPositive { field, value });
            }
        }
        if !self.process_gap.is_finite() || self.process_gap < 0.0 {
            return Err(LayoutError::NegativeGap {
                value: self.process_gap,
            });
        }
        Ok(())
    }
}

/// One visual row: a thread lane and its vertical center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Row {
    pub y: f32,
    pub process: usize,
    pub thread: usize,
}

/// Rows in hierarchy traversal order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RowMap {
    rows: Vec<Row>,
}

impl RowMap {
    /// Lays out one row per thread.
    ///
    /// Row `i` is centered at `gap + i * row_height + 0.5`, where `gap` grows by
    /// `process_gap` after every process.
    #[allow(clippy::cast_precision_loss)]
    pub fn build(hierarchy: &Hierarchy, layout: &Layout) -> Self {
        let mut rows = Vec::with_capacity(hierarchy.thread_count());
        let mut extra = 0.0f32;
        for (process, entry) in hierarchy.processes().iter().enumerate() {
            for thread in 0..entry.threads().len() {
                let y = (rows.len() as f32).mul_add(layout.row_height, extra) + 0.5;
                rows.push(Row { y, process, thread });
            }
            extra += layout.process_gap;
        }
        Self { rows }
    }

    pub fn get(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Index of the row whose center is closest to `y`. The first row wins ties.
    pub fn nearest(&self, y: f32) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, row) in self.rows.iter().enumerate() {
            let distance = (row.y - y).abs();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Row index of a `(process, thread)` pair.
    pub fn position(&self, process: usize, thread: usize) -> Option<usize> {
        self.rows
            .iter()
            .position(|r| r.process == process && r.thread == thread)
    }
}
