//! Triangle geometry for the timeline view.
//!
//! Each task becomes one triangle pointing right: two vertices at its start,
//! above and below the row center, and one at its end on the center line.
//! The same three vertices are indexed twice, once as an outline (three edges)
//! and once as a filled triangle.
//!
//! The combined upload buffer is laid out as vertices, then outline indices,
//! then triangle indices, all little-endian.

use serde::Serialize;

use crate::error::LoadError;
use crate::hierarchy::Hierarchy;
use crate::layout::{Layout, RowMap};

/// RGB triple with components in `0.0..=1.0`.
pub type Color = [f32; 3];

/// Task colors, indexed by `name_id % PALETTE.len()`.
pub const PALETTE: [Color; 17] = [
    [0.5, 0.0, 0.0],
    [0.0, 0.5, 0.0],
    [0.0, 0.0, 0.5],
    [0.5, 0.5, 0.0],
    [0.5, 0.0, 0.5],
    [0.0, 0.5, 0.5],
    [0.5, 0.5, 0.5],
    [0.0, 0.0, 0.0],
    [0.5, 0.3, 0.0],
    [0.3, 0.5, 0.0],
    [0.0, 0.3, 0.5],
    [0.5, 0.0, 0.3],
    [0.0, 0.5, 0.3],
    [0.3, 0.0, 0.5],
    [0.5, 0.5, 0.3],
    [0.5, 0.3, 0.5],
    [0.3, 0.5, 0.5],
];

/// Color for a name id.
pub const fn palette_color(name_id: usize) -> Color {
    PALETTE[name_id % PALETTE.len()]
}

/// A vertex as uploaded: position then color, five packed `f32`s.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: Color,
}

impl Vertex {
    /// Size of one packed vertex in bytes.
    pub const STRIDE: usize = 5 * size_of::<f32>();

    fn write_le(&self, out: &mut Vec<u8>) {
        for component in self.position.iter().chain(self.color.iter()) {
            out.extend_from_slice(&component.to_le_bytes());
        }
    }
}

/// Axis-aligned bounds of all vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

/// Counts and byte offsets for binding sub-ranges of the combined buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BufferLayout {
    pub vertex_count: usize,
    pub vertex_stride: usize,
    pub line_index_count: usize,
    pub line_index_offset: usize,
    pub triangle_index_count: usize,
    pub triangle_index_offset: usize,
    pub total_bytes: usize,
}

/// Vertex and index data for every task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    /// Outline topology: six indices (three edges) per task.
    pub line_indices: Vec<u32>,
    /// Filled topology: three indices per task.
    pub triangle_indices: Vec<u32>,
}

impl Geometry {
    /// Emits a triangle per task and back-fills each task's `vertex_index`.
    ///
    /// Rows are visited in `rows` order, tasks in start order within each row.
    pub fn generate(
        hierarchy: &mut Hierarchy,
        rows: &RowMap,
        layout: &Layout,
    ) -> Result<Self, LoadError> {
        let task_count = hierarchy.tasks().len();
        if task_count
            .checked_mul(3)
            .is_none_or(|n| u32::try_from(n).is_err())
        {
            return Err(LoadError::TooManyTasks { tasks: task_count });
        }

        let mut geometry = Self {
            vertices: Vec::with_capacity(task_count * 3),
            line_indices: Vec::with_capacity(task_count * 6),
            triangle_indices: Vec::with_capacity(task_count * 3),
        };
        let half = layout.bar_height / 2.0;

        let mut assigned = Vec::with_capacity(task_count);
        for row in rows.iter() {
            let Some(thread) = hierarchy.thread(row.process, row.thread) else {
                continue;
            };
            let y0 = row.y - half;
            let y1 = row.y + half;
            for &slot in thread.tasks() {
                let Some(task) = hierarchy.task(slot) else {
                    continue;
                };
                #[allow(clippy::cast_possible_truncation)]
                let (start, end) = (task.display_start() as f32, task.display_end() as f32);
                let color = palette_color(task.name_id);

                // Bounded by the TooManyTasks check above.
                #[allow(clippy::cast_possible_truncation)]
                let first = geometry.vertices.len() as u32;
                geometry.vertices.extend([
                    Vertex {
                        position: [start, y0],
                        color,
                    },
                    Vertex {
                        position: [end, (y0 + y1) / 2.0],
                        color,
                    },
                    Vertex {
                        position: [start, y1],
                        color,
                    },
                ]);
                geometry.line_indices.extend([
                    first,
                    first + 1,
                    first + 1,
                    first + 2,
                    first + 2,
                    first,
                ]);
                geometry
                    .triangle_indices
                    .extend([first, first + 1, first + 2]);
                assigned.push((slot, first));
            }
        }

        let tasks = hierarchy.tasks_mut();
        for (slot, first) in assigned {
            tasks[slot].vertex_index = first;
        }

        tracing::debug!(vertices = geometry.vertices.len(), "generated geometry");
        Ok(geometry)
    }

    /// Min/max over all vertex positions, or `None` without vertices.
    pub fn bounds(&self) -> Option<Bounds> {
        let (first, rest) = self.vertices.split_first()?;
        let [x, y] = first.position;
        let init = Bounds {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        };
        Some(rest.iter().fold(init, |b, v| {
            let [x, y] = v.position;
            Bounds {
                min_x: b.min_x.min(x),
                min_y: b.min_y.min(y),
                max_x: b.max_x.max(x),
                max_y: b.max_y.max(y),
            }
        }))
    }

    /// Where each section lives in [`Geometry::to_bytes`].
    pub fn buffer_layout(&self) -> BufferLayout {
        let index_size = size_of::<u32>();
        let line_index_offset = self.vertices.len() * Vertex::STRIDE;
        let triangle_index_offset = line_index_offset + self.line_indices.len() * index_size;
        BufferLayout {
            vertex_count: self.vertices.len(),
            vertex_stride: Vertex::STRIDE,
            line_index_count: self.line_indices.len(),
            line_index_offset,
            triangle_index_count: self.triangle_indices.len(),
            triangle_index_offset,
            total_bytes: triangle_index_offset + self.triangle_indices.len() * index_size,
        }
    }

    /// Packs vertices and both index lists into one little-endian buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let layout = self.buffer_layout();
        let mut out = Vec::with_capacity(layout.total_bytes);
        for vertex in &self.vertices {
            vertex.write_le(&mut out);
        }
        for index in self.line_indices.iter().chain(&self.triangle_indices) {
            out.extend_from_slice(&index.to_le_bytes());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::RawTask;

    fn raw(thread: u64, start: u64, length: u64, name_id: usize) -> RawTask {
        RawTask {
            process: 0,
            thread,
            start,
            length,
            name_id,
        }
    }

    fn build(raw: Vec<RawTask>) -> (Hierarchy, Geometry) {
        let mut h = Hierarchy::build(raw);
        let layout = Layout::default();
        let rows = RowMap::build(&h, &layout);
        let geometry = Geometry::generate(&mut h, &rows, &layout).unwrap();
        (h, geometry)
    }

    #[test]
    fn test_palette_wraps_at_seventeen() {
        assert_eq!(palette_color(0), [0.5, 0.0, 0.0]);
        assert_eq!(palette_color(7), [0.0, 0.0, 0.0]);
        assert_eq!(palette_color(16), [0.3, 0.5, 0.5]);
        assert_eq!(palette_color(17), palette_color(0));
        assert_eq!(palette_color(35), palette_color(1));
    }

    #[test]
    fn test_triangle_vertices() {
        let (_, g) = build(vec![raw(0, 2_000, 1_000, 3)]);
        let expected = [[2.0, 0.1], [3.0, 0.5], [2.0, 0.9]];
        for (vertex, [x, y]) in g.vertices.iter().zip(expected) {
            assert!((vertex.position[0] - x).abs() < 1e-6, "{vertex:?}");
            assert!((vertex.position[1] - y).abs() < 1e-6, "{vertex:?}");
        }
        assert!(g.vertices.iter().all(|v| v.color == PALETTE[3]));
        assert_eq!(g.line_indices, vec![0, 1, 1, 2, 2, 0]);
        assert_eq!(g.triangle_indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_vertex_index_back_references() {
        let (h, g) = build(vec![raw(1, 0, 1, 0), raw(0, 5, 1, 1), raw(0, 1, 1, 2)]);
        assert_eq!(g.vertices.len(), 9);
        assert_eq!(g.line_indices.len(), 18);
        assert_eq!(g.triangle_indices.len(), 9);
        let indices: Vec<u32> = h.tasks().iter().map(|t| t.vertex_index).collect();
        assert_eq!(indices, vec![0, 3, 6]);
        for task in h.tasks() {
            let v = g.vertices[task.vertex_index as usize];
            assert_eq!(v.color, palette_color(task.name_id));
        }
    }

    #[test]
    fn test_bounds_cover_all_rows() {
        let (_, g) = build(vec![raw(0, 0, 4_000, 0), raw(1, 1_000, 1_000, 0)]);
        let b = g.bounds().unwrap();
        assert_eq!((b.min_x, b.max_x), (0.0, 4.0));
        assert!((b.min_y - 0.1).abs() < 1e-6);
        assert!((b.max_y - 1.9).abs() < 1e-6);
        assert!(Geometry::default().bounds().is_none());
    }

    #[test]
    fn test_buffer_layout_offsets() {
        let (_, g) = build(vec![raw(0, 0, 1, 0), raw(0, 2, 1, 0)]);
        let layout = g.buffer_layout();
        assert_eq!(
            layout,
            BufferLayout {
                vertex_count: 6,
                vertex_stride: 20,
                line_index_count: 12,
                line_index_offset: 120,
                triangle_index_count: 6,
                triangle_index_offset: 168,
                total_bytes: 192,
            }
        );
        let bytes = g.to_bytes();
        assert_eq!(bytes.len(), layout.total_bytes);
        let at = |offset: usize| u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());
        assert_eq!(at(layout.line_index_offset + 4), 1);
        assert_eq!(at(layout.triangle_index_offset + 12), 3);
        let x = f32::from_le_bytes(bytes[Vertex::STRIDE * 3..Vertex::STRIDE * 3 + 4].try_into().unwrap());
        assert!((x - 0.002).abs() < 1e-9);
    }
}
