//! Geometry command: buffer layout, bounds and the raw combined buffer.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use pv_core::{Bounds, BufferLayout, Geometry};
use serde::Serialize;

use crate::commands::util::write_json;

#[derive(Debug, Serialize)]
struct GeometryReport {
    layout: BufferLayout,
    bounds: Option<Bounds>,
}

/// Formats the buffer layout and vertex bounds.
pub fn format_geometry(geometry: &Geometry) -> String {
    let mut output = String::new();
    let layout = geometry.buffer_layout();

    writeln!(
        output,
        "vertices:  {} x {} bytes",
        layout.vertex_count, layout.vertex_stride
    )
    .unwrap();
    writeln!(
        output,
        "lines:     {} indices at offset {}",
        layout.line_index_count, layout.line_index_offset
    )
    .unwrap();
    writeln!(
        output,
        "triangles: {} indices at offset {}",
        layout.triangle_index_count, layout.triangle_index_offset
    )
    .unwrap();
    writeln!(output, "total:     {} bytes", layout.total_bytes).unwrap();

    match geometry.bounds() {
        Some(b) => writeln!(
            output,
            "bounds:    x {:.3}..{:.3} y {:.3}..{:.3}",
            b.min_x, b.max_x, b.min_y, b.max_y
        )
        .unwrap(),
        None => writeln!(output, "bounds:    (none)").unwrap(),
    }

    output
}

/// Runs the geometry command, optionally writing the combined buffer to `out`.
pub fn run<W: Write>(
    writer: &mut W,
    geometry: &Geometry,
    out: Option<&Path>,
    json: bool,
) -> Result<()> {
    if let Some(path) = out {
        let bytes = geometry.to_bytes();
        std::fs::write(path, &bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote geometry buffer");
    }

    if json {
        let report = GeometryReport {
            layout: geometry.buffer_layout(),
            bounds: geometry.bounds(),
        };
        write_json(writer, &report)
    } else {
        write!(writer, "{}", format_geometry(geometry))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pv_core::{Layout, TraceIndex};

    fn geometry(log: &str) -> Geometry {
        TraceIndex::load(log.as_bytes(), &Layout::default())
            .unwrap()
            .geometry
    }

    #[test]
    fn test_format_geometry() {
        let geo = geometry(".1 a\n0 0 1000 1\n0 2000 2000 1\n1 0 500 1\n");
        assert_snapshot!(format_geometry(&geo), @r"
        vertices:  9 x 20 bytes
        lines:     18 indices at offset 180
        triangles: 9 indices at offset 252
        total:     288 bytes
        bounds:    x 0.000..4.000 y 0.100..1.900
        ");
    }

    #[test]
    fn test_run_writes_buffer() {
        let geo = geometry(".1 a\n0 0 1000 1\n");
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("buffer.bin");

        let mut out = Vec::new();
        run(&mut out, &geo, Some(&path), true).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 3 * 20 + 6 * 4 + 3 * 4);
        assert_eq!(bytes, geo.to_bytes());

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["layout"]["total_bytes"], 96);
        assert_eq!(value["bounds"]["max_x"], 1.0);
    }
}
