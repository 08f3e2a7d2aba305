//! Rows command: the visual row map.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use pv_core::TraceIndex;
use serde::Serialize;

use crate::commands::util::write_json;

#[derive(Debug, Serialize)]
struct JsonRow {
    row: usize,
    y: f32,
    process: usize,
    thread: usize,
    tasks: usize,
}

fn json_rows(index: &TraceIndex) -> Vec<JsonRow> {
    index
        .rows()
        .iter()
        .enumerate()
        .map(|(row, entry)| JsonRow {
            row,
            y: entry.y,
            process: entry.process,
            thread: entry.thread,
            tasks: index.row_len(row).unwrap_or(0),
        })
        .collect()
}

/// Formats one line per row: index, center, process, thread and task count.
pub fn format_rows(index: &TraceIndex) -> String {
    let mut output = String::new();
    writeln!(
        output,
        "{:>5} {:>8} {:>7} {:>6} {:>7}",
        "row", "y", "process", "thread", "tasks"
    )
    .unwrap();
    for row in json_rows(index) {
        writeln!(
            output,
            "{:>5} {:>8.2} {:>7} {:>6} {:>7}",
            row.row, row.y, row.process, row.thread, row.tasks
        )
        .unwrap();
    }
    output
}

/// Runs the rows command.
pub fn run<W: Write>(writer: &mut W, index: &TraceIndex, json: bool) -> Result<()> {
    if json {
        write_json(writer, &json_rows(index))
    } else {
        write!(writer, "{}", format_rows(index))?;
        Ok(())
    }
}
