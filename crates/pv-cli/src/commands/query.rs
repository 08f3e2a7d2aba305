//! Find, select and step commands.

use std::io::Write;

use anyhow::{Context, Result, bail};
use pv_core::{Hit, QueryError, Step, TaskSummary, TraceIndex};
use serde::Serialize;

use crate::commands::util::write_json;

/// Where a find starts: an explicit row or a vertical coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowTarget {
    Row(usize),
    Y(f32),
}

#[derive(Debug, Serialize)]
struct Selection {
    row: usize,
    position: usize,
    #[serde(flatten)]
    task: TaskSummary,
}

fn describe(index: &TraceIndex, hit: Hit) -> Result<Selection> {
    let task = index.select(hit.process, hit.thread, hit.position)?;
    Ok(Selection {
        row: hit.row,
        position: hit.position,
        task,
    })
}

fn emit<W: Write>(writer: &mut W, selection: &Selection, json: bool) -> Result<()> {
    if json {
        write_json(writer, selection)
    } else {
        writeln!(
            writer,
            "row={} position={} {}",
            selection.row, selection.position, selection.task
        )?;
        Ok(())
    }
}

fn resolve_row(index: &TraceIndex, target: RowTarget) -> Result<usize> {
    match target {
        RowTarget::Row(row) => Ok(row),
        RowTarget::Y(y) => index
            .row_at(y)
            .with_context(|| format!("no row near y={y}")),
    }
}

/// Runs the find command.
pub fn find<W: Write>(
    writer: &mut W,
    index: &TraceIndex,
    target: RowTarget,
    time: f64,
    json: bool,
) -> Result<()> {
    let row = resolve_row(index, target)?;
    let hit = index.find_nearest(row, time)?;
    tracing::debug!(?hit, time, "found nearest task");
    emit(writer, &describe(index, hit)?, json)
}

/// Runs the select command.
pub fn select<W: Write>(
    writer: &mut W,
    index: &TraceIndex,
    process: usize,
    thread: usize,
    position: usize,
    json: bool,
) -> Result<()> {
    let Some(row) = index.rows().position(process, thread) else {
        bail!("no row shows process {process} thread {thread}");
    };
    let hit = Hit {
        row,
        process,
        thread,
        position,
    };
    emit(writer, &describe(index, hit)?, json)
}

/// Applies `steps` in order starting from the nearest task.
///
/// Steps that would leave the first or last row or task keep the selection.
pub fn replay(index: &TraceIndex, row: usize, time: f64, steps: &[Step]) -> Result<Hit> {
    let mut hit = index.find_nearest(row, time)?;
    for &step in steps {
        match index.step(hit, step) {
            Ok(next) => hit = next,
            Err(QueryError::NoStep { step }) => {
                tracing::debug!(%step, ?hit, "step ignored at boundary");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(hit)
}

/// Runs the step command.
pub fn step<W: Write>(
    writer: &mut W,
    index: &TraceIndex,
    row: usize,
    time: f64,
    steps: &[Step],
    json: bool,
) -> Result<()> {
    let hit = replay(index, row, time, steps)?;
    emit(writer, &describe(index, hit)?, json)
}
