//! Shared utilities for CLI commands.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use pv_core::{LoadedTrace, TraceIndex};
use serde::Serialize;

use crate::Config;

/// Loads and indexes a log with the configured layout.
pub fn load_trace(path: &Path, config: &Config) -> Result<LoadedTrace> {
    TraceIndex::load_file(path, &config.layout())
        .with_context(|| format!("failed to load {}", path.display()))
}

/// Writes `value` as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}
