//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pv_core::Step;

/// Perf trace viewer.
///
/// Loads a task log, normalizes it per process and answers selection queries
/// against the resulting timeline.
#[derive(Debug, Parser)]
#[command(name = "pv", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// The log to load and the output format.
#[derive(Debug, Args)]
pub struct LogArgs {
    /// Trace log to load.
    pub log: PathBuf,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print per-name totals and overall statistics.
    Summary {
        #[command(flatten)]
        log: LogArgs,
    },

    /// List visual rows and the thread each one shows.
    Rows {
        #[command(flatten)]
        log: LogArgs,
    },

    /// Describe the generated vertex and index buffers.
    Geometry {
        #[command(flatten)]
        log: LogArgs,

        /// Write the combined little-endian buffer to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Find the task nearest to a time on a row.
    Find {
        #[command(flatten)]
        log: LogArgs,

        /// Row index.
        #[arg(long, conflicts_with = "y", required_unless_present = "y")]
        row: Option<usize>,

        /// Vertical coordinate; the nearest row is used.
        #[arg(long, allow_negative_numbers = true)]
        y: Option<f32>,

        /// Time in milliseconds since the start of the process.
        #[arg(long, allow_negative_numbers = true)]
        time: f64,
    },

    /// Describe the task at a (process, thread, position) address.
    Select {
        #[command(flatten)]
        log: LogArgs,

        #[arg(long)]
        process: usize,

        #[arg(long)]
        thread: usize,

        #[arg(long)]
        position: usize,
    },

    /// Start at the nearest task and replay keyboard steps.
    Step {
        #[command(flatten)]
        log: LogArgs,

        #[arg(long)]
        row: usize,

        /// Time in milliseconds since the start of the process.
        #[arg(long, allow_negative_numbers = true)]
        time: f64,

        /// Steps to apply in order.
        #[arg(value_enum)]
        steps: Vec<Direction>,
    },
}

/// Keyboard step direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl From<Direction> for Step {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Up,
            Direction::Down => Self::Down,
            Direction::Left => Self::Left,
            Direction::Right => Self::Right,
        }
    }
}
