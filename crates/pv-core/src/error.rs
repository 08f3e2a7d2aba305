//! Error types for ingestion, layout validation and queries.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A numeric field of the log grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The hexadecimal id of a name definition line.
    NameId,
    /// The decimal thread id of a task line.
    Thread,
    /// The decimal start time of a task line.
    Start,
    /// The decimal duration of a task line.
    Length,
    /// The hexadecimal name reference of a task line.
    NameKey,
}

impl Field {
    /// Human-readable field name used in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NameId => "name id",
            Self::Thread => "thread id",
            Self::Start => "start time",
            Self::Length => "length",
            Self::NameKey => "name key",
        }
    }

    /// The radix the field is written in.
    #[must_use]
    pub const fn radix(&self) -> u32 {
        match self {
            Self::NameId | Self::NameKey => 16,
            Self::Thread | Self::Start | Self::Length => 10,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What went wrong while parsing a line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A name definition id was not followed by a single space.
    #[error("name definition id must be followed by a space")]
    MissingNameSeparator,

    /// A numeric field had no digits in its radix.
    #[error("expected a base-{} {field}", field.radix())]
    InvalidNumber { field: Field },

    /// A numeric field does not fit in 64 bits.
    #[error("{field} does not fit in 64 bits")]
    NumberOverflow { field: Field },

    /// Extra bytes followed the last field of a task line.
    #[error("unexpected byte {byte:#04x} after the last task field")]
    TrailingBytes { byte: u8 },

    /// A task referenced a name key that was never defined.
    #[error("undefined name key {key:x}")]
    UndefinedName { key: u64 },
}

/// A fatal parse failure, located by byte offset into the log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("parse error at byte offset {offset}: {kind}")]
pub struct ParseError {
    pub offset: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) const fn new(offset: usize, kind: ParseErrorKind) -> Self {
        Self { offset, kind }
    }
}

/// Errors that abort loading a log. No partial index survives any of them.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The log file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log parsed cleanly but contained no task lines.
    #[error("empty log: no tasks parsed")]
    Empty,

    /// Parsing failed before a single task was ingested.
    #[error("empty or malformed log ({0})")]
    Malformed(ParseError),

    /// Parsing failed after at least one task was ingested.
    #[error(transparent)]
    Parse(ParseError),

    /// The layout constants are unusable.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// More vertices than a 32-bit index buffer can address.
    #[error("{tasks} tasks exceed the 32-bit vertex index range")]
    TooManyTasks { tasks: usize },
}

/// Invalid layout constants.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    /// A height was zero, negative, or not finite.
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    /// The process gap was negative or not finite.
    #[error("process_gap must be a non-negative finite number, got {value}")]
    NegativeGap { value: f32 },
}

/// Recoverable query failures. Callers are expected to treat these as no-ops.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    /// The row index is past the last row.
    #[error("no such row {row} (trace has {rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    /// The process index is past the last process.
    #[error("no such process {process} (trace has {processes} processes)")]
    ProcessOutOfRange { process: usize, processes: usize },

    /// The thread index is past the last thread of the process.
    #[error("no such thread {thread} in process {process} ({threads} threads)")]
    ThreadOutOfRange {
        process: usize,
        thread: usize,
        threads: usize,
    },

    /// The task position is past the end of its row.
    #[error("no task at position {position} in ({process}, {thread}) ({len} tasks)")]
    TaskOutOfRange {
        process: usize,
        thread: usize,
        position: usize,
        len: usize,
    },

    /// A keyboard step would move past the first or last row or task.
    #[error("cannot step {step} from the current selection")]
    NoStep { step: crate::query::Step },
}
