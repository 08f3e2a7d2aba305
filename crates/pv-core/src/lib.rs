//! Trace ingestion, normalization and interval queries.
//!
//! This crate turns a flat task log into an immutable [`TraceIndex`]:
//! - Lexing and ingestion: names and tasks from the line grammar
//! - Normalization: dense process/thread ids and per-process zero-based time
//! - Aggregation: per-name counts and totals
//! - Geometry: one colored triangle per task for the timeline view
//! - Queries: nearest task to a time on a row, selection and stepping

pub mod error;
pub mod format;
pub mod geometry;
pub mod hierarchy;
pub mod index;
pub mod ingest;
pub mod layout;
pub mod lexer;
mod query;
pub mod stats;

pub use error::{Field, LayoutError, LoadError, ParseError, ParseErrorKind, QueryError};
pub use format::{Fixed, format_fixed, parse_fixed};
pub use geometry::{Bounds, BufferLayout, Geometry, PALETTE, Vertex};
pub use hierarchy::{Hierarchy, Task};
pub use index::{LoadedTrace, TraceIndex};
pub use ingest::{Ingested, Ingestor, NameTable, RawTask};
pub use layout::{Layout, Row, RowMap};
pub use query::{Hit, Step, TaskSummary};
pub use stats::{NameStats, Summary};
