//! CLI subcommand implementations.

pub mod geometry;
pub mod query;
pub mod rows;
pub mod summary;
pub mod util;
