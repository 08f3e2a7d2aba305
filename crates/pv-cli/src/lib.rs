//! Perf viewer CLI library.
//!
//! This crate provides the command-line interface over `pv-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, Direction, LogArgs};
pub use config::Config;
