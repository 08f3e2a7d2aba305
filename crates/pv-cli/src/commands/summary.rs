//! Summary command: per-name totals and overall statistics.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use pv_core::{Fixed, Summary, TraceIndex};

use crate::Config;
use crate::commands::util::write_json;

/// Column widths for the per-name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Widths {
    pub name: usize,
    pub value: usize,
}

impl From<&Config> for Widths {
    fn from(config: &Config) -> Self {
        Self {
            name: config.name_width,
            value: config.value_width,
        }
    }
}

/// Formats the human-readable summary.
///
/// One row per name, ascending by total time, then the totals line.
pub fn format_summary(summary: &Summary, widths: Widths) -> String {
    let mut output = String::new();
    let Widths { name, value } = widths;

    for stats in &summary.names {
        writeln!(
            output,
            "{:<name$}{:>value$}{:>value$}",
            stats.name,
            Fixed(stats.total),
            stats.count
        )
        .unwrap();
    }

    writeln!(
        output,
        "#tasks={} endtime={} time={} parallelism={:.3}",
        summary.task_count,
        Fixed(summary.end_time),
        Fixed(summary.busy_time),
        summary.parallelism
    )
    .unwrap();

    output
}

/// Runs the summary command.
pub fn run<W: Write>(writer: &mut W, index: &TraceIndex, config: &Config, json: bool) -> Result<()> {
    if json {
        write_json(writer, index.summary())
    } else {
        write!(writer, "{}", format_summary(index.summary(), config.into()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pv_core::Layout;

    fn index(log: &str) -> TraceIndex {
        TraceIndex::load(log.as_bytes(), &Layout::default())
            .unwrap()
            .index
    }

    const LOG: &str = ".1 Foo\n.2 Bar\n0 0 100000 1\n0 1000000 100000 1\n0 500000 100000 2\n";

    #[test]
    fn test_format_summary_orders_by_total() {
        let idx = index(LOG);
        let widths = Widths {
            name: 8,
            value: 10,
        };
        assert_snapshot!(format_summary(idx.summary(), widths), @r"
        Bar       0.100000         1
        Foo       0.200000         2
        #tasks=3 endtime=1.100000 time=0.300000 parallelism=0.273
        ");
    }

    #[test]
    fn test_format_summary_default_widths() {
        let idx = index(".1 Work\n.2 Idle\n0 0 2500000 1\n1 0 2500000 1\n");
        let output = format_summary(idx.summary(), (&Config::default()).into());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 60);
        assert!(lines[0].starts_with("Idle "));
        assert!(lines[0].ends_with("  0.000000         0"));
        assert!(lines[1].ends_with("  5.000000         2"));
        assert_eq!(
            lines[2],
            "#tasks=2 endtime=2.500000 time=5.000000 parallelism=2.000"
        );
    }

    #[test]
    fn test_long_names_are_not_truncated() {
        let idx = index(".1 a-very-long-task-name\n0 0 1 1\n");
        let widths = Widths { name: 4, value: 3 };
        let output = format_summary(idx.summary(), widths);
        assert!(output.starts_with("a-very-long-task-name0.000001  1\n"));
    }

    #[test]
    fn test_run_json() {
        let idx = index(LOG);
        let mut out = Vec::new();
        run(&mut out, &idx, &Config::default(), true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["task_count"], 3);
        assert_eq!(value["end_time"], 1_100_000);
        assert_eq!(value["names"][0]["name"], "Bar");
        assert_eq!(value["names"][1]["count"], 2);
    }
}
