//! Task ingestion: turns lexed records into raw tasks and a name table.

use std::collections::HashMap;

use crate::error::{LoadError, ParseError, ParseErrorKind};
use crate::lexer::{Cursor, Record, TaskFields};

/// Append-only table of task names, addressed by dense id.
///
/// Raw name keys from the log map to dense ids on first sight; a later
/// definition for the same key is ignored.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: Vec<String>,
    by_key: HashMap<u64, usize>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines `name` for `key` unless the key is already known.
    ///
    /// Returns the dense id the key maps to.
    pub fn define(&mut self, key: u64, name: impl Into<String>) -> usize {
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.into());
        self.by_key.insert(key, id);
        id
    }

    /// Looks up the dense id for a raw key.
    pub fn resolve(&self, key: u64) -> Option<usize> {
        self.by_key.get(&key).copied()
    }

    /// Returns the name with the given dense id.
    pub fn get(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates names in id order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// A task as read from the log, before renumbering and time normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTask {
    /// Raw process id. The log grammar has no process field, so ingested tasks
    /// always carry 0 here.
    pub process: u64,
    pub thread: u64,
    pub start: u64,
    pub length: u64,
    pub name_id: usize,
}

/// Output of a successful ingestion pass.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub tasks: Vec<RawTask>,
    pub names: NameTable,
}

/// Drives a [`Cursor`] over a log buffer and accumulates names and tasks.
pub struct Ingestor<'a> {
    cursor: Cursor<'a>,
    names: NameTable,
    tasks: Vec<RawTask>,
}

impl<'a> Ingestor<'a> {
    /// Creates an ingestor for `bytes`, reserving one task slot per line.
    pub fn new(bytes: &'a [u8]) -> Self {
        let lines = bytes.iter().filter(|&&b| b == b'\n').count();
        tracing::debug!(lines, bytes = bytes.len(), "scanned log");
        Self {
            cursor: Cursor::new(bytes),
            names: NameTable::new(),
            tasks: Vec::with_capacity(lines + 1),
        }
    }

    /// Records a name definition. First definition of a key wins.
    pub fn ingest_name_line(&mut self, key: u64, name: &[u8]) {
        self.names.define(key, String::from_utf8_lossy(name));
    }

    /// Records a task, resolving its name key through the name table.
    ///
    /// `offset` locates the line for error reporting. An undefined name key is
    /// a parse error.
    pub fn ingest_task_line(&mut self, fields: TaskFields, offset: usize) -> Result<(), ParseError> {
        let name_id = self.names.resolve(fields.name_key).ok_or_else(|| {
            ParseError::new(
                offset,
                ParseErrorKind::UndefinedName {
                    key: fields.name_key,
                },
            )
        })?;
        self.tasks.push(RawTask {
            process: 0,
            thread: fields.thread,
            start: fields.start,
            length: fields.length,
            name_id,
        });
        Ok(())
    }

    fn step(&mut self) -> Result<bool, ParseError> {
        match self.cursor.next_record()? {
            None => Ok(false),
            Some(Record::Name { key, name }) => {
                self.ingest_name_line(key, name);
                Ok(true)
            }
            Some(Record::Task(fields)) => {
                let offset = self.cursor.line_start();
                self.ingest_task_line(fields, offset)?;
                Ok(true)
            }
        }
    }

    /// Consumes the whole buffer.
    ///
    /// Fails with [`LoadError::Malformed`] if parsing stops before any task was
    /// read, [`LoadError::Parse`] if it stops later, and [`LoadError::Empty`] if
    /// the log parses but holds no tasks.
    pub fn run(mut self) -> Result<Ingested, LoadError> {
        loop {
            match self.step() {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) if self.tasks.is_empty() => return Err(LoadError::Malformed(err)),
                Err(err) => return Err(LoadError::Parse(err)),
            }
        }

        if self.tasks.is_empty() {
            return Err(LoadError::Empty);
        }

        tracing::debug!(
            tasks = self.tasks.len(),
            names = self.names.len(),
            "parsed"
        );
        Ok(Ingested {
            tasks: self.tasks,
            names: self.names,
        })
    }
}

/// Ingests a complete log buffer.
pub fn ingest(bytes: &[u8]) -> Result<Ingested, LoadError> {
    Ingestor::new(bytes).run()
}
