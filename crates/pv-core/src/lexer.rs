//! Line lexer for the trace log grammar.
//!
//! The log is a flat sequence of lines terminated by any run of `\n`/`\r`:
//!
//! - `# anything` is a comment and is skipped entirely.
//! - `.<hex id> <name>` defines a name; the name runs verbatim to the end of the line.
//! - `<thread> <start> <length> <hex name key>` is a task.
//!
//! Parsing is positional: a [`Cursor`] walks the byte buffer in place and hands
//! out one [`Record`] at a time, borrowing name bytes straight from the input.

use crate::error::{Field, ParseError, ParseErrorKind};

/// The four numeric fields of a task line, in raw (log) units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFields {
    pub thread: u64,
    pub start: u64,
    pub length: u64,
    pub name_key: u64,
}

/// One logical line of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    /// A name definition: raw key and the name bytes, terminator excluded.
    Name { key: u64, name: &'a [u8] },
    /// A task line.
    Task(TaskFields),
}

/// A read position inside a log buffer.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    line_start: usize,
}

const fn is_newline(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

const fn is_blank(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `bytes`.
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            line_start: 0,
        }
    }

    /// Current byte offset from the start of the buffer.
    pub const fn offset(&self) -> usize {
        self.pos
    }

    /// Byte offset at which the most recently returned record began.
    pub const fn line_start(&self) -> usize {
        self.line_start
    }

    /// Whether every byte has been consumed.
    pub const fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn skip_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
    }

    /// Skips a run of line terminators (any mix of `\n` and `\r`).
    pub fn skip_newlines(&mut self) {
        self.skip_while(is_newline);
    }

    /// Skips spaces and tabs.
    fn skip_blanks(&mut self) {
        self.skip_while(is_blank);
    }

    /// Consumes bytes up to, but not including, the next line terminator.
    pub fn rest_of_line(&mut self) -> &'a [u8] {
        let start = self.pos;
        self.skip_while(|b| !is_newline(b));
        &self.bytes[start..self.pos]
    }

    /// Consumes the remainder of the current line and its terminator run.
    pub fn skip_line(&mut self) {
        self.rest_of_line();
        self.skip_newlines();
    }

    /// Parses an unsigned number in the radix of `field`.
    ///
    /// Hexadecimal fields accept an optional `0x`/`0X` prefix. At least one digit
    /// is required and the value must fit in a `u64`.
    pub fn number(&mut self, field: Field) -> Result<u64, ParseError> {
        let radix = field.radix();
        let begin = self.pos;

        if radix == 16
            && self.peek() == Some(b'0')
            && matches!(self.peek_at(1), Some(b'x' | b'X'))
            && self.peek_at(2).is_some_and(|b| b.is_ascii_hexdigit())
        {
            self.pos += 2;
        }

        let mut value: u64 = 0;
        let mut digits = 0usize;
        while let Some(digit) = self.peek().and_then(|b| char::from(b).to_digit(radix)) {
            value = value
                .checked_mul(u64::from(radix))
                .and_then(|v| v.checked_add(u64::from(digit)))
                .ok_or_else(|| ParseError::new(begin, ParseErrorKind::NumberOverflow { field }))?;
            digits += 1;
            self.pos += 1;
        }

        if digits == 0 {
            return Err(ParseError::new(
                self.pos,
                ParseErrorKind::InvalidNumber { field },
            ));
        }
        Ok(value)
    }

    /// Reads the next name or task record, skipping blank and comment lines.
    ///
    /// Returns `Ok(None)` once the buffer is exhausted. Any error is fatal for the
    /// whole log; the cursor position is unspecified afterwards.
    pub fn next_record(&mut self) -> Result<Option<Record<'a>>, ParseError> {
        loop {
            self.skip_newlines();
            self.line_start = self.pos;
            match self.peek() {
                None => return Ok(None),
                Some(b'#') => self.skip_line(),
                Some(b'.') => {
                    self.pos += 1;
                    return self.name_line().map(Some);
                }
                Some(_) => {
                    self.skip_blanks();
                    if self.peek().is_none_or(is_newline) {
                        continue;
                    }
                    return self.task_line().map(|fields| Some(Record::Task(fields)));
                }
            }
        }
    }

    fn name_line(&mut self) -> Result<Record<'a>, ParseError> {
        let key = self.number(Field::NameId)?;
        if self.peek() != Some(b' ') {
            return Err(ParseError::new(
                self.pos,
                ParseErrorKind::MissingNameSeparator,
            ));
        }
        self.pos += 1;
        let name = self.rest_of_line();
        self.skip_newlines();
        Ok(Record::Name { key, name })
    }

    fn task_line(&mut self) -> Result<TaskFields, ParseError> {
        let thread = self.number(Field::Thread)?;
        self.skip_blanks();
        let start = self.number(Field::Start)?;
        self.skip_blanks();
        let length = self.number(Field::Length)?;
        self.skip_blanks();
        let name_key = self.number(Field::NameKey)?;
        self.skip_blanks();

        match self.peek() {
            Some(byte) if !is_newline(byte) => Err(ParseError::new(
                self.pos,
                ParseErrorKind::TrailingBytes { byte },
            )),
            _ => {
                self.skip_newlines();
                Ok(TaskFields {
                    thread,
                    start,
                    length,
                    name_key,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(input: &str) -> Result<Vec<Record<'_>>, ParseError> {
        let mut cursor = Cursor::new(input.as_bytes());
        let mut out = Vec::new();
        while let Some(record) = cursor.next_record()? {
            out.push(record);
        }
        Ok(out)
    }

    fn task(thread: u64, start: u64, length: u64, name_key: u64) -> Record<'static> {
        Record::Task(TaskFields {
            thread,
            start,
            length,
            name_key,
        })
    }

    #[test]
    fn test_classifies_names_tasks_and_comments() {
        let input = "# header\n.1a Foo Bar\n3 100 20 1a\n";
        let got = records(input).unwrap();
        assert_eq!(
            got,
            vec![
                Record::Name {
                    key: 0x1a,
                    name: b"Foo Bar",
                },
                task(3, 100, 20, 0x1a),
            ]
        );
    }

    #[test]
    fn test_mixed_terminators_collapse() {
        let input = ".1 A\r\n\r\n\n0 1 2 1\r\r0 3 4 1";
        let got = records(input).unwrap();
        assert_eq!(
            got,
            vec![
                Record::Name { key: 1, name: b"A" },
                task(0, 1, 2, 1),
                task(0, 3, 4, 1),
            ]
        );
    }

    #[test]
    fn test_name_keeps_embedded_whitespace() {
        let got = records(".ff  spaced\tname \n").unwrap();
        assert_eq!(
            got,
            vec![Record::Name {
                key: 0xff,
                name: b" spaced\tname ",
            }]
        );
    }

    #[test]
    fn test_empty_name_is_allowed() {
        let got = records(".2 \n").unwrap();
        assert_eq!(got, vec![Record::Name { key: 2, name: b"" }]);
    }

    #[test]
    fn test_blank_and_whitespace_lines_are_skipped() {
        let got = records("\n   \n\t\n0 1 2 3\n\n").unwrap();
        assert_eq!(got, vec![task(0, 1, 2, 3)]);
    }

    #[test]
    fn test_comment_lines_are_skipped_whole() {
        let got = records("#.1 not a name\n# 0 1 2 3\n").unwrap();
        assert!(got.is_empty());
    }

    #[test]
    fn test_name_without_space_is_fatal() {
        let err = records(".1-Foo\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingNameSeparator);
        assert_eq!(err.offset, 2);

        let err = records(".1\n0 1 2 1\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingNameSeparator);
    }

    #[test]
    fn test_name_without_id_is_fatal() {
        let err = records(". Foo\n").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::InvalidNumber {
                field: Field::NameId
            }
        );
    }

    #[test]
    fn test_hex_prefix_is_accepted() {
        let got = records(".0x10 A\n0 1 2 0X10\n").unwrap();
        assert_eq!(
            got,
            vec![Record::Name { key: 16, name: b"A" }, task(0, 1, 2, 16)]
        );
    }

    #[test]
    fn test_bad_numeric_field_reports_field_and_offset() {
        let err = records("0 1 x 1\n").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::InvalidNumber {
                field: Field::Length
            }
        );
        assert_eq!(err.offset, 4);
    }

    #[test]
    fn test_truncated_task_line_is_fatal() {
        let err = records("0 1 2\n").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::InvalidNumber {
                field: Field::NameKey
            }
        );
    }

    #[test]
    fn test_overflow_is_fatal() {
        let err = records("0 18446744073709551616 1 1\n").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::NumberOverflow {
                field: Field::Start
            }
        );
        assert_eq!(err.offset, 2);

        let max = records("0 18446744073709551615 1 1\n").unwrap();
        assert_eq!(max, vec![task(0, u64::MAX, 1, 1)]);
    }

    #[test]
    fn test_trailing_garbage_is_fatal() {
        let err = records("0 1 2 3 4\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TrailingBytes { byte: b'4' });
    }

    #[test]
    fn test_trailing_blanks_are_tolerated() {
        let got = records("0 1 2 3  \t\n").unwrap();
        assert_eq!(got, vec![task(0, 1, 2, 3)]);
    }

    #[test]
    fn test_cursor_reports_offset() {
        let mut cursor = Cursor::new(b"0 1 2 3\n.4 x\n");
        cursor.next_record().unwrap();
        assert_eq!(cursor.offset(), 8);
        assert_eq!(cursor.line_start(), 0);
        cursor.next_record().unwrap();
        assert_eq!(cursor.line_start(), 8);
        assert!(cursor.is_at_end());
        assert_eq!(cursor.next_record().unwrap(), None);
    }
}
