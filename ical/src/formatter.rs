// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar (RFC 5545) content line formatter.
//!
//! Writes content lines to any `std::io::Write` implementer, optionally
//! folding long lines.
//!
//! # Example
//!
//! ```
//! use vcs2ics_ical::formatter::{FormatOptions, Formatter};
//!
//! let mut buffer = Vec::new();
//! let mut formatter = Formatter::new(&mut buffer, FormatOptions::default());
//! formatter.write_begin_block("VEVENT")?;
//! formatter.write_property("SUMMARY", "Test Event")?;
//! formatter.write_end_block("VEVENT")?;
//! assert_eq!(buffer, b"BEGIN:VEVENT\r\nSUMMARY:Test Event\r\nEND:VEVENT\r\n");
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Write};

use crate::keyword::{KW_BEGIN, KW_END};

/// Formatting options for the iCalendar formatter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Maximum line length in octets before folding.
    /// - `None`: no line folding
    /// - `Some(n)`: fold lines longer than n octets
    ///
    /// Default: `None`. RFC 5545 recommends `Some(75)`.
    pub folding: Option<usize>,

    /// Line folding style.
    ///
    /// Default: `FoldingStyle::Space` (CRLF + SPACE).
    pub folding_style: FoldingStyle,
}

impl FormatOptions {
    /// Set the line folding option.
    #[must_use]
    pub const fn folding(mut self, folding: Option<usize>) -> Self {
        self.folding = folding;
        self
    }

    /// Set the line folding style.
    #[must_use]
    pub const fn folding_style(mut self, style: FoldingStyle) -> Self {
        self.folding_style = style;
        self
    }
}

/// Line folding style for RFC 5545 formatting.
///
/// RFC 5545 specifies that folded lines should start with CRLF followed by
/// a whitespace character (SPACE or TAB).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FoldingStyle {
    /// CRLF + SPACE (RFC 5545 default)
    #[default]
    Space,
    /// CRLF + TAB
    Tab,
}

impl FoldingStyle {
    /// Get the folding sequence for this style.
    #[must_use]
    pub(crate) const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Space => b"\r\n ",
            Self::Tab => b"\r\n\t",
        }
    }

    /// Get the length of the continuation character after CRLF.
    #[must_use]
    pub(crate) const fn continuation_len() -> usize {
        1 // Both SPACE and TAB are 1 byte
    }
}

/// iCalendar formatter that writes to any `Write` implementer.
///
/// Bytes written through its `Write` implementation are folded according to
/// [`FormatOptions::folding`]. Embedded line breaks reset the line length, so
/// a pre-rendered multi-line block can be written in one call.
#[derive(Debug)]
pub struct Formatter<W: Write> {
    /// The underlying writer.
    writer: W,
    /// Formatting options.
    options: FormatOptions,
    /// Current line length in bytes (excluding the pending CRLF).
    line_length: usize,
    /// Whether the last byte written opened a backslash escape.
    in_escape: bool,
}

impl<W: Write> Formatter<W> {
    /// Create a new formatter with options.
    #[must_use]
    pub const fn new(writer: W, options: FormatOptions) -> Self {
        Self {
            writer,
            options,
            line_length: 0,
            in_escape: false,
        }
    }

    /// Consumes this formatter, returning the underlying writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Write `BEGIN:<name>` and a line ending.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_begin_block(&mut self, name: &str) -> io::Result<()> {
        self.write_property(KW_BEGIN, name)
    }

    /// Write `END:<name>` and a line ending.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_end_block(&mut self, name: &str) -> io::Result<()> {
        self.write_property(KW_END, name)
    }

    /// Write `<name>:<value>` and a line ending.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_property(&mut self, name: &str, value: &str) -> io::Result<()> {
        write!(self, "{name}:{value}")?;
        self.writeln()
    }

    /// Write a CRLF line ending.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn writeln(&mut self) -> io::Result<()> {
        self.writer.write_all(b"\r\n")?;
        self.line_length = 0;
        self.in_escape = false;
        Ok(())
    }

    /// Insert line folding: CRLF + whitespace.
    ///
    /// This inserts the RFC 5545 line folding sequence and updates the
    /// line length counter (the whitespace after CRLF counts as 1 byte).
    fn insert_fold(&mut self) -> io::Result<()> {
        self.writer
            .write_all(self.options.folding_style.as_bytes())?;
        self.line_length = FoldingStyle::continuation_len();
        Ok(())
    }

    /// Write the content of one line, folding it at `max_len` octets.
    fn write_folded(&mut self, mut content: &[u8], max_len: usize) -> io::Result<()> {
        while !content.is_empty() {
            if self.line_length >= max_len && self.line_length > 0 {
                self.insert_fold()?;
            }

            let available = max_len.saturating_sub(self.line_length);
            let mut len = find_safe_write_length(content, available);
            if len == 0 {
                if self.line_length > FoldingStyle::continuation_len() {
                    // The next character does not fit, move it to a new line
                    self.insert_fold()?;
                    continue;
                }
                len = utf8_sequence_length(content);
            }

            // Never fold between a backslash and the character it escapes
            let mut in_escape = self.in_escape;
            let (chunk, _) = content.split_at(len);
            for &byte in chunk {
                in_escape = !in_escape && byte == b'\\';
            }
            if in_escape && len < content.len() {
                let (_, escaped) = content.split_at(len);
                len += utf8_sequence_length(escaped);
                in_escape = false;
            }

            let (chunk, rest) = content.split_at(len);
            self.writer.write_all(chunk)?;
            self.line_length += len;
            self.in_escape = in_escape;
            content = rest;
        }
        Ok(())
    }
}

impl<W: Write> Write for Formatter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(max_len) = self.options.folding else {
            // Folding disabled, write directly
            self.writer.write_all(buf)?;
            return Ok(buf.len());
        };

        for line in buf.split_inclusive(|&b| b == b'\n') {
            let content = line
                .strip_suffix(b"\r\n")
                .or_else(|| line.strip_suffix(b"\n"))
                .unwrap_or(line);
            self.write_folded(content, max_len)?;

            let (_, newline) = line.split_at(content.len());
            if !newline.is_empty() {
                self.writer.write_all(newline)?;
                self.line_length = 0;
                self.in_escape = false;
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Find the maximum number of bytes we can write without breaking a UTF-8 sequence.
///
/// UTF-8 encoding:
/// - 0xxxxxxx: 1 byte (ASCII)
/// - 110xxxxx: 2 bytes (starts with 0b110xxxxx)
/// - 1110xxxx: 3 bytes (starts with 0b1110xxxx)
/// - 11110xxx: 4 bytes (starts with 0b11110xxx)
/// - 10xxxxxx: continuation byte (not a start byte)
fn find_safe_write_length(buf: &[u8], max_bytes: usize) -> usize {
    if max_bytes >= buf.len() {
        return buf.len();
    }

    // Move back while the byte at `pos` continues the previous character
    let mut pos = max_bytes;
    while pos > 0 && buf.get(pos).is_some_and(|&b| is_continuation(b)) {
        pos -= 1;
    }
    pos
}

/// Length of the UTF-8 sequence at the start of `buf`.
fn utf8_sequence_length(buf: &[u8]) -> usize {
    1 + buf
        .iter()
        .skip(1)
        .take_while(|&&b| is_continuation(b))
        .count()
}

const fn is_continuation(byte: u8) -> bool {
    (byte & 0xC0) == 0x80
}
