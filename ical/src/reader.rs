// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Line reader that reassembles multi-line vCalendar fields.
//!
//! vCalendar continues a field on the next physical line in two ways:
//!
//! ```text
//! DESCRIPTION:first part        plain: continuation lines start with
//!  second part                  whitespace, which is dropped
//!
//! SUMMARY;ENCODING=QUOTED-PRINTABLE:first=
//! second                        quoted-printable: a trailing '=' joins
//!                               the next line
//! ```

use std::io::BufRead;

use crate::error::ConvertError;
use crate::quoted_printable;

/// Buffered reader over physical lines with one line of push-back.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    pending: Option<Vec<u8>>,
    line_number: usize,
}

impl<R: BufRead> LineReader<R> {
    /// Wrap a buffered reader.
    pub const fn new(inner: R) -> Self {
        Self {
            inner,
            pending: None,
            line_number: 0,
        }
    }

    /// Number of physical lines consumed so far.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next line without its CR/LF terminator.
    ///
    /// Returns `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Io`] if the underlying reader fails.
    pub fn next_line(&mut self) -> Result<Option<String>, ConvertError> {
        Ok(self.next_raw()?.map(|raw| to_text(&raw)))
    }

    /// Collect the plain continuation lines following a field's first line.
    ///
    /// Every following line that starts with whitespace is appended with that
    /// single whitespace character removed. The first line that does not is
    /// pushed back for the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Io`] if the underlying reader fails.
    pub fn read_continued(&mut self, first: &str) -> Result<String, ConvertError> {
        let mut value = first.to_owned();
        while let Some(raw) = self.next_raw()? {
            match raw.split_first() {
                Some((&c, rest)) if is_continuation_lead(c) => value.push_str(&to_text(rest)),
                _ => {
                    self.push_back(raw);
                    break;
                }
            }
        }
        Ok(value)
    }

    /// Collect a quoted-printable value that may end in soft line breaks, then
    /// decode it.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnexpectedEndOfInput`] if the input ends while a
    /// trailing `=` still asks for another line, or [`ConvertError::Io`] if the
    /// underlying reader fails.
    pub fn read_quoted_printable(
        &mut self,
        first: &str,
        field: &'static str,
    ) -> Result<String, ConvertError> {
        let mut value = first.to_owned();
        while value.ends_with('=') {
            value.pop();
            let Some(raw) = self.next_raw()? else {
                return Err(ConvertError::UnexpectedEndOfInput { field });
            };
            value.push_str(&to_text(&raw));
        }
        Ok(quoted_printable::decode(&value))
    }

    fn next_raw(&mut self) -> Result<Option<Vec<u8>>, ConvertError> {
        if let Some(raw) = self.pending.take() {
            self.line_number += 1;
            return Ok(Some(raw));
        }

        let mut raw = Vec::new();
        if self.inner.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        Ok(Some(raw))
    }

    fn push_back(&mut self, raw: Vec<u8>) {
        self.line_number -= 1;
        self.pending = Some(raw);
    }
}

/// ASCII whitespace, vertical tab included.
const fn is_continuation_lead(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b'\x0B' | b'\x0C')
}

/// Drop trailing CR/LF and decode, replacing invalid UTF-8.
fn to_text(raw: &[u8]) -> String {
    let end = raw
        .iter()
        .rposition(|&b| b != b'\r' && b != b'\n')
        .map_or(0, |i| i + 1);
    String::from_utf8_lossy(raw.get(..end).unwrap_or_default()).into_owned()
}
