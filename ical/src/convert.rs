// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Stream conversion from vCalendar 1.0 to iCalendar 2.0.

use std::io::{BufReader, Read, Write};

use crate::diagnostic::{DiagnosticSink, TracingSink};
use crate::error::ConvertError;
use crate::formatter::FormatOptions;
use crate::parser::RecordParser;
use crate::writer::IcsWriter;

/// Options for a conversion.
///
/// # Example
///
/// ```
/// use vcs2ics_ical::{ConvertOptions, Diagnostic};
///
/// let input = "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n";
/// let mut diagnostics = Vec::<Diagnostic>::new();
/// let output = ConvertOptions::default()
///     .organizer("a@b.com")
///     .convert(input.as_bytes(), Vec::new(), &mut diagnostics)?;
/// assert!(output.starts_with(b"BEGIN:VCALENDAR\r\nPRODID:a@b.com\r\n"));
/// # Ok::<(), vcs2ics_ical::ConvertError>(())
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Organizer email, also used as the calendar `PRODID`.
    pub organizer: Option<String>,

    /// Translate the end date of a recurrence rule into `UNTIL`.
    ///
    /// Default: `false`, rules without a count repeat forever.
    pub use_end_date: bool,

    /// Output formatting.
    pub format: FormatOptions,
}

impl ConvertOptions {
    /// Set the organizer email. An empty string clears it.
    #[must_use]
    pub fn organizer(mut self, email: impl Into<String>) -> Self {
        let email = email.into();
        self.organizer = (!email.is_empty()).then_some(email);
        self
    }

    /// Set whether recurrence end dates are kept.
    #[must_use]
    pub const fn use_end_date(mut self, use_end_date: bool) -> Self {
        self.use_end_date = use_end_date;
        self
    }

    /// Set the line folding width, see [`FormatOptions::folding`].
    #[must_use]
    pub const fn folding(mut self, folding: Option<usize>) -> Self {
        self.format = self.format.folding(folding);
        self
    }

    /// Convert every record of `input` and write the iCalendar document to
    /// `output`, which is handed back once the footer has been written.
    ///
    /// # Errors
    ///
    /// Stops at the first fatal error, leaving `output` partially written.
    pub fn convert<R: Read, W: Write>(
        &self,
        input: R,
        output: W,
        diagnostics: &mut impl DiagnosticSink,
    ) -> Result<W, ConvertError> {
        let mut parser = RecordParser::new(BufReader::new(input));
        let mut writer = IcsWriter::new(output, self);

        let mut count = 0_usize;
        while let Some(record) = parser.next_record(diagnostics)? {
            writer.add_record(&record, diagnostics)?;
            count += 1;
        }
        writer.close()?;

        tracing::debug!(records = count, "conversion finished");
        Ok(writer.into_inner())
    }
}

/// Convert a vCalendar document using default options, logging diagnostics
/// through `tracing`.
///
/// # Errors
///
/// See [`ConvertOptions::convert`].
pub fn convert<R: Read, W: Write>(input: R, output: W, email: &str) -> Result<(), ConvertError> {
    ConvertOptions::default()
        .organizer(email)
        .convert(input, output, &mut TracingSink)?;
    Ok(())
}
