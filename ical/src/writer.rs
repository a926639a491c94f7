// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar 2.0 emitter for parsed vCalendar records.
//!
//! The calendar header is written lazily on the first write of any kind, and
//! the footer on [`IcsWriter::close`]. Each record is rendered into a local
//! buffer first, so a record that fails leaves nothing behind in the output.

use std::io::{self, Write};

use crate::alarm::Alarm;
use crate::convert::ConvertOptions;
use crate::date::{Timestamp, format_date, format_day_only, parse_date};
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::error::ConvertError;
use crate::formatter::{FormatOptions, Formatter};
use crate::keyword::{
    KW_DATE, KW_DESCRIPTION, KW_DTEND, KW_DTSTAMP, KW_DTSTART, KW_DUE, KW_END, KW_LOCATION,
    KW_ORGANIZER, KW_PRODID, KW_SEQUENCE, KW_STATUS, KW_SUMMARY, KW_VALUE, KW_VCALENDAR,
    KW_VERSION, KW_VERSION_2_0, KW_VEVENT, KW_VTODO,
};
use crate::parser::{Record, RecordKind};
use crate::rrule::RepeatRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    NotStarted,
    HeaderWritten,
    Closed,
}

/// Writes an iCalendar document to an underlying writer.
#[derive(Debug)]
pub struct IcsWriter<W: Write> {
    writer: W,
    organizer: Option<String>,
    use_end_date: bool,
    format: FormatOptions,
    state: WriterState,
}

impl<W: Write> IcsWriter<W> {
    /// Create a writer configured by `options`.
    ///
    /// The organizer email doubles as the calendar `PRODID`.
    #[must_use]
    pub fn new(writer: W, options: &ConvertOptions) -> Self {
        Self {
            writer,
            organizer: options.organizer.clone(),
            use_end_date: options.use_end_date,
            format: options.format,
            state: WriterState::NotStarted,
        }
    }

    /// Write the calendar header if nothing has been written yet.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::WriterClosed`] after [`close`](Self::close), or
    /// [`ConvertError::Io`] if writing fails.
    pub fn write_header(&mut self) -> Result<(), ConvertError> {
        match self.state {
            WriterState::Closed => Err(ConvertError::WriterClosed),
            WriterState::HeaderWritten => Ok(()),
            WriterState::NotStarted => {
                let mut buffer = Vec::new();
                let mut f = Formatter::new(&mut buffer, self.format);
                f.write_begin_block(KW_VCALENDAR)?;
                f.write_property(KW_PRODID, self.organizer.as_deref().unwrap_or_default())?;
                f.write_property(KW_VERSION, KW_VERSION_2_0)?;

                self.writer.write_all(&buffer)?;
                self.state = WriterState::HeaderWritten;
                Ok(())
            }
        }
    }

    /// Append one record as a `VEVENT` or `VTODO` block.
    ///
    /// A recurrence rule or alarm that cannot be translated is left out and
    /// reported to `diagnostics`.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::MissingStartDate`] for an event without
    /// `DTSTART`, in which case no part of the block is written.
    pub fn add_record(
        &mut self,
        record: &Record,
        diagnostics: &mut impl DiagnosticSink,
    ) -> Result<(), ConvertError> {
        self.write_header()?;

        let mut buffer = Vec::new();
        let mut f = Formatter::new(&mut buffer, self.format);
        match record.kind {
            RecordKind::Task => self.write_task(&mut f, record)?,
            RecordKind::Event => self.write_event(&mut f, record, diagnostics)?,
        }

        self.writer.write_all(&buffer)?;
        Ok(())
    }

    fn write_task(
        &self,
        f: &mut Formatter<&mut Vec<u8>>,
        record: &Record,
    ) -> Result<(), ConvertError> {
        f.write_begin_block(KW_VTODO)?;
        Self::write_dtstamp(f, record)?;
        f.write_property(KW_SEQUENCE, record.sequence.as_deref().unwrap_or("0"))?;
        if let Some(organizer) = &self.organizer {
            f.write_property(KW_ORGANIZER, organizer)?;
        }
        if let Some(due) = &record.due {
            f.write_property(KW_DUE, due)?;
        }
        if let Some(status) = &record.status {
            f.write_property(KW_STATUS, status)?;
        }
        if let Some(summary) = &record.summary {
            f.write_property(KW_SUMMARY, summary)?;
        }
        f.write_end_block(KW_VTODO)?;
        Ok(())
    }

    fn write_event(
        &self,
        f: &mut Formatter<&mut Vec<u8>>,
        record: &Record,
        diagnostics: &mut impl DiagnosticSink,
    ) -> Result<(), ConvertError> {
        let Some(dtstart) = record.dtstart.as_deref() else {
            return Err(ConvertError::MissingStartDate);
        };

        f.write_begin_block(KW_VEVENT)?;
        if let Some(organizer) = &self.organizer {
            f.write_property(KW_ORGANIZER, organizer)?;
        }
        for (name, value) in [
            (KW_SUMMARY, &record.summary),
            (KW_DESCRIPTION, &record.description),
            (KW_LOCATION, &record.location),
        ] {
            if let Some(value) = value {
                f.write_property(name, value)?;
            }
        }

        if let Some(rule) = &record.rrule {
            match RepeatRule::parse(rule, self.use_end_date) {
                Ok(rule) => {
                    f.write_all(rule.render().as_bytes())?;
                    f.writeln()?;
                }
                Err(error) => diagnostics.report(Diagnostic::DroppedRule { error }),
            }
        }

        Self::write_start_end(f, dtstart, record.dtend.as_deref())?;

        Self::write_dtstamp(f, record)?;

        if let Some(alarm_time) = &record.alarm {
            match parse_date(dtstart).and_then(|start| Ok((start, parse_date(alarm_time)?))) {
                Ok((start, fires_at)) => {
                    let alarm = Alarm::from_times(&start, &fires_at);
                    let summary = record.summary.as_deref().unwrap_or_default();
                    f.write_all(alarm.render(summary).as_bytes())?;
                    f.writeln()?;
                }
                Err(error) => diagnostics.report(Diagnostic::DroppedAlarm {
                    alarm: alarm_time.clone(),
                    error,
                }),
            }
        }

        f.write_end_block(KW_VEVENT)?;
        Ok(())
    }

    /// `LAST-MODIFIED` of the record, or the current time.
    fn write_dtstamp(f: &mut Formatter<&mut Vec<u8>>, record: &Record) -> io::Result<()> {
        match &record.dtstamp {
            Some(dtstamp) => f.write_property(KW_DTSTAMP, dtstamp),
            None => f.write_property(KW_DTSTAMP, &format_date(&Timestamp::now())),
        }
    }

    /// An event that starts and ends at the same midnight is an all-day event.
    fn write_start_end(
        f: &mut Formatter<&mut Vec<u8>>,
        dtstart: &str,
        dtend: Option<&str>,
    ) -> io::Result<()> {
        if dtend == Some(dtstart) {
            return match parse_date(dtstart) {
                Ok(start) if start.is_midnight() => {
                    let name = format!("{KW_DTSTART};{KW_VALUE}={KW_DATE}");
                    f.write_property(&name, &format_day_only(&start))
                }
                _ => f.write_property(KW_DTSTART, dtstart),
            };
        }

        f.write_property(KW_DTSTART, dtstart)?;
        if let Some(dtend) = dtend {
            f.write_property(KW_DTEND, dtend)?;
        }
        Ok(())
    }

    /// Write the calendar footer and flush.
    ///
    /// The header is written first if the document is still empty. Closing an
    /// already closed writer does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Io`] if writing or flushing fails.
    pub fn close(&mut self) -> Result<(), ConvertError> {
        if self.state == WriterState::Closed {
            return Ok(());
        }

        self.write_header()?;
        write!(self.writer, "{KW_END}:{KW_VCALENDAR}")?;
        self.writer.flush()?;
        self.state = WriterState::Closed;
        Ok(())
    }

    /// Whether [`close`](Self::close) has completed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == WriterState::Closed
    }

    /// Consumes this writer, returning the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Raw bytes are passed through after the header, and rejected once closed.
impl<W: Write> Write for IcsWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_header().map_err(into_io_error)?;
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

fn into_io_error(error: ConvertError) -> io::Error {
    match error {
        ConvertError::Io(error) => error,
        error => io::Error::other(error),
    }
}
