// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Record parser for vCalendar 1.0 documents.
//!
//! The parser walks the document one line at a time:
//!
//! ```text
//!            BEGIN:VEVENT              END:VEVENT
//! Outside ─────────────────> InEvent ─────────────> Outside (yield Event)
//!         ─────────────────> InTask  ─────────────> Outside (yield Task)
//!            BEGIN:VTODO               END:VTODO
//! ```
//!
//! `END:VCALENDAR` outside a record ends the document.

use std::io::BufRead;

use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::error::ConvertError;
use crate::lexer::{Tag, lex_line};
use crate::reader::LineReader;

/// Whether a record is an event or a task.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `VEVENT`
    #[default]
    Event,
    /// `VTODO`
    Task,
}

/// The known fields of one `VEVENT` or `VTODO` block, as raw text.
///
/// Empty values are stored as `None`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Record {
    /// Event or task.
    pub kind: RecordKind,
    /// `SUMMARY`, decoded.
    pub summary: Option<String>,
    /// `DESCRIPTION`, decoded.
    pub description: Option<String>,
    /// `LOCATION`, decoded.
    pub location: Option<String>,
    /// `STATUS`
    pub status: Option<String>,
    /// `DUE`
    pub due: Option<String>,
    /// `SEQUENCE`
    pub sequence: Option<String>,
    /// `DTSTART`
    pub dtstart: Option<String>,
    /// `DTEND`
    pub dtend: Option<String>,
    /// `LAST-MODIFIED`, written out as `DTSTAMP`.
    pub dtstamp: Option<String>,
    /// `RRULE`, in vCalendar syntax.
    pub rrule: Option<String>,
    /// `AALARM` trigger time, without the alarm metadata.
    pub alarm: Option<String>,
}

impl Record {
    /// An empty record of the given kind.
    #[must_use]
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }
}

/// Parses records out of a vCalendar document.
#[derive(Debug)]
pub struct RecordParser<R> {
    reader: LineReader<R>,
    finished: bool,
}

impl<R: BufRead> RecordParser<R> {
    /// Create a parser over a buffered reader.
    pub const fn new(reader: R) -> Self {
        Self {
            reader: LineReader::new(reader),
            finished: false,
        }
    }

    /// Read the next record.
    ///
    /// Returns `None` once `END:VCALENDAR` or the end of input is reached. Lines
    /// outside a record that are not known headers are reported to
    /// `diagnostics` and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnexpectedEndOfInput`] if the input ends inside
    /// a quoted-printable field, or [`ConvertError::Io`] if reading fails.
    pub fn next_record(
        &mut self,
        diagnostics: &mut impl DiagnosticSink,
    ) -> Result<Option<Record>, ConvertError> {
        if self.finished {
            return Ok(None);
        }

        while let Some(line) = self.reader.next_line()? {
            match lex_line(&line) {
                Some((Tag::EndCalendar, _)) => break,
                Some((Tag::BeginEvent, _)) => return self.read_record(RecordKind::Event).map(Some),
                Some((Tag::BeginTodo, _)) => return self.read_record(RecordKind::Task).map(Some),
                Some((Tag::BeginCalendar | Tag::ProductId | Tag::Version, _)) => {}
                _ if line.trim().is_empty() => {}
                _ => diagnostics.report(Diagnostic::UnrecognizedHeader {
                    line_number: self.reader.line_number(),
                    line,
                }),
            }
        }

        self.finished = true;
        Ok(None)
    }

    fn read_record(&mut self, kind: RecordKind) -> Result<Record, ConvertError> {
        let mut record = Record::new(kind);
        let reader = &mut self.reader;

        while let Some(line) = reader.next_line()? {
            let Some((tag, rest)) = lex_line(&line) else {
                tracing::trace!(%line, "skipping unsupported field");
                continue;
            };

            match tag {
                Tag::EndEvent | Tag::EndTodo => return Ok(record),
                Tag::Summary => record.summary = non_empty(reader.read_continued(rest)?),
                Tag::Location => record.location = non_empty(reader.read_continued(rest)?),
                Tag::Description => record.description = non_empty(reader.read_continued(rest)?),
                Tag::SummaryQuotedPrintable => {
                    record.summary = non_empty(read_encoded(reader, tag, rest)?);
                }
                Tag::LocationQuotedPrintable => {
                    record.location = non_empty(read_encoded(reader, tag, rest)?);
                }
                Tag::DescriptionQuotedPrintable => {
                    record.description = non_empty(read_encoded(reader, tag, rest)?);
                }
                Tag::DtStart => record.dtstart = non_empty(rest),
                Tag::DtEnd => record.dtend = non_empty(rest),
                Tag::Due => record.due = non_empty(rest),
                Tag::Status => record.status = non_empty(rest),
                Tag::Sequence => record.sequence = non_empty(rest),
                Tag::RRule => record.rrule = non_empty(rest),
                Tag::LastModified => record.dtstamp = non_empty(rest),
                // Only the trigger time is kept, the alarm metadata after the
                // first ';' is dropped. Without a ';' there is no alarm.
                Tag::AudioAlarm => {
                    if let Some((time, _)) = rest.split_once(';') {
                        record.alarm = non_empty(time);
                    }
                }
                Tag::BeginCalendar
                | Tag::EndCalendar
                | Tag::BeginEvent
                | Tag::BeginTodo
                | Tag::ProductId
                | Tag::Version => {
                    tracing::trace!(%tag, "skipping tag inside record");
                }
            }
        }

        tracing::debug!(?kind, "input ended inside a record, keeping what was read");
        Ok(record)
    }
}

/// Read a quoted-printable field. Its value starts after the first `:`.
fn read_encoded<R: BufRead>(
    reader: &mut LineReader<R>,
    tag: Tag,
    rest: &str,
) -> Result<String, ConvertError> {
    let value = rest.split_once(':').map_or("", |(_, value)| value);
    reader.read_quoted_printable(value, tag.name())
}

fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(src: &str) -> (Vec<Record>, Vec<Diagnostic>) {
        let mut parser = RecordParser::new(src.as_bytes());
        let mut diagnostics = Vec::<Diagnostic>::new();
        let mut records = Vec::new();
        while let Some(record) = parser.next_record(&mut diagnostics).unwrap() {
            records.push(record);
        }
        (records, diagnostics)
    }

    #[test]
    fn parses_event_fields() {
        let src = "\
BEGIN:VCALENDAR\r\n\
VERSION:1.0\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Team meeting\r\n\
LOCATION:Room 1\r\n\
DESCRIPTION:Weekly sync\r\n\
DTSTART:20250601T090000Z\r\n\
DTEND:20250601T100000Z\r\n\
RRULE:W1 #4\r\n\
AALARM:20250601T084500Z;;0;\r\n\
LAST-MODIFIED:20250501T120000Z\r\n\
X-EPOCAGENDAENTRYTYPE:APPOINTMENT\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let (records, diagnostics) = parse_all(src);
        assert!(diagnostics.is_empty());
        assert_eq!(
            records,
            vec![Record {
                kind: RecordKind::Event,
                summary: Some("Team meeting".to_string()),
                location: Some("Room 1".to_string()),
                description: Some("Weekly sync".to_string()),
                dtstart: Some("20250601T090000Z".to_string()),
                dtend: Some("20250601T100000Z".to_string()),
                rrule: Some("W1 #4".to_string()),
                alarm: Some("20250601T084500Z".to_string()),
                dtstamp: Some("20250501T120000Z".to_string()),
                ..Default::default()
            }]
        );
    }

    #[test]
    fn parses_task_fields() {
        let src = "\
BEGIN:VCALENDAR\n\
begin:vtodo\n\
summary:Buy milk\n\
DUE:20250602T170000\n\
STATUS:NEEDS ACTION\n\
SEQUENCE:2\n\
end:vtodo\n\
END:VCALENDAR\n";

        let (records, _) = parse_all(src);
        assert_eq!(records.len(), 1);
        let task = &records[0];
        assert_eq!(task.kind, RecordKind::Task);
        assert_eq!(task.summary.as_deref(), Some("Buy milk"));
        assert_eq!(task.due.as_deref(), Some("20250602T170000"));
        assert_eq!(task.status.as_deref(), Some("NEEDS ACTION"));
        assert_eq!(task.sequence.as_deref(), Some("2"));
    }

    #[test]
    fn assembles_multi_line_fields() {
        let src = "\
BEGIN:VEVENT\r\n\
DESCRIPTION:first\r\n  \
second\r\n\
SUMMARY;ENCODING=QUOTED-PRINTABLE:Caf=C3=\r\n\
=A9 =0D=0Aopen\r\n\
LOCATION;CHARSET=UTF-8;ENCODING=QUOTED-PRINTABLE:ignored\r\n\
DTSTART:20250601T090000\r\n\
END:VEVENT\r\n";

        let (records, _) = parse_all(src);
        let event = &records[0];
        assert_eq!(event.description.as_deref(), Some("first second"));
        assert_eq!(event.summary.as_deref(), Some("Café \\nopen"));
        assert_eq!(event.location, None);
        assert_eq!(event.dtstart.as_deref(), Some("20250601T090000"));
    }

    #[test]
    fn drops_alarm_without_metadata() {
        let src = "BEGIN:VEVENT\nAALARM:20250601T084500Z\nEND:VEVENT\n";
        let (records, _) = parse_all(src);
        assert_eq!(records[0].alarm, None);

        let src = "BEGIN:VEVENT\nAALARM;TYPE=X-EPOCSOUND:20250601T084500Z;;;z:\\x.wav\nEND:VEVENT\n";
        let (records, _) = parse_all(src);
        assert_eq!(records[0].alarm.as_deref(), Some("20250601T084500Z"));
    }

    #[test]
    fn reports_unrecognized_headers() {
        let src = "\
BEGIN:VCALENDAR\r\n\
PRODID:-//Psion//EPOC//EN\r\n\
TZ:+01\r\n\
\r\n\
END:VCALENDAR\r\n";

        let (records, diagnostics) = parse_all(src);
        assert!(records.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            &diagnostics[0],
            Diagnostic::UnrecognizedHeader { line, line_number: 3 } if line == "TZ:+01"
        ));
    }

    #[test]
    fn stops_at_end_of_calendar() {
        let src = "END:VCALENDAR\nBEGIN:VEVENT\nDTSTART:20250601T090000\nEND:VEVENT\n";
        let (records, _) = parse_all(src);
        assert!(records.is_empty());
    }

    #[test]
    fn keeps_record_cut_short_by_end_of_input() {
        let src = "BEGIN:VEVENT\nSUMMARY:Unfinished\nDTSTART:20250601T090000";
        let (records, _) = parse_all(src);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].summary.as_deref(), Some("Unfinished"));
        assert_eq!(records[0].dtstart.as_deref(), Some("20250601T090000"));
    }

    #[test]
    fn fails_on_truncated_quoted_printable() {
        let src = "BEGIN:VEVENT\nDESCRIPTION;ENCODING=QUOTED-PRINTABLE:abc=";
        let mut parser = RecordParser::new(src.as_bytes());
        let err = parser
            .next_record(&mut Vec::<Diagnostic>::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnexpectedEndOfInput {
                field: "DESCRIPTION"
            }
        ));
    }
}
