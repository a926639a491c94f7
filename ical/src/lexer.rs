// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Lexer for vCalendar 1.0 content lines.
//!
//! Only the leading tag of a line is lexed. Tags are matched ignoring ASCII
//! case, and the rest of the line is handed back untouched.

use std::fmt::{self, Display};

use logos::Logos;

/// Lex the tag at the start of `line`.
///
/// Returns the tag and the text following it, or `None` if the line does not
/// start with a known tag. Block markers such as `BEGIN:VEVENT` only match
/// when nothing follows them.
#[must_use]
pub fn lex_line(line: &str) -> Option<(Tag, &str)> {
    let mut lexer = Tag::lexer(line);
    match lexer.next() {
        Some(Ok(tag)) => {
            let rest = lexer.remainder();
            if tag.is_block_marker() && !rest.is_empty() {
                None
            } else {
                Some((tag, rest))
            }
        }
        _ => None,
    }
}

/// Known tag at the start of a vCalendar content line.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Logos)]
pub enum Tag {
    /// `BEGIN:VCALENDAR`
    #[token("BEGIN:VCALENDAR", ignore(case))]
    BeginCalendar,

    /// `END:VCALENDAR`
    #[token("END:VCALENDAR", ignore(case))]
    EndCalendar,

    /// `BEGIN:VEVENT`
    #[token("BEGIN:VEVENT", ignore(case))]
    BeginEvent,

    /// `END:VEVENT`
    #[token("END:VEVENT", ignore(case))]
    EndEvent,

    /// `BEGIN:VTODO`
    #[token("BEGIN:VTODO", ignore(case))]
    BeginTodo,

    /// `END:VTODO`
    #[token("END:VTODO", ignore(case))]
    EndTodo,

    /// `PRODID:`
    #[token("PRODID:", ignore(case))]
    ProductId,

    /// `VERSION:`
    #[token("VERSION:", ignore(case))]
    Version,

    /// `SUMMARY:`
    #[token("SUMMARY:", ignore(case))]
    Summary,

    /// `SUMMARY;ENCODING=QUOTED-PRINTABLE`
    #[token("SUMMARY;ENCODING=QUOTED-PRINTABLE", ignore(case))]
    SummaryQuotedPrintable,

    /// `LOCATION:`
    #[token("LOCATION:", ignore(case))]
    Location,

    /// `LOCATION;ENCODING=QUOTED-PRINTABLE`
    #[token("LOCATION;ENCODING=QUOTED-PRINTABLE", ignore(case))]
    LocationQuotedPrintable,

    /// `DESCRIPTION:`
    #[token("DESCRIPTION:", ignore(case))]
    Description,

    /// `DESCRIPTION;ENCODING=QUOTED-PRINTABLE`
    #[token("DESCRIPTION;ENCODING=QUOTED-PRINTABLE", ignore(case))]
    DescriptionQuotedPrintable,

    /// `DTSTART:`
    #[token("DTSTART:", ignore(case))]
    DtStart,

    /// `DTEND:`
    #[token("DTEND:", ignore(case))]
    DtEnd,

    /// `DUE:`
    #[token("DUE:", ignore(case))]
    Due,

    /// `STATUS:`
    #[token("STATUS:", ignore(case))]
    Status,

    /// `SEQUENCE:`
    #[token("SEQUENCE:", ignore(case))]
    Sequence,

    /// `RRULE:`
    #[token("RRULE:", ignore(case))]
    RRule,

    /// `AALARM:` or `AALARM;TYPE=X-EPOCSOUND:`
    #[token("AALARM:", ignore(case))]
    #[token("AALARM;TYPE=X-EPOCSOUND:", ignore(case))]
    AudioAlarm,

    /// `LAST-MODIFIED:`
    #[token("LAST-MODIFIED:", ignore(case))]
    LastModified,
}

impl Tag {
    /// Whether the tag must make up the whole line.
    #[must_use]
    pub const fn is_block_marker(self) -> bool {
        matches!(
            self,
            Self::BeginCalendar
                | Self::EndCalendar
                | Self::BeginEvent
                | Self::EndEvent
                | Self::BeginTodo
                | Self::EndTodo
        )
    }

    /// Whether the field value is quoted-printable encoded.
    #[must_use]
    pub const fn is_quoted_printable(self) -> bool {
        matches!(
            self,
            Self::SummaryQuotedPrintable
                | Self::LocationQuotedPrintable
                | Self::DescriptionQuotedPrintable
        )
    }

    /// The tag as written, without parameters or trailing colon.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BeginCalendar => "BEGIN:VCALENDAR",
            Self::EndCalendar => "END:VCALENDAR",
            Self::BeginEvent => "BEGIN:VEVENT",
            Self::EndEvent => "END:VEVENT",
            Self::BeginTodo => "BEGIN:VTODO",
            Self::EndTodo => "END:VTODO",
            Self::ProductId => "PRODID",
            Self::Version => "VERSION",
            Self::Summary | Self::SummaryQuotedPrintable => "SUMMARY",
            Self::Location | Self::LocationQuotedPrintable => "LOCATION",
            Self::Description | Self::DescriptionQuotedPrintable => "DESCRIPTION",
            Self::DtStart => "DTSTART",
            Self::DtEnd => "DTEND",
            Self::Due => "DUE",
            Self::Status => "STATUS",
            Self::Sequence => "SEQUENCE",
            Self::RRule => "RRULE",
            Self::AudioAlarm => "AALARM",
            Self::LastModified => "LAST-MODIFIED",
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::Tag::*;
    use super::*;

    #[test]
    fn lexes_field_tags_ignoring_case() {
        #[rustfmt::skip]
        let cases = [
            ("SUMMARY:Meeting",                          Summary,                    "Meeting"),
            ("summary:Meeting",                          Summary,                    "Meeting"),
            ("DtStart:20250101T090000",                  DtStart,                    "20250101T090000"),
            ("DTEND:",                                   DtEnd,                      ""),
            ("LAST-MODIFIED:20250101T090000Z",           LastModified,               "20250101T090000Z"),
            ("SUMMARY;ENCODING=QUOTED-PRINTABLE:Caf=C3", SummaryQuotedPrintable,     ":Caf=C3"),
            ("description;encoding=quoted-printable:x",  DescriptionQuotedPrintable, ":x"),
            ("AALARM:20250101T084500;;0;",               AudioAlarm,                 "20250101T084500;;0;"),
            ("AALARM;TYPE=X-EPOCSOUND:20250101T084500;", AudioAlarm,                 "20250101T084500;"),
        ];
        for (src, tag, rest) in cases {
            assert_eq!(lex_line(src), Some((tag, rest)), "Failed to lex: {src}");
        }
    }

    #[test]
    fn lexes_block_markers_only_as_whole_lines() {
        assert_eq!(lex_line("BEGIN:VEVENT"), Some((BeginEvent, "")));
        assert_eq!(lex_line("begin:vtodo"), Some((BeginTodo, "")));
        assert_eq!(lex_line("End:VCalendar"), Some((EndCalendar, "")));
        assert_eq!(lex_line("BEGIN:VEVENTS"), None);
        assert_eq!(lex_line("BEGIN:VALARM"), None);
    }

    #[test]
    fn rejects_unknown_tags() {
        for src in ["", "X-EPOCAGENDAENTRYTYPE:EVENT", "CATEGORIES:WORK", " SUMMARY:x"] {
            assert_eq!(lex_line(src), None, "Lex {src} should fail");
        }
    }

    #[test]
    fn flags_quoted_printable_tags() {
        assert!(SummaryQuotedPrintable.is_quoted_printable());
        assert!(!Summary.is_quoted_printable());
        assert_eq!(LocationQuotedPrintable.to_string(), "LOCATION");
    }
}
