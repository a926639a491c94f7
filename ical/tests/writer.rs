// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the iCalendar writer lifecycle.

use std::io::Write;

use vcs2ics_ical::{
    ConvertError, ConvertOptions, Diagnostic, IcsWriter, Record, RecordKind, RecordParser,
};

fn task(summary: &str) -> Record {
    Record {
        summary: Some(summary.to_string()),
        dtstamp: Some("20250101T000000Z".to_string()),
        ..Record::new(RecordKind::Task)
    }
}

#[test]
fn test_header_written_once() {
    let options = ConvertOptions::default().organizer("a@b.com");
    let mut writer = IcsWriter::new(Vec::new(), &options);
    let mut diagnostics = Vec::<Diagnostic>::new();

    writer.write_header().unwrap();
    writer.add_record(&task("one"), &mut diagnostics).unwrap();
    writer.add_record(&task("two"), &mut diagnostics).unwrap();
    writer.close().unwrap();

    let ics = String::from_utf8(writer.into_inner()).unwrap();
    assert_eq!(ics.matches("BEGIN:VCALENDAR").count(), 1);
    assert_eq!(ics.matches("BEGIN:VTODO").count(), 2);
    assert!(ics.find("SUMMARY:one").unwrap() < ics.find("SUMMARY:two").unwrap());
    assert!(ics.ends_with("END:VTODO\r\nEND:VCALENDAR"));
}

#[test]
fn test_close_on_empty_writer() {
    let mut writer = IcsWriter::new(Vec::new(), &ConvertOptions::default());
    writer.close().unwrap();
    assert_eq!(
        writer.into_inner(),
        b"BEGIN:VCALENDAR\r\nPRODID:\r\nVERSION:2.0\r\nEND:VCALENDAR"
    );
}

#[test]
fn test_writes_after_close_fail() {
    let mut writer = IcsWriter::new(Vec::new(), &ConvertOptions::default());
    writer.close().unwrap();

    let err = writer
        .add_record(&task("late"), &mut Vec::<Diagnostic>::new())
        .unwrap_err();
    assert!(matches!(err, ConvertError::WriterClosed));
    assert_eq!(err.to_string(), "writer is closed");

    let err = writer.write_all(b"late").unwrap_err();
    assert_eq!(err.to_string(), "writer is closed");
    assert!(!String::from_utf8(writer.into_inner()).unwrap().contains("late"));
}

#[test]
fn test_parser_feeds_writer() {
    let input = "BEGIN:VCALENDAR\r\n\
BEGIN:VTODO\r\n\
SUMMARY:first\r\n\
END:VTODO\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:second\r\n\
DTSTART:20250601T090000\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:after the end\r\n\
END:VEVENT\r\n";

    let mut diagnostics = Vec::<Diagnostic>::new();
    let mut parser = RecordParser::new(input.as_bytes());
    let mut writer = IcsWriter::new(Vec::new(), &ConvertOptions::default());
    while let Some(record) = parser.next_record(&mut diagnostics).unwrap() {
        writer.add_record(&record, &mut diagnostics).unwrap();
    }
    writer.close().unwrap();

    let ics = String::from_utf8(writer.into_inner()).unwrap();
    assert!(ics.contains("SUMMARY:first\r\n"));
    assert!(ics.contains("SUMMARY:second\r\n"));
    assert!(!ics.contains("after the end"));
    assert!(diagnostics.is_empty());
}
