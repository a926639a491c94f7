// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::io;

/// Errors that can occur while converting a vCalendar document.
///
/// Only some of these abort a conversion: a malformed recurrence rule or alarm
/// time is dropped by the emitter and reported through the
/// [`DiagnosticSink`](crate::DiagnosticSink) instead.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A timestamp is neither `YYYYMMDDTHHMMSS` nor `YYYYMMDDTHHMMSSZ`, or
    /// names an impossible calendar date.
    #[error("malformed date '{value}': {reason}")]
    MalformedDate {
        /// The offending input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A vCalendar recurrence rule could not be interpreted.
    #[error("malformed recurrence rule '{rule}': {reason}")]
    MalformedRule {
        /// The offending rule.
        rule: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The input ended while a quoted-printable field still expected a
    /// continuation line.
    #[error("unexpected end of input while reading multi-line field {field}")]
    UnexpectedEndOfInput {
        /// Name of the field being assembled.
        field: &'static str,
    },

    /// An event has no `DTSTART`.
    #[error("no start date specified")]
    MissingStartDate,

    /// The writer was used after it had been closed.
    #[error("writer is closed")]
    WriterClosed,

    /// Reading the input or writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConvertError {
    pub(crate) fn malformed_date(value: &str, reason: impl ToString) -> Self {
        Self::MalformedDate {
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed_rule(rule: &str, reason: impl ToString) -> Self {
        Self::MalformedRule {
            rule: rule.to_string(),
            reason: reason.to_string(),
        }
    }
}
