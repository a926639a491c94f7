// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Non-fatal findings reported while converting.

use std::fmt::{self, Display};

use crate::error::ConvertError;

/// Something the converter skipped or dropped without failing.
#[derive(Debug)]
pub enum Diagnostic {
    /// A line outside any event or task that is not a known header.
    UnrecognizedHeader {
        /// The offending line.
        line: String,
        /// 1-based line number in the input.
        line_number: usize,
    },

    /// A recurrence rule that could not be translated; `RRULE` was omitted.
    DroppedRule {
        /// Why the rule was rejected.
        error: ConvertError,
    },

    /// An alarm whose time, or whose event start, could not be parsed;
    /// `VALARM` was omitted.
    DroppedAlarm {
        /// The raw alarm time.
        alarm: String,
        /// Why the alarm was rejected.
        error: ConvertError,
    },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedHeader { line, line_number } => {
                write!(f, "unknown header entry at line {line_number}: {line}")
            }
            Self::DroppedRule { error } => write!(f, "recurrence rule dropped: {error}"),
            Self::DroppedAlarm { alarm, error } => {
                write!(f, "alarm '{alarm}' dropped: {error}")
            }
        }
    }
}

/// Receiver for [`Diagnostic`]s raised during a conversion.
pub trait DiagnosticSink {
    /// Handle one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics for later inspection.
impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &mut T {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Logs every diagnostic as a `tracing` warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{diagnostic}");
    }
}
