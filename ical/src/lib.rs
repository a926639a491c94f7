// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Convert vCalendar 1.0 (`.vcs`) documents into iCalendar 2.0 (`.ics`).
//!
//! Events and tasks are read record by record and re-emitted as `VEVENT`
//! and `VTODO` blocks. Quoted-printable text is decoded, recurrence rules and
//! alarms are translated, and everything else is dropped.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(clippy::single_match_else, clippy::match_bool)]

pub mod alarm;
mod convert;
pub mod date;
mod diagnostic;
mod error;
pub mod formatter;
pub mod keyword;
pub mod lexer;
mod parser;
pub mod quoted_printable;
pub mod reader;
pub mod rrule;
mod writer;

pub use crate::alarm::{Alarm, TriggerDuration};
pub use crate::convert::{ConvertOptions, convert};
pub use crate::date::{Timestamp, format_date, format_day_only, parse_date};
pub use crate::diagnostic::{Diagnostic, DiagnosticSink, TracingSink};
pub use crate::error::ConvertError;
pub use crate::parser::{Record, RecordKind, RecordParser};
pub use crate::rrule::{Frequency, RepeatRule, Terminator};
pub use crate::writer::IcsWriter;
