// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Date-time values shared by vCalendar 1.0 and iCalendar 2.0.
//!
//! Both formats write a date-time as `YYYYMMDDTHHMMSS`, optionally followed by
//! `Z` to mark UTC. Anything else is a floating local time. No time zone
//! conversion is ever performed between the two.

use std::str::FromStr;

use chumsky::extra;
use chumsky::prelude::*;
use jiff::civil;
use jiff::tz::TimeZone;

use crate::error::ConvertError;

/// A parsed date-time together with its UTC marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    datetime: civil::DateTime,
    utc: bool,
}

impl Timestamp {
    /// A UTC timestamp (`...Z`).
    #[must_use]
    pub const fn utc(datetime: civil::DateTime) -> Self {
        Self {
            datetime,
            utc: true,
        }
    }

    /// A floating local timestamp.
    #[must_use]
    pub const fn local(datetime: civil::DateTime) -> Self {
        Self {
            datetime,
            utc: false,
        }
    }

    /// The current instant, in UTC.
    #[must_use]
    pub fn now() -> Self {
        Self::utc(jiff::Timestamp::now().to_zoned(TimeZone::UTC).datetime())
    }

    /// Whether the source carried the `Z` suffix.
    #[must_use]
    pub const fn is_utc(&self) -> bool {
        self.utc
    }

    /// The wall-clock fields.
    #[must_use]
    pub const fn civil_date_time(&self) -> civil::DateTime {
        self.datetime
    }

    /// Whether the wall clock reads 00:00, ignoring seconds.
    #[must_use]
    pub fn is_midnight(&self) -> bool {
        self.datetime.hour() == 0 && self.datetime.minute() == 0
    }

    /// Whole seconds from `self` to `later`, negative if `later` is earlier.
    ///
    /// The UTC marker is ignored, both values are compared by wall clock.
    #[must_use]
    pub fn seconds_until(&self, later: &Self) -> i64 {
        later.datetime.duration_since(self.datetime).as_secs()
    }
}

impl FromStr for Timestamp {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_date(s)
    }
}

/// Parse `YYYYMMDDTHHMMSSZ` (UTC) or `YYYYMMDDTHHMMSS` (floating).
///
/// # Errors
///
/// Returns [`ConvertError::MalformedDate`] if the text matches neither layout
/// or names an impossible date or time, such as month 13.
pub fn parse_date(s: &str) -> Result<Timestamp, ConvertError> {
    timestamp().parse(s).into_result().map_err(|errs| {
        let reason = errs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        ConvertError::malformed_date(s, reason)
    })
}

/// Render as `YYYYMMDDTHHMMSSZ`.
///
/// Floating timestamps are written as if their wall clock were UTC.
#[must_use]
pub fn format_date(timestamp: &Timestamp) -> String {
    let dt = timestamp.datetime;
    format!(
        "{}T{:02}{:02}{:02}Z",
        format_day_only(timestamp),
        dt.hour(),
        dt.minute(),
        dt.second()
    )
}

/// Render only the date part as `YYYYMMDD`.
#[must_use]
pub fn format_day_only(timestamp: &Timestamp) -> String {
    let dt = timestamp.datetime;
    format!("{:04}{:02}{:02}", dt.year(), dt.month(), dt.day())
}

/// ```txt
/// timestamp = 4DIGIT 2DIGIT 2DIGIT "T" 2DIGIT 2DIGIT 2DIGIT ["Z"]
/// ```
fn timestamp<'src>() -> impl Parser<'src, &'src str, Timestamp, extra::Err<Rich<'src, char>>> {
    let date = digits(4).then(digits(2)).then(digits(2));
    let time = digits(2).then(digits(2)).then(digits(2));

    date.then_ignore(just('T'))
        .then(time)
        .then(just('Z').or_not())
        .then_ignore(end())
        .try_map(|((((year, month), day), ((hour, minute), second)), zulu), span| {
            #[expect(clippy::cast_possible_truncation)]
            let datetime = civil::DateTime::new(
                year,
                month as i8,
                day as i8,
                hour as i8,
                minute as i8,
                second as i8,
                0,
            )
            .map_err(|e| Rich::custom(span, e))?;

            Ok(match zulu {
                Some(_) => Timestamp::utc(datetime),
                None => Timestamp::local(datetime),
            })
        })
}

fn digits<'src>(n: usize) -> impl Parser<'src, &'src str, i16, extra::Err<Rich<'src, char>>> + Clone
{
    any()
        .filter(char::is_ascii_digit)
        .repeated()
        .exactly(n)
        .to_slice()
        .try_map(|s: &str, span| lexical::parse::<i16, _>(s).map_err(|e| Rich::custom(span, e)))
}
