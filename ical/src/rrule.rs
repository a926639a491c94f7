// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Translation of vCalendar 1.0 recurrence rules to iCalendar `RRULE`.
//!
//! vCalendar packs a rule into whitespace-separated tokens, e.g. `D1 #10`
//! (daily, ten times) or `W2 TU TH 20251231T000000Z` (every other week until
//! the end of 2025). Only the frequency, the interval and the terminator are
//! carried over.

use std::fmt::{self, Display};

use chumsky::extra;
use chumsky::prelude::*;

use crate::date::{Timestamp, format_date, parse_date};
use crate::error::ConvertError;
use crate::keyword::{
    KW_RRULE, KW_RRULE_COUNT, KW_RRULE_FREQ, KW_RRULE_INTERVAL, KW_RRULE_UNTIL,
};

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Frequency {
    /// `D<n>`
    Daily,
    /// `W<n>`
    Weekly,
    /// `MD<n>`, monthly by day of month
    Monthly,
    /// `YM<n>`, yearly by month
    Yearly,
}

/// How a recurrence ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// Repeat until this instant.
    Until(Timestamp),
    /// Repeat this many times.
    Count(u32),
}

/// A recurrence rule. Without a terminator it repeats forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatRule {
    /// Recurrence frequency.
    pub frequency: Frequency,
    /// Units of `frequency` between occurrences.
    pub interval: u32,
    /// End of the recurrence, if any.
    pub terminator: Option<Terminator>,
}

impl RepeatRule {
    /// Parse a vCalendar recurrence rule.
    ///
    /// A trailing `#<n>` token is an occurrence count (`#0` repeats forever).
    /// A trailing token containing `T` is an end date, but only when
    /// `use_end_date` is set; otherwise it is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::MalformedRule`] if the frequency is unknown, the
    /// interval or count is not a number, or the end date is malformed.
    pub fn parse(rule: &str, use_end_date: bool) -> Result<Self, ConvertError> {
        let mut tokens = rule.split_whitespace();
        let Some(first) = tokens.next() else {
            return Err(ConvertError::malformed_rule(rule, "empty rule"));
        };
        let last = tokens.last().unwrap_or(first);

        let (frequency, interval) = frequency().parse(first).into_result().map_err(|errs| {
            let reason = errs
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            ConvertError::malformed_rule(rule, reason)
        })?;

        let terminator = if let Some(count) = last.strip_prefix('#') {
            let count = lexical::parse::<u32, _>(count).map_err(|e| {
                ConvertError::malformed_rule(rule, format!("invalid occurrence count: {e}"))
            })?;
            (count > 0).then_some(Terminator::Count(count))
        } else if use_end_date && last.contains('T') {
            let until = parse_date(last).map_err(|e| ConvertError::malformed_rule(rule, e))?;
            Some(Terminator::Until(until))
        } else {
            None
        };

        Ok(Self {
            frequency,
            interval,
            terminator,
        })
    }

    /// Render as an iCalendar content line, without the line terminator.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{KW_RRULE}:{self}")
    }
}

/// Formats the `RRULE` value, e.g. `FREQ=DAILY;INTERVAL=1;COUNT=10`.
impl Display for RepeatRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{KW_RRULE_FREQ}={}", self.frequency)?;
        if self.interval > 0 {
            write!(f, ";{KW_RRULE_INTERVAL}={}", self.interval)?;
        }
        match &self.terminator {
            Some(Terminator::Count(count)) => write!(f, ";{KW_RRULE_COUNT}={count}"),
            Some(Terminator::Until(until)) => {
                write!(f, ";{KW_RRULE_UNTIL}={}", format_date(until))
            }
            None => Ok(()),
        }
    }
}

/// ```txt
/// frequency = ("MD" / "YM" / "D" / "W") 1*DIGIT
/// ```
fn frequency<'src>() -> impl Parser<'src, &'src str, (Frequency, u32), extra::Err<Rich<'src, char>>>
{
    let kind = choice((
        just("MD").to(Frequency::Monthly),
        just("YM").to(Frequency::Yearly),
        just("D").to(Frequency::Daily),
        just("W").to(Frequency::Weekly),
    ));

    let interval = any()
        .filter(char::is_ascii_digit)
        .repeated()
        .at_least(1)
        .to_slice()
        .try_map(|s: &str, span| lexical::parse::<u32, _>(s).map_err(|e| Rich::custom(span, e)));

    kind.then(interval).then_ignore(end())
}
