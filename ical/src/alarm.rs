// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Translation of vCalendar `AALARM` times into iCalendar `VALARM` blocks.
//!
//! vCalendar stores the absolute time an alarm fires, iCalendar a trigger
//! duration relative to the event start.

use std::fmt::{self, Display};

use crate::date::Timestamp;
use crate::keyword::{
    KW_ACTION, KW_ACTION_DISPLAY, KW_BEGIN, KW_DESCRIPTION, KW_END, KW_TRIGGER, KW_VALARM,
};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// An alarm relative to the start of its event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alarm {
    /// Seconds from the event start to the alarm, negative if before.
    pub offset_seconds: i64,
}

impl Alarm {
    /// Build an alarm from the event start and the time the alarm fires.
    #[must_use]
    pub fn from_times(start: &Timestamp, alarm_time: &Timestamp) -> Self {
        Self {
            offset_seconds: start.seconds_until(alarm_time),
        }
    }

    /// The trigger duration.
    #[must_use]
    pub const fn duration(&self) -> TriggerDuration {
        TriggerDuration::from_seconds(self.offset_seconds)
    }

    /// Render a display alarm block.
    ///
    /// Lines are CRLF separated; the caller terminates the final `END:VALARM`.
    #[must_use]
    pub fn render(&self, description: &str) -> String {
        [
            format!("{KW_BEGIN}:{KW_VALARM}"),
            format!("{KW_ACTION}:{KW_ACTION_DISPLAY}"),
            format!("{KW_DESCRIPTION}:{description}"),
            format!("{KW_TRIGGER}:{}", self.duration()),
            format!("{KW_END}:{KW_VALARM}"),
        ]
        .join("\r\n")
    }
}

/// Duration value as defined in RFC 5545 Section 3.3.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDuration {
    /// Date and Time Duration
    DateTime {
        /// Whether the duration is positive
        positive: bool,
        /// Day Duration
        day: u64,
        /// Hour Duration
        hour: u64,
        /// Minute Duration
        minute: u64,
        /// Second Duration
        second: u64,
    },

    /// Week Duration
    Week {
        /// Whether the duration is positive
        positive: bool,
        /// Week Duration
        week: u64,
    },
}

impl TriggerDuration {
    /// Split a signed number of seconds, preferring whole weeks.
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        let positive = seconds >= 0;
        let magnitude = seconds.unsigned_abs();

        if magnitude % WEEK == 0 {
            return Self::Week {
                positive,
                week: magnitude / WEEK,
            };
        }

        Self::DateTime {
            positive,
            day: magnitude / DAY,
            hour: magnitude % DAY / HOUR,
            minute: magnitude % HOUR / MINUTE,
            second: magnitude % MINUTE,
        }
    }
}

/// Formats as `[-]P<n>W` or `[-]P[<d>D][T[<h>H][<m>M][<s>S]]`.
impl Display for TriggerDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Week { positive, .. } | Self::DateTime { positive, .. } if !positive => {
                write!(f, "-")?;
            }
            _ => { /* positive, no sign */ }
        }
        write!(f, "P")?;

        match self {
            Self::Week { week, .. } => write!(f, "{week}W"),
            Self::DateTime {
                day,
                hour,
                minute,
                second,
                ..
            } => {
                // Only include components that are non-zero
                if *day > 0 {
                    write!(f, "{day}D")?;
                }
                if *hour > 0 || *minute > 0 || *second > 0 {
                    write!(f, "T")?;
                }
                if *hour > 0 {
                    write!(f, "{hour}H")?;
                }
                if *minute > 0 {
                    write!(f, "{minute}M")?;
                }
                if *second > 0 {
                    write!(f, "{second}S")?;
                }
                Ok(())
            }
        }
    }
}
