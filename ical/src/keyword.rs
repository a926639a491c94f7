// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Keywords written to iCalendar (RFC 5545) output.

pub const KW_BEGIN: &str = "BEGIN";
pub const KW_END: &str = "END";

pub const KW_VCALENDAR: &str = "VCALENDAR";
pub const KW_VEVENT: &str = "VEVENT";
pub const KW_VTODO: &str = "VTODO";
pub const KW_VALARM: &str = "VALARM";

// Section 3.2 - Property Parameters
pub const KW_VALUE: &str = "VALUE";

// Section 3.3 - Property Value Data Types
pub const KW_DATE: &str = "DATE";

// Section 3.3.10 - Recurrence Rule
pub const KW_RRULE_FREQ: &str = "FREQ";
pub const KW_RRULE_INTERVAL: &str = "INTERVAL";
pub const KW_RRULE_COUNT: &str = "COUNT";
pub const KW_RRULE_UNTIL: &str = "UNTIL";

// Section 3.7 - Calendar Properties
pub const KW_PRODID: &str = "PRODID";
pub const KW_VERSION: &str = "VERSION";
pub const KW_VERSION_2_0: &str = "2.0";

// Section 3.8.1 - Descriptive Component Properties
pub const KW_DESCRIPTION: &str = "DESCRIPTION";
pub const KW_LOCATION: &str = "LOCATION";
pub const KW_STATUS: &str = "STATUS";
pub const KW_SUMMARY: &str = "SUMMARY";

// Section 3.8.2 - Date and Time Component Properties
pub const KW_DTSTART: &str = "DTSTART";
pub const KW_DTEND: &str = "DTEND";
pub const KW_DUE: &str = "DUE";

// Section 3.8.4 - Relationship Component Properties
pub const KW_ORGANIZER: &str = "ORGANIZER";

// Section 3.8.5 - Recurrence Component Properties
pub const KW_RRULE: &str = "RRULE";

// Section 3.8.6 - Alarm Component Properties
pub const KW_ACTION: &str = "ACTION";
pub const KW_ACTION_DISPLAY: &str = "DISPLAY";
pub const KW_TRIGGER: &str = "TRIGGER";

// Section 3.8.7 - Change Management Component Properties
pub const KW_DTSTAMP: &str = "DTSTAMP";
pub const KW_SEQUENCE: &str = "SEQUENCE";
