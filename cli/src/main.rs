// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! vcs2ics - Convert vCalendar (.vcs) events and tasks to iCalendar (.ics)

use std::process::ExitCode;

fn main() -> ExitCode {
    vcs2ics_cli::run()
}
