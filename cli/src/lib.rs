// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line shell around [`vcs2ics_ical`].

mod cli;
mod cmd_convert;
mod config;

pub use crate::cli::{APP_NAME, Cli, run};
pub use crate::cmd_convert::CmdConvert;
pub use crate::config::{Config, parse_config};
