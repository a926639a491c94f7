// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, io, path::PathBuf, process::ExitCode};

use clap::{ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser};
use colored::Colorize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cmd_convert::CmdConvert;
use crate::config::parse_config;

pub const APP_NAME: &str = "vcs2ics";

/// Long options that are also accepted with a single dash.
const LEGACY_FLAGS: &[&str] = &["email", "merge"];

/// Run the vcs2ics command-line interface.
pub fn run() -> ExitCode {
    let cli = match Cli::parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.verbose);
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// Show debug logs
    pub verbose: bool,

    /// The conversion to perform
    pub command: CmdConvert,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        CmdConvert::command(APP_NAME)
            .about("Convert vCalendar (.vcs) events and tasks to iCalendar (.ics).")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .arg(
                arg!(-c --config <CONFIG> "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $XDG_CONFIG_HOME/vcs2ics/config.toml on Linux and \
MacOS, %APPDATA%/vcs2ics/config.toml on Windows.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
            .arg(arg!(-v --verbose "Show debug logs"))
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, clap::Error> {
        Self::try_parse_from(std::env::args_os())
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(normalize_legacy_flags(args))?;
        Ok(Self::from(&matches))
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            config: matches.get_one("config").cloned(),
            verbose: matches.get_flag("verbose"),
            command: CmdConvert::from(matches),
        }
    }

    /// Run the command
    pub fn run(self) -> Result<(), Box<dyn Error>> {
        tracing::debug!("parsing configuration...");
        let config = parse_config(self.config)?;
        self.command.run(&config)
    }
}

/// Rewrite `-email` and `-merge` (and `-email=<value>`) to their double-dash
/// form. Arguments after `--` are left alone.
fn normalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut escaped = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if escaped {
                return arg;
            }
            let Some(s) = arg.to_str() else {
                return arg;
            };
            if s == "--" {
                escaped = true;
                return arg;
            }

            let is_legacy = s.strip_prefix('-').is_some_and(|name| {
                let name = name.split_once('=').map_or(name, |(name, _)| name);
                LEGACY_FLAGS.contains(&name)
            });
            if is_legacy { format!("-{s}").into() } else { arg }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let cli = Cli::try_parse_from(vec!["test", "-c", "/tmp/config.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.toml")));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_double_dash_flags() {
        let cli = Cli::try_parse_from(vec!["test", "-v", "--email", "a@b.com", "--merge"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.command.email.as_deref(), Some("a@b.com"));
        assert!(cli.command.merge);
    }

    #[test]
    fn test_parse_legacy_single_dash_flags() {
        let cli = Cli::try_parse_from(vec![
            "test", "-email", "a@b.com", "-merge", "-o", "out", "x.vcs",
        ])
        .unwrap();
        assert_eq!(cli.command.email.as_deref(), Some("a@b.com"));
        assert!(cli.command.merge);
        assert_eq!(cli.command.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.command.files, vec![PathBuf::from("x.vcs")]);

        let cli = Cli::try_parse_from(vec!["test", "-email=c@d.com"]).unwrap();
        assert_eq!(cli.command.email.as_deref(), Some("c@d.com"));
    }

    #[test]
    fn test_normalize_stops_at_double_dash() {
        let args = normalize_legacy_flags(["test", "-merge", "--", "-email"]);
        let expected: Vec<OsString> = ["test", "--merge", "--", "-email"]
            .into_iter()
            .map(OsString::from)
            .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn test_parse_rejects_unknown_flag() {
        let err = Cli::try_parse_from(vec!["test", "--bogus"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_help_is_not_an_error() {
        let err = Cli::try_parse_from(vec!["test", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
