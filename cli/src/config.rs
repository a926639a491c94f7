// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, fs, path::PathBuf, str::FromStr};

use crate::cli::APP_NAME;

const VCS2ICS_CONFIG_ENV: &str = "VCS2ICS_CONFIG";

/// Load the configuration.
///
/// An explicit `path` wins over the `VCS2ICS_CONFIG` environment variable, and
/// both must point to a readable file. Without either, the default location is
/// used if a file exists there; otherwise every setting keeps its default.
#[tracing::instrument]
pub fn parse_config(path: Option<PathBuf>) -> Result<Config, Box<dyn Error>> {
    let path = if let Some(path) = path {
        path
    } else if let Ok(env_path) = std::env::var(VCS2ICS_CONFIG_ENV) {
        PathBuf::from(env_path)
    } else {
        let Some(config) = get_config_dir().map(|a| a.join(APP_NAME).join("config.toml")) else {
            tracing::debug!("user config directory not found, using defaults");
            return Ok(Config::default());
        };
        if !config.exists() {
            tracing::debug!(path = %config.display(), "no config found, using defaults");
            return Ok(Config::default());
        }
        config
    };

    fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read config file at {}: {}", path.display(), e))?
        .parse()
}

/// Configuration for the converter. Command-line flags take precedence.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Organizer email address.
    pub email: Option<String>,

    /// Keep recurrence end dates as `UNTIL`.
    pub use_end_date: bool,

    /// Fold output lines longer than this many octets.
    pub fold_lines: Option<usize>,

    /// Directory to write `.ics` files into instead of standard output.
    pub output_dir: Option<PathBuf>,
}

impl FromStr for Config {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(unix)]
fn get_config_dir() -> Option<PathBuf> {
    xdg::BaseDirectories::new().get_config_home()
}

#[cfg(not(unix))]
fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir()
}
