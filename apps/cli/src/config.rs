// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration: environment variables first, command-line flags on top.

use std::path::PathBuf;
use std::str::FromStr;

/// How summaries are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Output format (`OBJ_LITE_FORMAT`).
    pub format: OutputFormat,
    /// Compute normals for vertices without them (`OBJ_LITE_GENERATE_NORMALS`).
    pub generate_normals: bool,
    /// Tracing filter directive (`RUST_LOG`).
    pub log_filter: String,
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Inspect(Vec<PathBuf>),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            format: var("OBJ_LITE_FORMAT")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            generate_normals: var("OBJ_LITE_GENERATE_NORMALS")
                .map(|v| !matches!(v.trim(), "0" | "false" | "off" | "no"))
                .unwrap_or(true),
            log_filter: var("RUST_LOG").unwrap_or_else(|| "info".into()),
        }
    }

    /// Apply command-line flags; everything that is not a flag is a path.
    pub fn apply_args(&mut self, args: &[String]) -> Result<Command, String> {
        let mut paths = Vec::new();

        for arg in args {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Command::Help),
                "--json" => self.format = OutputFormat::Json,
                "--text" => self.format = OutputFormat::Text,
                "--no-normals" => self.generate_normals = false,
                flag if flag.starts_with('-') && flag != "-" => {
                    return Err(format!("unknown option '{}'", flag));
                }
                path => paths.push(PathBuf::from(path)),
            }
        }

        if paths.is_empty() {
            return Err("no input files".to_string());
        }

        Ok(Command::Inspect(paths))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
