// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ-Lite inspector.
//!
//! Loads each OBJ file given on the command line, builds its GPU mesh and
//! prints a short summary.
//!
//! ```text
//! obj-lite [--json] [--no-normals] <file.obj>...
//! ```
//!
//! `OBJ_LITE_FORMAT` and `OBJ_LITE_GENERATE_NORMALS` set the defaults for the
//! flags; `RUST_LOG` controls logging on stderr.

use std::process::ExitCode;

use anyhow::Context;
use obj_lite_geometry::MeshBuilder;

mod config;
mod summary;

use config::{Command, Config, OutputFormat};
use summary::{summarize, FileSummary};

const USAGE: &str = "\
Usage: obj-lite [OPTIONS] <FILE>...

Options:
  --json        Print summaries as JSON
  --text        Print summaries as text (default)
  --no-normals  Do not generate normals for vertices without them
  -h, --help    Print this help";

fn main() -> ExitCode {
    let mut config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(config.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let paths = match config.apply_args(&args) {
        Ok(Command::Help) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Ok(Command::Inspect(paths)) => paths,
        Err(err) => {
            eprintln!("error: {}\n\n{}", err, USAGE);
            return ExitCode::from(2);
        }
    };

    tracing::debug!(
        files = paths.len(),
        format = ?config.format,
        generate_normals = config.generate_normals,
        "Inspecting OBJ files"
    );

    let builder = MeshBuilder::new().generate_normals(config.generate_normals);
    let summaries: Vec<FileSummary> = paths.iter().map(|path| summarize(path, &builder)).collect();

    if let Err(err) = print_summaries(&summaries, config.format) {
        eprintln!("error: {:#}", err);
        return ExitCode::FAILURE;
    }

    if summaries.iter().all(FileSummary::is_ok) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_summaries(summaries: &[FileSummary], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for summary in summaries {
                println!("{}", summary);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(summaries)
                .context("failed to serialize summaries")?;
            println!("{}", json);
        }
    }
    Ok(())
}
