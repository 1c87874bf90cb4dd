// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `roofsolid` - roof polygons in, solids and solar metrics out.
//!
//! Configuration comes from `ROOFSOLID_*` environment variables, overridden
//! by flags. Logs go to stderr and are filtered with `RUST_LOG`.

use anyhow::{Context, Result};
use clap::Parser;
use roofsolid_cli::cli::Cli;
use roofsolid_cli::config::{Config, LogFormat};
use roofsolid_cli::output::write_atomic;
use roofsolid_cli::types::ErrorResponse;
use serde::Serialize;
use std::io::{Read, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,roofsolid_geometry=debug,roofsolid_cli=debug"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn read_input(cli: &Cli) -> Result<String> {
    match cli.input_path() {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn emit<T: Serialize>(cli: &Cli, value: &T) -> Result<()> {
    let mut bytes = if cli.pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    bytes.push(b'\n');

    match &cli.output {
        Some(path) => write_atomic(path, &bytes),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::from_env().with_cli(&cli);

    init_logging(config.log_format);

    tracing::info!(
        snap_tolerance = config.pipeline.snap_tolerance,
        wall_thickness = config.pipeline.wall_thickness,
        candidate_budget = config.pipeline.rectangle.candidate_budget(),
        "Starting roofsolid"
    );

    let outcome = read_input(&cli)
        .and_then(|json| roofsolid_cli::execute(&json, &config.pipeline, cli.obj.as_deref()));

    match outcome {
        Ok(response) => match emit(&cli, &response) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "Failed to write response");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Request failed");
            if let Err(write_err) = emit(&cli, &ErrorResponse::from_error(&e)) {
                tracing::error!(error = %format!("{:#}", write_err), "Failed to write error response");
            }
            ExitCode::FAILURE
        }
    }
}
