//! Diagnostic logging setup.
//!
//! Diagnostics go through `tracing`. While the full-screen interface owns the
//! terminal they must not reach stderr, so the chat view logs to a file when
//! one is given and discards output otherwise.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Environment variable that overrides the verbosity-derived filter.
pub const LOG_ENV_VAR: &str = "COURSEBOT_LOG";

/// Where diagnostics end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    Discard,
}

impl<'a> LogTarget<'a> {
    /// Pick a target for a run. A log file always wins; otherwise the
    /// full-screen interface discards and line-oriented commands use stderr.
    pub fn select(log_file: Option<&'a Path>, full_screen: bool) -> Self {
        match (log_file, full_screen) {
            (Some(path), _) => LogTarget::File(path),
            (None, true) => LogTarget::Discard,
            (None, false) => LogTarget::Stderr,
        }
    }
}

pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init_tracing(verbosity: u8, target: LogTarget<'_>) -> Result<(), Box<dyn Error>> {
    let level = level_for_verbosity(verbosity);
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level));

    let writer = match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogTarget::Discard => BoxMakeWriter::new(std::io::sink),
    };
    let ansi = matches!(target, LogTarget::Stderr);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(ansi)
                .with_writer(writer),
        )
        .with(filter)
        .try_init()?;
    Ok(())
}
