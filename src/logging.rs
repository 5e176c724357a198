//! Logging and tracing initialization for cinderdash.
//!
//! This module provides structured logging using the `tracing` ecosystem.
//! It supports both pretty output and JSON output for machine parsing, written
//! to stderr, a file, or nowhere (the terminal UI owns the screen).

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Where log lines go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogTarget {
    #[default]
    Stderr,
    /// Append to this file
    File(PathBuf),
    Discard,
}

/// Configuration for the logging system.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Output logs as JSON (for machine parsing)
    pub json: bool,
    /// Enable verbose logging (sets default level to DEBUG)
    pub verbose: bool,
    pub target: LogTarget,
}

impl LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub fn default_directive(&self) -> String {
        let level = if self.verbose { Level::DEBUG } else { Level::INFO };
        format!("cinderdash={}", level.as_str().to_lowercase())
    }
}

fn make_writer(target: &LogTarget) -> io::Result<(BoxMakeWriter, bool)> {
    Ok(match target {
        LogTarget::Stderr => (BoxMakeWriter::new(io::stderr), true),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        LogTarget::Discard => (BoxMakeWriter::new(io::sink), false),
    })
}

/// Initialize the tracing subscriber with the given configuration.
///
/// Call once, early in main, after config is loaded. The log level can be
/// overridden at runtime via the `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```ignore
/// // Verbose pretty output on stderr
/// cinderdash::logging::init(LogConfig { verbose: true, ..Default::default() })?;
///
/// // JSON lines into a file while the TUI runs
/// cinderdash::logging::init(LogConfig {
///     json: true,
///     target: LogTarget::File("cinderdash.log".into()),
///     ..Default::default()
/// })?;
/// ```
pub fn init(config: LogConfig) -> io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));
    let (writer, ansi) = make_writer(&config.target)?;

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(ansi)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .init();
    }
    Ok(())
}
