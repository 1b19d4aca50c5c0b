//! Subscriber setup
//!
//! Everything below the CLI logs through `tracing` macros only; this is the
//! one place that decides where those events end up.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Number of `-v` flags
    pub verbose: u8,
    pub quiet: bool,
    pub log_file: Option<PathBuf>,
    pub no_color: bool,
}

impl LogOptions {
    pub fn level(&self) -> Level {
        if self.quiet {
            return Level::WARN;
        }
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

/// Install the global subscriber: colored console output on stderr, plus
/// plain lines appended to the log file when one is given. `RUST_LOG`
/// overrides the level picked from the flags.
pub fn init_logging(options: &LogOptions) -> io::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(options.level().into())
        .from_env_lossy();

    let console = fmt::layer()
        .with_target(false)
        .with_ansi(!options.no_color)
        .with_writer(io::stderr);

    let file = match &options.log_file {
        Some(path) => Some(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(open_append(path)?)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();
    Ok(())
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
