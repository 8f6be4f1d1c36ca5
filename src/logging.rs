//! Logging configuration for the csql binary.
//!
//! The REPL logs to a file so log lines do not interleave with engine
//! replies on the terminal; one-shot commands log to stderr, which keeps
//! stdout clean for piping rows or JSON.

use crate::cli::Command;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Where log lines go for a given run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Truncated file under the state directory.
    File,
    /// Compact lines on stderr.
    Stderr,
}

impl LogTarget {
    /// The REPL owns the terminal; everything else can share stderr.
    pub fn for_command(command: &Command) -> Self {
        match command {
            Command::Repl => Self::File,
            _ => Self::Stderr,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber for `target`.
///
/// If the log file cannot be created, the REPL runs without logging.
pub fn init(target: LogTarget) {
    match target {
        LogTarget::File => {
            let log_path = get_log_path();
            match open_log_file(&log_path) {
                Ok(file) => tracing_subscriber::fmt()
                    .with_env_filter(env_filter())
                    .with_writer(file)
                    .with_ansi(false)
                    .init(),
                Err(e) => eprintln!("Warning: Could not open {}: {e}", log_path.display()),
            }
        }
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init(),
    }
}

// Truncated on each run.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// `csql/csql.log` under the state directory, else the config directory,
/// else the temp directory.
pub fn get_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::config_dir)
        .map(|dir| dir.join("csql").join("csql.log"))
        .unwrap_or_else(|| std::env::temp_dir().join("csql.log"))
}
