//! Logging configuration for cypher-cells.
//!
//! Logs go to stderr by default so they never mix with cell output on
//! stdout. With `--log-file` they are written to a file instead.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes logging to the given file.
///
/// Runs share the default path, so each run appends a start line instead of
/// truncating. If the file cannot be opened a warning is printed and logging
/// stays disabled.
pub fn init_file_logging(log_path: &Path) {
    let log_file = match open_log_file(log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {}: {e}", log_path.display());
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    tracing::info!("cypher {} started (pid {})", env!("CARGO_PKG_VERSION"), std::process::id());
}

/// Opens the log file for appending, creating it and its directory.
fn open_log_file(log_path: &Path) -> io::Result<File> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(log_path)
}

/// Initializes logging to stderr.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the default path for the log file.
///
/// Uses the XDG state directory on Linux (`~/.local/state/cypher-cells/`),
/// falling back to the config directory and then the temp directory.
pub fn get_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("cypher-cells").join("cypher.log");
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("cypher-cells").join("cypher.log");
    }

    std::env::temp_dir().join("cypher.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_log_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cypher.log");

        writeln!(open_log_file(&path).unwrap(), "first run").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second run").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first run\nsecond run\n");
    }

    #[test]
    fn test_log_path_ends_with_cypher_log() {
        let path = get_log_path();
        assert!(path.ends_with("cypher.log"));
    }
}
