//! File logging for terminal applications.
//!
//! A TUI owns the terminal it would otherwise log to, so diagnostics go to a
//! file. [`init_file_logging`] installs a global `tracing` subscriber that
//! writes there; the level comes from `RUST_LOG` and defaults to `debug`.

use crate::runtime::ProgramError;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "debug";

/// Open a log file in append mode, creating it if needed.
///
/// Useful for ad-hoc `writeln!` debugging next to the `tracing` output.
pub fn log_to_file(path: impl AsRef<Path>) -> Result<std::fs::File, std::io::Error> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}

/// Route `tracing` events to the file at `path`.
///
/// Fails if the file cannot be opened or a global subscriber is already set.
pub fn init_file_logging(path: impl AsRef<Path>) -> Result<(), ProgramError> {
    let file = log_to_file(path.as_ref())?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| ProgramError::Logging(err.to_string()))?;

    tracing::info!(path = %path.as_ref().display(), "file logging enabled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn log_to_file_appends() {
        let path = std::env::temp_dir().join(format!("pinbox-log-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);

        writeln!(log_to_file(&path).unwrap(), "first").unwrap();
        writeln!(log_to_file(&path).unwrap(), "second").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
        let _ = std::fs::remove_file(&path);
    }
}
