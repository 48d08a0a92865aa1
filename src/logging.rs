use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_PATH: &str = "/tmp/meish.log";
const LOG_FILTER_ENV: &str = "MEISH_LOG";
const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global tracing subscriber.
///
/// The terminal frontend owns the screen, so when stderr is a terminal logs
/// go to a file instead; piped stderr receives them directly.
pub fn init(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match resolve_log_path(config.log_path.as_deref(), std::io::stderr().is_terminal()) {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|error| anyhow!("failed to initialize logging: {error}"))
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|error| anyhow!("failed to initialize logging: {error}")),
    }
}

fn resolve_log_path(configured: Option<&Path>, stderr_is_terminal: bool) -> Option<PathBuf> {
    configured.map(Path::to_path_buf).or_else(|| {
        if stderr_is_terminal {
            Some(PathBuf::from(DEFAULT_LOG_PATH))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_log_path_wins() {
        let path = resolve_log_path(Some(Path::new("/tmp/custom.log")), false);
        assert_eq!(path, Some(PathBuf::from("/tmp/custom.log")));
    }

    #[test]
    fn test_terminal_stderr_defaults_to_file() {
        assert_eq!(
            resolve_log_path(None, true),
            Some(PathBuf::from(DEFAULT_LOG_PATH))
        );
        assert_eq!(resolve_log_path(None, false), None);
    }
}
