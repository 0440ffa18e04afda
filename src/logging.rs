//! Global `tracing` subscriber setup.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Where log events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    /// Append to a file; used while the dashboard owns the terminal.
    File(&'a Path),
    Stderr,
}

/// Filter directive: `debug` when requested, else the configured level.
pub fn filter_directive(debug: bool, configured: &str) -> String {
    if debug {
        "debug".to_string()
    } else {
        configured.trim().to_string()
    }
}

/// Install the global subscriber. When one is already installed it is kept and the failure is
/// logged through it.
pub fn init(target: LogTarget<'_>, directive: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directive)
        .map_err(|e| eyre!("Invalid log level '{}': {}", directive, e))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match target {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
    };
    if let Err(e) = installed {
        tracing::debug!(error = %e, "keeping existing tracing subscriber");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_overrides_configured_level() {
        assert_eq!(filter_directive(true, "warn"), "debug");
        assert_eq!(filter_directive(false, " warn "), "warn");
    }

    #[test]
    fn second_init_keeps_first_subscriber() {
        assert!(init(LogTarget::Stderr, "warn").is_ok());
        assert!(init(LogTarget::Stderr, "info").is_ok());
    }

    #[test]
    fn invalid_directive_is_rejected() {
        assert!(init(LogTarget::Stderr, "cropscope=notalevel").is_err());
    }
}
