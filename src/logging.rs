//! Tracing configuration and log routing.
//!
//! The relay logs to stdout using a compact formatter and, unless disabled, to a file.
//! `RELAY_LOG_FILE` selects the file: a path appends there, `off` disables file logging, and
//! leaving it unset writes `logs/tigris-relay.log`. Tokens and client secrets never reach
//! either sink.
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "tigris-relay.log";

/// Where the file layer writes.
#[derive(Debug, PartialEq, Eq)]
enum FileTarget {
    Default,
    Path(String),
    Disabled,
}

impl FileTarget {
    fn from_setting(setting: Option<&str>) -> Self {
        match setting.map(str::trim) {
            None | Some("") => Self::Default,
            Some(value) if value.eq_ignore_ascii_case("off") => Self::Disabled,
            Some(value) => Self::Path(value.to_string()),
        }
    }
}

/// Configure tracing subscribers for stdout and optional file logging.
///
/// Respects `RUST_LOG` for filtering (defaults to `info`). The non-blocking file writer's
/// guard lives for the rest of the process.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    let setting = std::env::var("RELAY_LOG_FILE").ok();
    match configure_file_writer(FileTarget::from_setting(setting.as_deref())) {
        Some(writer) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
        }
        None => registry.init(),
    }
}

/// Build a non-blocking writer for file logging.
///
/// Returns `None` when file logging is disabled or the target cannot be opened.
fn configure_file_writer(target: FileTarget) -> Option<NonBlocking> {
    let (non_blocking, guard) = match target {
        FileTarget::Disabled => return None,
        FileTarget::Path(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|err| eprintln!("Failed to open log file {path}: {err}"))
                .ok()?;
            tracing_appender::non_blocking(file)
        }
        FileTarget::Default => {
            if let Err(err) = std::fs::create_dir_all(DEFAULT_LOG_DIR) {
                eprintln!("Failed to create {DEFAULT_LOG_DIR} directory: {err}");
                return None;
            }
            let appender = tracing_appender::rolling::never(DEFAULT_LOG_DIR, DEFAULT_LOG_FILE);
            tracing_appender::non_blocking(appender)
        }
    };
    let _ = LOG_GUARD.set(guard);
    Some(non_blocking)
}

#[cfg(test)]
mod tests {
    use super::FileTarget;

    #[test]
    fn file_target_follows_setting() {
        assert_eq!(FileTarget::from_setting(None), FileTarget::Default);
        assert_eq!(FileTarget::from_setting(Some("  ")), FileTarget::Default);
        assert_eq!(FileTarget::from_setting(Some("OFF")), FileTarget::Disabled);
        assert_eq!(
            FileTarget::from_setting(Some("/var/log/relay.log")),
            FileTarget::Path("/var/log/relay.log".into())
        );
    }
}
