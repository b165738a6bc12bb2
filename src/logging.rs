//! Subscriber construction. The result is attached to the run future by the
//! caller rather than installed as the process-wide default.

use std::sync::Mutex;

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;
use crate::core::AlertError;

/// Maps the configured level name onto a filter directive.
///
/// Accepts the usual `DEBUG`/`INFO`/`WARNING`/`ERROR`/`CRITICAL` spellings;
/// unknown names fall back to `info`.
#[must_use]
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" | "critical" | "fatal" => "error",
        _ => "info",
    }
}

/// Builds the dispatcher for one run. `RUST_LOG` takes precedence over the
/// configured level.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
///
/// The file sink rolls over to `<file>.1`, `<file>.2`, ... once it reaches
/// `file_max_bytes`, keeping `file_backup_count` old files. Lines are
/// buffered and flushed when the dispatcher is dropped.
pub fn subscriber(cfg: &LogConfig) -> Result<Dispatch, AlertError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(&cfg.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let dispatch = if cfg.to_file {
        let appender = BasicRollingFileAppender::new(
            &cfg.file_path,
            RollingConditionBasic::new().max_size(cfg.file_max_bytes),
            cfg.file_backup_count,
        )?;
        Dispatch::new(
            builder
                .with_writer(Mutex::new(appender))
                .with_ansi(false)
                .finish(),
        )
    } else {
        Dispatch::new(builder.with_writer(std::io::stderr).finish())
    };
    Ok(dispatch)
}
