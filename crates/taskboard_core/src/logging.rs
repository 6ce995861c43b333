//! Process-wide rolling file logging.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend at most once per process.
//! - Capture panics as sanitized single-line events.
//!
//! # Invariants
//! - Repeating init with an identical config is a no-op.
//! - Init with a different config after start is rejected, never applied.
//! - Init never panics.

use crate::config::LoggingConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "taskboard";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: &'static str,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn matches(&self, level: &str, log_dir: &Path) -> Result<(), String> {
        if self.log_dir.as_path() != log_dir {
            return Err(format!(
                "logging already writes to `{}`; refusing `{}`",
                self.log_dir.display(),
                log_dir.display()
            ));
        }
        if self.level != level {
            return Err(format!(
                "logging already runs at `{}`; refusing `{}`",
                self.level, level
            ));
        }
        Ok(())
    }
}

/// Starts rolling file logging for the process.
///
/// # Errors
/// - Unknown level, or a relative/empty log directory.
/// - Log directory cannot be created or the backend fails to start.
/// - Logging is already active with a different config.
pub fn init_logging(config: &LoggingConfig) -> Result<(), String> {
    let level = parse_level(&config.level)?;
    let log_dir = checked_log_dir(&config.log_dir)?;

    if let Some(active) = ACTIVE.get() {
        return active.matches(level, &log_dir);
    }

    let active = ACTIVE.get_or_try_init(|| start_backend(level, &log_dir))?;
    active.matches(level, &log_dir)
}

/// Active `(level, log_dir)`, or `None` before `init_logging` succeeds.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.level, active.log_dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_backend(level: &'static str, log_dir: &Path) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(log_dir)
        .map_err(|err| format!("cannot create log directory `{}`: {err}", log_dir.display()))?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook();
    info!(
        "event=logging_start module=core status=ok level={} log_dir={} version={}",
        level,
        log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    })
}

fn parse_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn checked_log_dir(log_dir: &Path) -> Result<PathBuf, String> {
    if log_dir.as_os_str().is_empty() {
        return Err("log directory cannot be empty".to_string());
    }
    if !log_dir.is_absolute() {
        return Err(format!(
            "log directory must be absolute, got `{}`",
            log_dir.display()
        ));
    }
    Ok(log_dir.to_path_buf())
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = panic_info.payload().downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            single_line(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous(panic_info);
    }));
}

/// Flattens line breaks and caps length at `max_chars`.
fn single_line(value: &str, max_chars: usize) -> String {
    let flat = value.replace(['\n', '\r'], " ");
    let mut capped: String = flat.chars().take(max_chars).collect();
    if flat.chars().count() > max_chars {
        capped.push_str("...");
    }
    capped
}
