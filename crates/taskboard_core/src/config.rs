//! Runtime configuration for board binaries.
//!
//! Values come from explicit arguments first, then from the environment.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TASKBOARD_DB";
pub const LOG_LEVEL_ENV: &str = "TASKBOARD_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TASKBOARD_LOG_DIR";

/// Logger settings consumed by `logging::init_logging`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
}

/// Full configuration of one board process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub db_path: PathBuf,
    /// `None` disables file logging.
    pub logging: Option<LoggingConfig>,
}

impl BoardConfig {
    /// Builds config from an explicit database path, falling back to env.
    ///
    /// # Errors
    /// Returns a readable message when no database path is available.
    pub fn from_args_or_env(db_path: Option<String>) -> Result<Self, String> {
        Self::resolve(db_path, |key| std::env::var(key).ok())
    }

    fn resolve(
        db_path: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let db_path = db_path
            .or_else(|| lookup(DB_PATH_ENV))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                format!("database path missing; pass it as first argument or set {DB_PATH_ENV}")
            })?;

        let logging = lookup(LOG_DIR_ENV)
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty())
            .map(|dir| LoggingConfig {
                level: lookup(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
                log_dir: PathBuf::from(dir),
            });

        Ok(Self {
            db_path: PathBuf::from(db_path),
            logging,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn resolve(db_path: Option<&str>, pairs: &[(&str, &str)]) -> Result<BoardConfig, String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        BoardConfig::resolve(db_path.map(str::to_string), |key| vars.get(key).cloned())
    }

    #[test]
    fn explicit_path_wins_over_env() {
        let pairs = [(DB_PATH_ENV, "/tmp/env.db")];
        let config = resolve(Some("/tmp/arg.db"), &pairs).expect("config should resolve");
        assert_eq!(config.db_path, PathBuf::from("/tmp/arg.db"));
        assert!(config.logging.is_none());
    }

    #[test]
    fn logging_is_enabled_by_log_dir_with_default_level() {
        let pairs = [(DB_PATH_ENV, "/tmp/env.db"), (LOG_DIR_ENV, "/tmp/logs")];
        let config = resolve(None, &pairs).expect("config should resolve");
        let logging = config.logging.expect("log dir enables logging");
        assert_eq!(logging.level, default_log_level());
        assert_eq!(logging.log_dir, PathBuf::from("/tmp/logs"));

        let pairs = [
            (DB_PATH_ENV, "/tmp/env.db"),
            (LOG_DIR_ENV, "/tmp/logs"),
            (LOG_LEVEL_ENV, "warn"),
        ];
        let config = resolve(None, &pairs).expect("config should resolve");
        assert_eq!(config.logging.expect("logging").level, "warn");
    }

    #[test]
    fn missing_db_path_is_rejected() {
        let error = resolve(Some("  "), &[]).expect_err("blank path must be rejected");
        assert!(error.contains(DB_PATH_ENV));
    }
}
