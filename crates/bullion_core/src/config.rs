//! Core configuration loaded from JSON.
//!
//! # Invariants
//! - Every field has a default; `{}` is a valid configuration.
//! - `validate()` runs on every load path.

use crate::logging::{self, default_log_level, LoggingError};
use crate::reconcile::notification::LEGACY_ADMIN_ONLY_ID;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Runtime settings for the reconcile core.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling logs; `None` leaves logging off.
    pub log_dir: Option<PathBuf>,
    /// Notification ids hidden from every non-admin viewer.
    pub admin_only_ids: Vec<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            admin_only_ids: vec![LEGACY_ADMIN_ONLY_ID.to_string()],
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid(err) => write!(f, "invalid config value: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<LoggingError> for ConfigError {
    fn from(value: LoggingError) -> Self {
        Self::Invalid(value)
    }
}

impl CoreConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks level and directory without touching the file system.
    pub fn validate(&self) -> Result<(), ConfigError> {
        logging::normalize_level(&self.log_level)?;
        if let Some(dir) = &self.log_dir {
            logging::normalize_log_dir(dir)?;
        }
        Ok(())
    }

    /// Starts file logging when `log_dir` is set. Returns whether logging
    /// is active afterwards.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        match &self.log_dir {
            Some(dir) => {
                logging::init_logging(&self.log_level, dir)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use std::io::Write;

    #[test]
    fn empty_object_yields_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.admin_only_ids, vec!["1".to_string()]);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn admin_only_ids_can_be_retired() {
        let config = CoreConfig::from_json_str(r#"{"admin_only_ids": []}"#).unwrap();
        assert!(config.admin_only_ids.is_empty());
    }

    #[test]
    fn invalid_level_and_relative_dir_are_rejected() {
        let err = CoreConfig::from_json_str(r#"{"log_level": "loud"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = CoreConfig::from_json_str(r#"{"log_dir": "logs"}"#).unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn unknown_fields_are_parse_errors() {
        let err = CoreConfig::from_json_str(r#"{"sentinel": "1"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"log_level": "warn"}}"#).expect("write config");

        let config = CoreConfig::load(file.path()).unwrap();
        assert_eq!(config.log_level, "warn");

        let dir = tempfile::tempdir().expect("temp dir");
        let err = CoreConfig::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn init_logging_without_dir_is_a_no_op() {
        let config = CoreConfig::default();
        assert!(!config.init_logging().unwrap());
    }
}
