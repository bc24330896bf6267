// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! Log configuration.
//!
//! Defaults:
//! - backend: redb
//! - file_name: `seqlog.redb` inside `data_dir`
//! - cache_size_bytes: redb's own default

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// File created inside the data directory for the redb backend.
pub const DEFAULT_FILE_NAME: &str = "seqlog.redb";

/// Which store backs the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Persistent single-file redb database.
    #[default]
    Redb,
    /// Process-local ordered map; nothing survives the process.
    Memory,
}

/// Configuration for opening a [`crate::Log`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Directory holding the store. Created on open if missing.
    pub data_dir: PathBuf,
    /// Store file name inside `data_dir`.
    pub file_name: String,
    /// redb page cache size in bytes; `None` keeps redb's default.
    pub cache_size_bytes: Option<usize>,
    /// Backend selection.
    pub backend: BackendKind,
}

impl LogConfig {
    /// Defaults rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, LogError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| LogError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| LogError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Full path of the store file.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    /// Reject settings that cannot open a store.
    pub fn validate(&self) -> Result<(), LogError> {
        if self.backend == BackendKind::Redb {
            if self.data_dir.as_os_str().is_empty() {
                return Err(LogError::Config("data_dir must be set for the redb backend".into()));
            }
            if self.file_name.is_empty() || self.file_name.contains(['/', '\\']) {
                return Err(LogError::Config(format!(
                    "file_name {:?} must be a plain, non-empty file name",
                    self.file_name
                )));
            }
        }
        if self.cache_size_bytes == Some(0) {
            return Err(LogError::Config("cache_size_bytes must be positive".into()));
        }
        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            cache_size_bytes: None,
            backend: BackendKind::Redb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = LogConfig::new("/var/lib/seqlog");
        assert_eq!(config.file_name, DEFAULT_FILE_NAME);
        assert_eq!(config.backend, BackendKind::Redb);
        assert_eq!(config.cache_size_bytes, None);
        assert_eq!(config.store_path(), PathBuf::from("/var/lib/seqlog/seqlog.redb"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = LogConfig::from_json_str(r#"{"data_dir": "/tmp/logs"}"#).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/logs"));
        assert_eq!(config.file_name, DEFAULT_FILE_NAME);
    }

    #[test]
    fn test_from_json_memory_backend() {
        let config =
            LogConfig::from_json_str(r#"{"backend": "memory", "cache_size_bytes": 4096}"#).unwrap();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.cache_size_bytes, Some(4096));
    }

    #[test]
    fn test_validation_failures() {
        assert!(matches!(
            LogConfig::default().validate(),
            Err(LogError::Config(_))
        ));

        let mut config = LogConfig::new("/tmp/logs");
        config.file_name = "nested/file.redb".into();
        assert!(config.validate().is_err());

        let mut config = LogConfig::new("/tmp/logs");
        config.cache_size_bytes = Some(0);
        assert!(config.validate().is_err());

        assert!(LogConfig::from_json_str(r#"{"backend": "rocksdb"}"#).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seqlog.json");
        std::fs::write(&path, r#"{"data_dir": "/srv/log", "file_name": "events.redb"}"#).unwrap();

        let config = LogConfig::from_file(&path).unwrap();
        assert_eq!(config.store_path(), PathBuf::from("/srv/log/events.redb"));

        let missing = LogConfig::from_file(dir.path().join("absent.json"));
        assert!(matches!(missing, Err(LogError::Config(_))));
    }
}
