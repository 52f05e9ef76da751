//! Startup configuration: backend selection and logging settings.
//!
//! # Responsibility
//! - Describe which store backend a process uses.
//! - Load that description from TOML with sensible defaults.
//! - Build the single repository instance a process shares.
//!
//! # Invariants
//! - A missing `[backend]` table selects the volatile backend.
//! - The persisted backend always names a database path.

use crate::logging::default_log_level;
use crate::repo::student_repo::StudentRepository;
use crate::store::{MemoryStudentStore, SqliteStudentStore, StoreResult, StudentStore};
use log::info;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Storage backend selected at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    /// Process memory only; lost on restart.
    #[default]
    Memory,
    /// SQLite database file; survives restart.
    Sqlite { path: PathBuf },
}

/// Process-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub backend: Backend,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logs.
    pub log_dir: Option<PathBuf>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl RegistryConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Backend::Sqlite { path } = &self.backend {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(
                    "backend.path cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Opens the store described by `backend`.
///
/// The persisted backend creates its schema on first use.
pub fn open_store(backend: &Backend) -> StoreResult<Box<dyn StudentStore>> {
    match backend {
        Backend::Memory => {
            info!("event=store_open module=config status=ok backend=memory");
            Ok(Box::new(MemoryStudentStore::new()))
        }
        Backend::Sqlite { path } => {
            let store = SqliteStudentStore::open(path)?;
            info!(
                "event=store_open module=config status=ok backend=sqlite path={}",
                path.display()
            );
            Ok(Box::new(store))
        }
    }
}

/// Builds the repository for `config`.
pub fn open_repository(config: &RegistryConfig) -> StoreResult<StudentRepository> {
    Ok(StudentRepository::new(open_store(&config.backend)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_memory_backend() {
        let config = RegistryConfig::from_toml_str("").unwrap();
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn sqlite_backend_is_parsed() {
        let config = RegistryConfig::from_toml_str(
            r#"
log_level = "warn"

[backend]
kind = "sqlite"
path = "/var/lib/students.sqlite3"
"#,
        )
        .unwrap();
        assert_eq!(
            config.backend,
            Backend::Sqlite {
                path: PathBuf::from("/var/lib/students.sqlite3")
            }
        );
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn sqlite_backend_requires_path() {
        let err = RegistryConfig::from_toml_str("[backend]\nkind = \"sqlite\"\npath = \"\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = RegistryConfig::from_toml_str("[backend]\nkind = \"sqlite\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn open_repository_with_defaults_is_empty() {
        let repo = open_repository(&RegistryConfig::default()).unwrap();
        assert_eq!(repo.count_students().unwrap(), 0);
    }
}
