//! Core of the student registry.
//! This crate is the single source of truth for student record invariants.

pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use config::{open_repository, open_store, Backend, ConfigError, RegistryConfig};
pub use export::{decode_students, encode_students, ExportError, EXPORT_FILE_NAME};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::student::{
    NewStudent, Student, StudentField, StudentId, StudentUpdate, StudentValidationError,
    REGISTERED_AT_FORMAT,
};
pub use repo::student_repo::{RepoError, RepoResult, StudentRepository};
pub use store::{
    ErrorClass, IdAllocator, MemoryStudentStore, SqliteStudentStore, StoreError, StoreResult,
    StudentStore,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
