//! SQLite connection bootstrap for the persisted student store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Create the `students` table when it is absent.
//!
//! # Invariants
//! - Bootstrap is safe to repeat on every process start.
//! - Existing tables and rows are never altered by bootstrap.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while producing a ready connection.
#[derive(Debug)]
pub enum DbError {
    /// SQLite refused to open the database (`mode` is `file` or `memory`).
    Open {
        mode: &'static str,
        source: rusqlite::Error,
    },
    /// Connection opened but the schema could not be created.
    Schema(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { mode, source } => write!(f, "failed to open {mode} database: {source}"),
            Self::Schema(err) => write!(f, "failed to create student schema: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Schema(err) => Some(err),
        }
    }
}
