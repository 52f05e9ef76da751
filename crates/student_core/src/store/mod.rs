//! Record store contract and backends.
//!
//! # Responsibility
//! - Define the raw storage capability (`StudentStore`) the repository is
//!   written against.
//! - Provide a volatile in-process backend and a persisted SQLite backend
//!   that satisfy the contract identically.
//!
//! # Invariants
//! - Ids are unique per store instance and never reused after delete.
//! - `list` is ordered by id descending and re-read on every call.
//! - `count` is derived from the same state as `list`.
//! - Writes reject blank required fields even when the caller validated.

use crate::db::DbError;
use crate::model::student::{NewStudent, Student, StudentId, StudentUpdate, StudentValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod id_alloc;
pub mod memory_store;
pub mod sqlite_store;

pub use id_alloc::IdAllocator;
pub use memory_store::MemoryStudentStore;
pub use sqlite_store::SqliteStudentStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Coarse failure class shared by store and repository errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller supplied missing or empty input.
    Validation,
    /// Caller targeted an id with no record.
    NotFound,
    /// Backend could not complete the operation.
    StorageFault,
}

/// Store-level error.
#[derive(Debug)]
pub enum StoreError {
    Validation(StudentValidationError),
    NotFound(StudentId),
    /// Opening or bootstrapping the database failed.
    Db(DbError),
    /// A statement or transaction failed on an open connection.
    Sqlite(rusqlite::Error),
    /// Persisted state that cannot be decoded into a `Student`.
    InvalidData(String),
    /// A writer panicked while holding the named lock.
    LockPoisoned(&'static str),
    /// Connection is missing the table this store requires.
    MissingRequiredTable(&'static str),
    /// The id space is used up; no further records can be created.
    IdsExhausted,
}

impl StoreError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) => ErrorClass::Validation,
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::Db(_)
            | Self::Sqlite(_)
            | Self::InvalidData(_)
            | Self::LockPoisoned(_)
            | Self::MissingRequiredTable(_)
            | Self::IdsExhausted => ErrorClass::StorageFault,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
            Self::LockPoisoned(name) => write!(f, "store lock poisoned: {name}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table: {table}"),
            Self::IdsExhausted => write!(f, "student id space exhausted"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StudentValidationError> for StoreError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Raw record storage shared by all backends.
///
/// Implementations must be safe to call from many threads at once.
pub trait StudentStore: Send + Sync {
    /// Allocates an id, stamps the registration time and stores the record.
    fn insert(&self, input: &NewStudent) -> StoreResult<Student>;
    fn get(&self, id: StudentId) -> StoreResult<Student>;
    /// Applies only the provided fields and returns the stored result.
    fn update(&self, id: StudentId, update: &StudentUpdate) -> StoreResult<Student>;
    /// Removes the record, or reports `NotFound` when nothing was there.
    fn delete(&self, id: StudentId) -> StoreResult<()>;
    /// All records, newest id first.
    fn list(&self) -> StoreResult<Vec<Student>>;
    fn count(&self) -> StoreResult<u64>;
}

impl<S: StudentStore + ?Sized> StudentStore for Box<S> {
    fn insert(&self, input: &NewStudent) -> StoreResult<Student> {
        (**self).insert(input)
    }

    fn get(&self, id: StudentId) -> StoreResult<Student> {
        (**self).get(id)
    }

    fn update(&self, id: StudentId, update: &StudentUpdate) -> StoreResult<Student> {
        (**self).update(id, update)
    }

    fn delete(&self, id: StudentId) -> StoreResult<()> {
        (**self).delete(id)
    }

    fn list(&self) -> StoreResult<Vec<Student>> {
        (**self).list()
    }

    fn count(&self) -> StoreResult<u64> {
        (**self).count()
    }
}

impl<S: StudentStore + ?Sized> StudentStore for Arc<S> {
    fn insert(&self, input: &NewStudent) -> StoreResult<Student> {
        (**self).insert(input)
    }

    fn get(&self, id: StudentId) -> StoreResult<Student> {
        (**self).get(id)
    }

    fn update(&self, id: StudentId, update: &StudentUpdate) -> StoreResult<Student> {
        (**self).update(id, update)
    }

    fn delete(&self, id: StudentId) -> StoreResult<()> {
        (**self).delete(id)
    }

    fn list(&self) -> StoreResult<Vec<Student>> {
        (**self).list()
    }

    fn count(&self) -> StoreResult<u64> {
        (**self).count()
    }
}
