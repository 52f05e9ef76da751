//! Student repository: the validated CRUD façade over a record store.
//!
//! # Responsibility
//! - Provide the only entry points transport layers should call.
//! - Validate explicit inputs before delegating to the store.
//! - Produce exports over the current record set.
//!
//! # Invariants
//! - Repository APIs never bypass store validation or transactions.
//! - The repository is backend-agnostic; it holds no record state itself.
//! - Failures stay distinguishable: validation, not found, storage fault.

use crate::export::{encode_students, ExportError};
use crate::model::student::{NewStudent, Student, StudentId, StudentUpdate, StudentValidationError};
use crate::store::{ErrorClass, StoreError, StudentStore};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository-level error.
#[derive(Debug)]
pub enum RepoError {
    /// Missing or empty required input.
    Validation(StudentValidationError),
    /// Target id has no record.
    NotFound(StudentId),
    /// Backend failure. Not retried here.
    Storage(StoreError),
    Export(ExportError),
}

impl RepoError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) => ErrorClass::Validation,
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::Storage(_) | Self::Export(_) => ErrorClass::StorageFault,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::Storage(err) => write!(f, "storage fault: {err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Storage(err) => Some(err),
            Self::Export(err) => Some(err),
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

impl From<ExportError> for RepoError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// Validated CRUD façade over one `StudentStore`.
///
/// Construct once per process and share it (e.g. behind an `Arc`); every
/// method takes `&self` and is safe to call concurrently.
pub struct StudentRepository<S: StudentStore = Box<dyn StudentStore>> {
    store: S,
}

impl<S: StudentStore> StudentRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validates and stores a new student.
    ///
    /// Returns the stored record including its id and registration time.
    pub fn add_student(&self, input: &NewStudent) -> RepoResult<Student> {
        if let Err(err) = input.validate() {
            warn!(
                "event=student_create module=repo status=rejected error_code=validation error={}",
                err
            );
            return Err(err.into());
        }

        let created = self.store.insert(input).inspect_err(|err| {
            log_failure("student_create", None, err);
        })?;
        info!(
            "event=student_create module=repo status=ok id={}",
            created.id
        );
        Ok(created)
    }

    /// All students, newest id first.
    pub fn list_students(&self) -> RepoResult<Vec<Student>> {
        let students = self.store.list()?;
        debug!(
            "event=student_list module=repo status=ok count={}",
            students.len()
        );
        Ok(students)
    }

    pub fn get_student(&self, id: StudentId) -> RepoResult<Student> {
        Ok(self.store.get(id)?)
    }

    /// Applies a partial update; absent fields keep their stored value.
    pub fn update_student(&self, id: StudentId, update: &StudentUpdate) -> RepoResult<Student> {
        if let Err(err) = update.validate() {
            warn!(
                "event=student_update module=repo status=rejected id={} error_code=validation error={}",
                id, err
            );
            return Err(err.into());
        }

        let updated = self.store.update(id, update).inspect_err(|err| {
            log_failure("student_update", Some(id), err);
        })?;
        info!("event=student_update module=repo status=ok id={id}");
        Ok(updated)
    }

    pub fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        self.store.delete(id).inspect_err(|err| {
            log_failure("student_delete", Some(id), err);
        })?;
        info!("event=student_delete module=repo status=ok id={id}");
        Ok(())
    }

    pub fn count_students(&self) -> RepoResult<u64> {
        Ok(self.store.count()?)
    }

    /// Encodes the current full record set, in list order.
    pub fn export_students(&self) -> RepoResult<Vec<u8>> {
        let students = self.store.list()?;
        let bytes = encode_students(&students)?;
        info!(
            "event=student_export module=repo status=ok count={} bytes={}",
            students.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

fn log_failure(event: &str, id: Option<StudentId>, err: &StoreError) {
    let id = id.map_or_else(|| "-".to_string(), |id| id.to_string());
    match err.class() {
        ErrorClass::StorageFault => error!(
            "event={event} module=repo status=error id={id} error_code=storage_fault error={err}"
        ),
        ErrorClass::NotFound => {
            warn!("event={event} module=repo status=rejected id={id} error_code=not_found")
        }
        ErrorClass::Validation => warn!(
            "event={event} module=repo status=rejected id={id} error_code=validation error={err}"
        ),
    }
}
