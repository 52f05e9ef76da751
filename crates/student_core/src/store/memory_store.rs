//! Volatile student store held in process memory.
//!
//! # Invariants
//! - Writers hold the write lock across read, decide and write.
//! - Ids are allocated under the write lock, so map order equals insert order.
//! - Contents are lost when the store is dropped.

use super::{IdAllocator, StoreError, StoreResult, StudentStore};
use crate::model::student::{registration_now, NewStudent, Student, StudentId, StudentUpdate};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

const LOCK_NAME: &str = "memory_students";

/// Process-memory backend.
#[derive(Debug, Default)]
pub struct MemoryStudentStore {
    records: RwLock<BTreeMap<StudentId, Student>>,
    ids: IdAllocator,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn with_ids(ids: IdAllocator) -> Self {
        Self {
            records: RwLock::default(),
            ids,
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<StudentId, Student>>> {
        self.records
            .read()
            .map_err(|_| StoreError::LockPoisoned(LOCK_NAME))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<StudentId, Student>>> {
        self.records
            .write()
            .map_err(|_| StoreError::LockPoisoned(LOCK_NAME))
    }
}

impl StudentStore for MemoryStudentStore {
    fn insert(&self, input: &NewStudent) -> StoreResult<Student> {
        input.validate()?;

        let mut records = self.write()?;
        let id = self.ids.next()?;
        let student = Student::from_new(id, input, registration_now());
        records.insert(id, student.clone());
        Ok(student)
    }

    fn get(&self, id: StudentId) -> StoreResult<Student> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn update(&self, id: StudentId, update: &StudentUpdate) -> StoreResult<Student> {
        update.validate()?;

        let mut records = self.write()?;
        let student = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        student.apply(update);
        Ok(student.clone())
    }

    fn delete(&self, id: StudentId) -> StoreResult<()> {
        match self.write()?.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn list(&self) -> StoreResult<Vec<Student>> {
        Ok(self.read()?.values().rev().cloned().collect())
    }

    fn count(&self) -> StoreResult<u64> {
        Ok(self.read()?.len() as u64)
    }
}
