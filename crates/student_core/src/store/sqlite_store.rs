//! Persisted student store backed by SQLite.
//!
//! # Responsibility
//! - Map the `StudentStore` contract onto the `students` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every operation runs in exactly one transaction; writes start
//!   `IMMEDIATE` so the read-decide-write unit cannot interleave.
//! - Ids come from `AUTOINCREMENT` and are never reused.
//! - Read paths reject undecodable rows instead of masking them.

use super::{StoreError, StoreResult, StudentStore};
use crate::db::schema::{table_exists, STUDENTS_TABLE};
use crate::db::{open_db, open_db_in_memory};
use crate::model::student::{
    format_registered_at, parse_registered_at, registration_now, NewStudent, Student, StudentId,
    StudentUpdate,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const LOCK_NAME: &str = "sqlite_connection";

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    grade,
    section,
    contact,
    date_registered
FROM students";

/// SQLite-backed student store.
///
/// Owns its connection; concurrent callers are serialized on it.
pub struct SqliteStudentStore {
    conn: Mutex<Connection>,
}

impl SqliteStudentStore {
    /// Opens the database file at `path`, creating the schema when absent.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory database. Contents die with the store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps a connection that already holds the `students` table.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when the `students` table is absent.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::LockPoisoned(LOCK_NAME))
    }
}

impl StudentStore for SqliteStudentStore {
    fn insert(&self, input: &NewStudent) -> StoreResult<Student> {
        input.validate()?;

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let registered = registration_now();
        tx.execute(
            "INSERT INTO students (
                name,
                grade,
                section,
                contact,
                date_registered
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                input.name.as_str(),
                input.grade,
                input.section.as_str(),
                input.contact.as_str(),
                format_registered_at(&registered),
            ],
        )?;
        let id = id_from_db(tx.last_insert_rowid())?;
        tx.commit()?;

        Ok(Student::from_new(id, input, registered))
    }

    fn get(&self, id: StudentId) -> StoreResult<Student> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let student = load_student(&tx, id)?.ok_or(StoreError::NotFound(id))?;
        tx.commit()?;
        Ok(student)
    }

    fn update(&self, id: StudentId, update: &StudentUpdate) -> StoreResult<Student> {
        update.validate()?;

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut student = load_student(&tx, id)?.ok_or(StoreError::NotFound(id))?;
        student.apply(update);
        tx.execute(
            "UPDATE students
             SET
                name = ?1,
                grade = ?2,
                section = ?3,
                contact = ?4
             WHERE id = ?5;",
            params![
                student.name.as_str(),
                student.grade,
                student.section.as_str(),
                student.contact.as_str(),
                id_to_db(id)?,
            ],
        )?;
        tx.commit()?;

        Ok(student)
    }

    fn delete(&self, id: StudentId) -> StoreResult<()> {
        let db_id = i64::try_from(id).map_err(|_| StoreError::NotFound(id))?;

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute("DELETE FROM students WHERE id = ?1;", [db_id])?;
        tx.commit()?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<Student>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let students = {
            let mut stmt = tx.prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY id DESC;"))?;
            let mut rows = stmt.query([])?;
            let mut students = Vec::new();
            while let Some(row) = rows.next()? {
                students.push(parse_student_row(row)?);
            }
            students
        };
        tx.commit()?;
        Ok(students)
    }

    fn count(&self) -> StoreResult<u64> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let count: i64 = tx.query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))?;
        tx.commit()?;
        u64::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn load_student(tx: &Transaction<'_>, id: StudentId) -> StoreResult<Option<Student>> {
    let Ok(db_id) = i64::try_from(id) else {
        return Ok(None);
    };

    let mut stmt = tx.prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([db_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_student_row(row)?));
    }

    Ok(None)
}

fn parse_student_row(row: &Row<'_>) -> StoreResult<Student> {
    let id = id_from_db(row.get("id")?)?;

    let registered_text: String = row.get("date_registered")?;
    let date_registered = parse_registered_at(&registered_text).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid timestamp `{registered_text}` in students.date_registered"
        ))
    })?;

    let student = Student {
        id,
        name: row.get("name")?,
        grade: row.get("grade")?,
        section: row.get("section")?,
        contact: row.get("contact")?,
        date_registered,
    };
    student
        .validate()
        .map_err(|err| StoreError::InvalidData(format!("student {id}: {err}")))?;
    Ok(student)
}

fn id_to_db(id: StudentId) -> StoreResult<i64> {
    i64::try_from(id)
        .map_err(|_| StoreError::InvalidData(format!("student id `{id}` exceeds storage range")))
}

fn id_from_db(value: i64) -> StoreResult<StudentId> {
    StudentId::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid id value `{value}` in students.id")))
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    if !table_exists(conn, STUDENTS_TABLE)? {
        return Err(StoreError::MissingRequiredTable(STUDENTS_TABLE));
    }
    Ok(())
}
