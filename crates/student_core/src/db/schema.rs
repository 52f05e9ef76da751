//! Student table definition and presence checks.

use rusqlite::Connection;

pub const STUDENTS_TABLE: &str = "students";

const STUDENTS_SCHEMA_SQL: &str = include_str!("students.sql");

/// Creates the `students` table if it does not exist yet.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(STUDENTS_SCHEMA_SQL)
}

/// Returns whether a table named `name` exists.
pub fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [name],
        |row| row.get(0),
    )
}
