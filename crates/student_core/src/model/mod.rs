//! Domain model for student records.
//!
//! # Responsibility
//! - Define the canonical `Student` record and its explicit create/update inputs.
//! - Own field-level validation shared by every storage backend.
//!
//! # Invariants
//! - Every record is identified by a `StudentId` assigned once and never reused.
//! - `id` and `date_registered` never change after creation.

pub mod student;
