//! Repository layer: the validated façade over interchangeable stores.
//!
//! # Responsibility
//! - Expose use-case level CRUD and export operations.
//! - Keep transport layers decoupled from storage details.
//!
//! # Invariants
//! - Inputs are validated before any store call.
//! - Repository APIs return semantic errors (`Validation`, `NotFound`) apart
//!   from storage faults.

pub mod student_repo;
