//! Student domain model.
//!
//! # Responsibility
//! - Define the stored `Student` record and its wire shape.
//! - Define explicit inputs for create (`NewStudent`) and partial update
//!   (`StudentUpdate`).
//! - Validate required text fields before they reach a store.
//!
//! # Invariants
//! - `name`, `section` and `contact` are never blank.
//! - `date_registered` carries whole seconds and no timezone.
//! - Applying a `StudentUpdate` never touches `id` or `date_registered`.

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifier assigned by a store on insert.
pub type StudentId = u64;

/// Fixed text format for `date_registered` on the wire and in SQLite.
pub const REGISTERED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Canonical stored student record.
///
/// Field order is the export order; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub grade: i64,
    pub section: String,
    pub contact: String,
    #[serde(with = "registered_at")]
    pub date_registered: NaiveDateTime,
}

impl Student {
    /// Builds a record from validated input with a store-assigned id.
    pub(crate) fn from_new(id: StudentId, input: &NewStudent, registered: NaiveDateTime) -> Self {
        Self {
            id,
            name: input.name.clone(),
            grade: input.grade,
            section: input.section.clone(),
            contact: input.contact.clone(),
            date_registered: registered,
        }
    }

    /// Overwrites only the fields present in `update`.
    pub fn apply(&mut self, update: &StudentUpdate) {
        if let Some(name) = update.name.as_ref() {
            self.name = name.clone();
        }
        if let Some(grade) = update.grade {
            self.grade = grade;
        }
        if let Some(section) = update.section.as_ref() {
            self.section = section.clone();
        }
        if let Some(contact) = update.contact.as_ref() {
            self.contact = contact.clone();
        }
    }

    /// Case-insensitive substring match on `name`.
    ///
    /// Used by callers that filter a listing for display; an empty query
    /// matches every record.
    pub fn matches_name(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }

    /// Re-checks required text fields of an already built record.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        require_all_text(&self.name, &self.section, &self.contact)
    }
}

/// Create input. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub grade: i64,
    pub section: String,
    pub contact: String,
}

impl NewStudent {
    pub fn new(
        name: impl Into<String>,
        grade: i64,
        section: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            grade,
            section: section.into(),
            contact: contact.into(),
        }
    }

    /// Rejects blank required text fields.
    ///
    /// Fields are checked in declaration order and the first failure wins.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        require_all_text(&self.name, &self.section, &self.contact)
    }
}

/// Partial update input.
///
/// `None` keeps the stored value. `Some(..)` overwrites it, and a provided
/// blank text value is rejected by `validate` rather than silently kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl StudentUpdate {
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = Some(value.into());
        self
    }

    pub fn grade(mut self, value: i64) -> Self {
        self.grade = Some(value);
        self
    }

    pub fn section(mut self, value: impl Into<String>) -> Self {
        self.section = Some(value.into());
        self
    }

    pub fn contact(mut self, value: impl Into<String>) -> Self {
        self.contact = Some(value.into());
        self
    }

    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if let Some(name) = self.name.as_deref() {
            require_text(StudentField::Name, name)?;
        }
        if let Some(section) = self.section.as_deref() {
            require_text(StudentField::Section, section)?;
        }
        if let Some(contact) = self.contact.as_deref() {
            require_text(StudentField::Contact, contact)?;
        }
        Ok(())
    }
}

/// Required text field of a student record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentField {
    Name,
    Section,
    Contact,
}

impl StudentField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Section => "section",
            Self::Contact => "contact",
        }
    }
}

/// Input rejected before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentValidationError {
    /// Required text field is blank after trim.
    EmptyField(StudentField),
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "missing or empty field: {}", field.as_str()),
        }
    }
}

impl Error for StudentValidationError {}

/// Current local wall-clock time truncated to whole seconds.
pub fn registration_now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

/// Formats a registration timestamp with `REGISTERED_AT_FORMAT`.
pub fn format_registered_at(value: &NaiveDateTime) -> String {
    value.format(REGISTERED_AT_FORMAT).to_string()
}

/// Parses a registration timestamp written with `REGISTERED_AT_FORMAT`.
pub fn parse_registered_at(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, REGISTERED_AT_FORMAT)
}

fn require_all_text(
    name: &str,
    section: &str,
    contact: &str,
) -> Result<(), StudentValidationError> {
    require_text(StudentField::Name, name)?;
    require_text(StudentField::Section, section)?;
    require_text(StudentField::Contact, contact)
}

fn require_text(field: StudentField, value: &str) -> Result<(), StudentValidationError> {
    if value.trim().is_empty() {
        return Err(StudentValidationError::EmptyField(field));
    }
    Ok(())
}

mod registered_at {
    use super::{format_registered_at, parse_registered_at};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_registered_at(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse_registered_at(&text).map_err(serde::de::Error::custom)
    }
}
