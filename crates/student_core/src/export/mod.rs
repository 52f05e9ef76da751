//! Deterministic export of the full student record set.
//!
//! # Responsibility
//! - Encode records as a pretty-printed JSON array with fixed key order.
//! - Decode an export back into records.
//!
//! # Invariants
//! - Output depends only on the input slice (order preserved, no timestamps
//!   or metadata added).
//! - `decode_students(encode_students(x)) == x`.

use crate::model::student::Student;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Suggested download file name for an export.
pub const EXPORT_FILE_NAME: &str = "students.json";

#[derive(Debug)]
pub enum ExportError {
    Json(serde_json::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "student export encoding failed: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Encodes `students` in the given order as an indented JSON array.
pub fn encode_students(students: &[Student]) -> Result<Vec<u8>, ExportError> {
    let mut bytes = serde_json::to_vec_pretty(students)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decodes bytes produced by `encode_students`.
pub fn decode_students(bytes: &[u8]) -> Result<Vec<Student>, ExportError> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::student::parse_registered_at;

    fn student(id: u64, name: &str) -> Student {
        Student {
            id,
            name: name.to_string(),
            grade: 5,
            section: "B".to_string(),
            contact: "555-0100".to_string(),
            date_registered: parse_registered_at("2025-03-01 08:30:15").unwrap(),
        }
    }

    #[test]
    fn empty_set_encodes_as_empty_array() {
        assert_eq!(encode_students(&[]).unwrap(), b"[]\n");
    }

    #[test]
    fn encoding_has_fixed_layout() {
        let bytes = encode_students(&[student(1, "Ana")]).unwrap();
        let expected = r#"[
  {
    "id": 1,
    "name": "Ana",
    "grade": 5,
    "section": "B",
    "contact": "555-0100",
    "date_registered": "2025-03-01 08:30:15"
  }
]
"#;
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn decode_restores_records_in_order() {
        let records = vec![student(2, "Leo"), student(1, "Ana")];
        let decoded = decode_students(&encode_students(&records).unwrap()).unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn decode_rejects_malformed_timestamp() {
        let bytes = br#"[{"id":1,"name":"Ana","grade":5,"section":"B","contact":"1","date_registered":"2025-03-01T08:30:15Z"}]"#;
        assert!(matches!(decode_students(bytes), Err(ExportError::Json(_))));
    }
}
