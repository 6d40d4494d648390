//! Import row classification
//!
//! Positional row schema: `[track, id, name, gender, class]`. Extra trailing
//! fields are ignored.

use csv::StringRecord;
use ssm_common::{Student, StudentId, Track};
use thiserror::Error;

/// Number of leading fields every import row must carry
pub const ROW_FIELDS: usize = 5;

/// Per-row import fault. Logged and skipped, never returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowFault {
    /// The decoder could not produce a row
    #[error("undecodable row: {0}")]
    Decode(String),

    /// The leading discriminator names no known track
    #[error("unknown student type {0:?}")]
    UnknownTrack(String),

    #[error("invalid student id {0:?}")]
    InvalidId(String),

    #[error("expected {expected} fields, found {found}")]
    MissingFields { expected: usize, found: usize },
}

/// Build a student record from one decoded row
pub fn classify_row(fields: &StringRecord) -> Result<Student, RowFault> {
    if fields.len() < ROW_FIELDS {
        return Err(RowFault::MissingFields {
            expected: ROW_FIELDS,
            found: fields.len(),
        });
    }

    let track = Track::from_discriminator(&fields[0])
        .ok_or_else(|| RowFault::UnknownTrack(fields[0].to_string()))?;

    let id: StudentId = fields[1]
        .trim()
        .parse()
        .map_err(|_| RowFault::InvalidId(fields[1].to_string()))?;

    Ok(Student::new(id, &fields[2], &fields[3], &fields[4], track))
}
