//! Common error types for the student score manager

use thiserror::Error;

use crate::model::StudentId;

/// Common result type for store and configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the store, configuration and server
#[derive(Error, Debug)]
pub enum Error {
    /// No record exists at the given identifier
    #[error("student with id {0} not found")]
    StudentNotFound(StudentId),

    /// The student exists but has no score for the course
    #[error("score for course {course} not found for student with id {id}")]
    ScoreNotFound { id: StudentId, course: String },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for either not-found kind (student or score)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::StudentNotFound(_) | Error::ScoreNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_messages() {
        assert_eq!(
            Error::StudentNotFound(3).to_string(),
            "student with id 3 not found"
        );
        let err = Error::ScoreNotFound {
            id: 1,
            course: "math".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "score for course math not found for student with id 1"
        );
        assert!(err.is_not_found());
        assert!(!Error::Config("bad".to_string()).is_not_found());
    }
}
