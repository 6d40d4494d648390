//! # SSM Common Library
//!
//! Shared code for the student score manager:
//! - Student record model and partial-update payloads
//! - The keyed student store (single exclusive lock)
//! - Error taxonomy
//! - Bootstrap configuration loading

pub mod config;
pub mod error;
pub mod model;
pub mod store;

pub use error::{Error, Result};
pub use model::{NewStudent, ScoreEntry, Student, StudentId, StudentUpdate, Track};
pub use store::StudentStore;
