//! HTTP API handlers for ssm-server

pub mod health;
pub mod import;
pub mod scores;
pub mod students;

pub use health::health_routes;
pub use import::import_routes;
pub use scores::score_routes;
pub use students::student_routes;

use serde::Serialize;
use ssm_common::StudentId;

use crate::error::{ApiError, ApiResult};

/// Plain acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parse a `:id` path segment
pub(crate) fn parse_student_id(raw: &str) -> ApiResult<StudentId> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid student id".to_string()))
}
