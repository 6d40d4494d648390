//! Bulk import endpoint
//!
//! POST /import with a multipart form whose `file` field holds CSV rows.

use std::io::Cursor;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};

use super::MessageResponse;
use crate::{
    error::{ApiError, ApiResult},
    import::ImportPipeline,
    AppState,
};

/// Multipart field carrying the CSV payload
pub const FILE_FIELD: &str = "file";

/// POST /import
///
/// Responds once every row has been read and merged. Skipped rows are only
/// visible in the logs.
pub async fn import_students(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let mut multipart = multipart?;
    let data = read_file_field(&mut multipart).await?;
    tracing::info!(bytes = data.len(), "Received import upload");

    let pipeline = ImportPipeline::new(Arc::clone(&state.store), state.import_config);
    pipeline
        .run_until_cancelled(Cursor::new(data), state.shutdown.child_token())
        .await?;

    Ok(Json(MessageResponse::new("CSV data imported successfully")))
}

async fn read_file_field(multipart: &mut Multipart) -> ApiResult<Bytes> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid file: {}", e)))?
    {
        if field.name() == Some(FILE_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Invalid file: {}", e)));
        }
    }

    Err(ApiError::BadRequest(format!(
        "Invalid file: missing '{}' field",
        FILE_FIELD
    )))
}

pub fn import_routes() -> Router<AppState> {
    Router::new().route("/import", post(import_students))
}
