//! Score handlers
//!
//! POST/PUT /students/:id/scores, GET/DELETE /students/:id/scores/:course

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use ssm_common::ScoreEntry;

use super::{parse_student_id, MessageResponse};
use crate::{error::ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub score: f64,
}

/// POST /students/:id/scores
///
/// Creates the course entry or overwrites an existing one.
pub async fn add_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
    entry: Result<Json<ScoreEntry>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_student_id(&id)?;
    let Json(entry) = entry?;
    state
        .store
        .add_score(id, &entry.course_name, entry.score)
        .await?;
    Ok(Json(MessageResponse::new("Score added successfully")))
}

/// PUT /students/:id/scores
///
/// The course must already have a score.
pub async fn modify_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
    entry: Result<Json<ScoreEntry>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_student_id(&id)?;
    let Json(entry) = entry?;
    state
        .store
        .modify_score(id, &entry.course_name, entry.score)
        .await?;
    Ok(Json(MessageResponse::new("Score modified successfully")))
}

/// DELETE /students/:id/scores/:course
pub async fn delete_score(
    State(state): State<AppState>,
    Path((id, course)): Path<(String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_student_id(&id)?;
    state.store.delete_score(id, &course).await?;
    Ok(Json(MessageResponse::new("Score deleted successfully")))
}

/// GET /students/:id/scores/:course
pub async fn get_score(
    State(state): State<AppState>,
    Path((id, course)): Path<(String, String)>,
) -> ApiResult<Json<ScoreResponse>> {
    let id = parse_student_id(&id)?;
    let score = state.store.query_score(id, &course).await?;
    Ok(Json(ScoreResponse { score }))
}

pub fn score_routes() -> Router<AppState> {
    Router::new()
        .route("/students/:id/scores", post(add_score).put(modify_score))
        .route(
            "/students/:id/scores/:course",
            get(get_score).delete(delete_score),
        )
}
