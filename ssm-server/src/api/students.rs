//! Student record handlers
//!
//! POST /undergraduates, POST /graduates, GET/PUT/DELETE /students/:id

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use ssm_common::{NewStudent, Student, StudentUpdate, Track};

use super::{parse_student_id, MessageResponse};
use crate::{error::ApiResult, AppState};

/// POST /undergraduates
pub async fn add_undergraduate(
    State(state): State<AppState>,
    payload: Result<Json<NewStudent>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(payload) = payload?;
    create_student(&state, payload, Track::Undergraduate).await;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Undergraduate added successfully")),
    ))
}

/// POST /graduates
pub async fn add_graduate(
    State(state): State<AppState>,
    payload: Result<Json<NewStudent>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(payload) = payload?;
    create_student(&state, payload, Track::Graduate).await;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Graduate added successfully")),
    ))
}

/// Create or replace; an existing record at the same id loses its scores
async fn create_student(state: &AppState, payload: NewStudent, track: Track) {
    let student = payload.into_student(track);
    tracing::info!(student_id = student.id, %track, "Adding student");
    state.store.add(student).await;
}

/// DELETE /students/:id
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_student_id(&id)?;
    state.store.delete(id).await?;
    tracing::info!(student_id = id, "Deleted student");
    Ok(Json(MessageResponse::new("Student deleted successfully")))
}

/// PUT /students/:id
///
/// Body carries any of `name`, `gender`, `class`; unknown keys are rejected.
pub async fn modify_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    update: Result<Json<StudentUpdate>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_student_id(&id)?;
    let Json(update) = update?;
    state.store.modify(id, update).await?;
    Ok(Json(MessageResponse::new("Student modified successfully")))
}

/// GET /students/:id
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Student>> {
    let id = parse_student_id(&id)?;
    Ok(Json(state.store.query(id).await?))
}

pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/undergraduates", post(add_undergraduate))
        .route("/graduates", post(add_graduate))
        .route(
            "/students/:id",
            get(get_student).put(modify_student).delete(delete_student),
        )
}
