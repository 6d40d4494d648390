//! ssm-server library - student score manager HTTP service
//!
//! Exposes student/score CRUD and bulk CSV import over one shared store.

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use ssm_common::config::ImportConfig;
use ssm_common::StudentStore;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod import;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The process-wide student table
    pub store: Arc<StudentStore>,
    /// Worker pool settings for bulk imports
    pub import_config: ImportConfig,
    /// Cancelled on graceful shutdown; in-flight imports observe it
    pub shutdown: CancellationToken,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<StudentStore>, import_config: ImportConfig) -> Self {
        Self {
            store,
            import_config,
            shutdown: CancellationToken::new(),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::student_routes())
        .merge(api::score_routes())
        .merge(api::import_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
