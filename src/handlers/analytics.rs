use super::common::{map_service_error, success_response};
use crate::{errors::ApiError, handlers::AppState};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

/// Creates the router for analytics endpoints
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/progress", get(progress))
        .route("/dashboard", get(dashboard))
}

#[derive(Debug, Deserialize)]
pub struct ProgressScope {
    pub project_id: Option<Uuid>,
    pub sub_job_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardScope {
    pub project_id: Option<Uuid>,
}

/// Progress totals at portfolio, project, or sub-job scope.
///
/// With no query parameters the whole portfolio is aggregated; `project_id`
/// or `sub_job_id` narrows the input set. The reduction itself is identical
/// at every scope.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/progress",
    params(
        ("project_id" = Option<Uuid>, Query, description = "Scope to one project"),
        ("sub_job_id" = Option<Uuid>, Query, description = "Scope to one sub-job")
    ),
    responses(
        (status = 200, description = "Aggregated progress totals", body = crate::progress::ProgressTotals),
        (status = 404, description = "Scope not found", body = crate::errors::ErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn progress(
    State(state): State<AppState>,
    Query(scope): Query<ProgressScope>,
) -> Result<impl IntoResponse, ApiError> {
    let totals = match (scope.sub_job_id, scope.project_id) {
        (Some(sub_job_id), _) => state
            .services
            .analytics
            .sub_job_progress(sub_job_id)
            .await
            .map_err(map_service_error)?,
        (None, Some(project_id)) => state
            .services
            .analytics
            .project_progress(project_id)
            .await
            .map_err(map_service_error)?,
        (None, None) => state
            .services
            .analytics
            .portfolio_progress()
            .await
            .map_err(map_service_error)?,
    };

    Ok(success_response(totals))
}

/// Dashboard: overall progress plus recent work items
#[utoipa::path(
    get,
    path = "/api/v1/analytics/dashboard",
    params(("project_id" = Option<Uuid>, Query, description = "Scope to one project")),
    responses(
        (status = 200, description = "Dashboard view", body = crate::services::analytics::DashboardView),
        (status = 404, description = "Project not found", body = crate::errors::ErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    Query(scope): Query<DashboardScope>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .services
        .analytics
        .dashboard(scope.project_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(view))
}
