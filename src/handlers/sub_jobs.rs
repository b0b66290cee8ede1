use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::sub_jobs::{CreateSubJobInput, UpdateSubJobInput},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for sub-job endpoints
pub fn sub_job_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_sub_job))
        .route("/", get(list_sub_jobs))
        .route("/{id}", get(get_sub_job))
        .route("/{id}", put(update_sub_job))
        .route("/{id}", delete(delete_sub_job))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSubJobRequest {
    pub project_id: Uuid,
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSubJobRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubJobFilters {
    pub project_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Create a new sub-job
async fn create_sub_job(
    State(state): State<AppState>,
    Json(payload): Json<CreateSubJobRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let sub_job = state
        .services
        .sub_jobs
        .create_sub_job(CreateSubJobInput {
            project_id: payload.project_id,
            name: payload.name,
            description: payload.description,
        })
        .await
        .map_err(map_service_error)?;

    info!("Sub-job created: {}", sub_job.id);

    Ok(created_response(sub_job))
}

/// Get a sub-job by ID
async fn get_sub_job(
    State(state): State<AppState>,
    Path(sub_job_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let maybe_sub_job = state
        .services
        .sub_jobs
        .get_sub_job(&sub_job_id)
        .await
        .map_err(map_service_error)?;

    if let Some(sub_job) = maybe_sub_job {
        Ok(success_response(sub_job))
    } else {
        Err(ApiError::NotFound(format!(
            "Sub-job with ID {} not found",
            sub_job_id
        )))
    }
}

/// List sub-jobs, optionally filtered by project
async fn list_sub_jobs(
    State(state): State<AppState>,
    Query(filters): Query<SubJobFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let page = filters.page.unwrap_or(1).max(1);
    let per_page = filters.per_page.unwrap_or(20).max(1);

    let (sub_jobs, total) = state
        .services
        .sub_jobs
        .list_sub_jobs(filters.project_id, page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "sub_jobs": sub_jobs,
        "total": total,
        "page": page,
        "per_page": per_page
    })))
}

/// Update a sub-job
async fn update_sub_job(
    State(state): State<AppState>,
    Path(sub_job_id): Path<Uuid>,
    Json(payload): Json<UpdateSubJobRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .sub_jobs
        .update_sub_job(
            sub_job_id,
            UpdateSubJobInput {
                name: payload.name,
                description: payload.description,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Sub-job updated: {}", sub_job_id);

    Ok(success_response(serde_json::json!({
        "message": "Sub-job updated successfully"
    })))
}

/// Delete a sub-job
async fn delete_sub_job(
    State(state): State<AppState>,
    Path(sub_job_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .sub_jobs
        .delete_sub_job(sub_job_id)
        .await
        .map_err(map_service_error)?;

    info!("Sub-job deleted: {}", sub_job_id);

    Ok(no_content_response())
}
