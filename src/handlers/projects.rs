use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginationParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::projects::{CreateProjectInput, UpdateProjectInput},
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

/// Creates the router for project endpoints
pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_project))
        .route("/", get(list_projects))
        .route("/{id}", get(get_project))
        .route("/{id}", put(update_project))
        .route("/{id}", delete(delete_project))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Create a new project
async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let project = state
        .services
        .projects
        .create_project(CreateProjectInput {
            name: payload.name,
            description: payload.description,
        })
        .await
        .map_err(map_service_error)?;

    info!("Project created: {}", project.id);

    Ok(created_response(project))
}

/// Get a project by ID
async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let maybe_project = state
        .services
        .projects
        .get_project(&project_id)
        .await
        .map_err(map_service_error)?;

    if let Some(project) = maybe_project {
        Ok(success_response(project))
    } else {
        Err(ApiError::NotFound(format!(
            "Project with ID {} not found",
            project_id
        )))
    }
}

/// List projects with pagination
async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page.max(1);
    let per_page = params.per_page.max(1);

    let (projects, total) = state
        .services
        .projects
        .list_projects(page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "projects": projects,
        "total": total,
        "page": page,
        "per_page": per_page
    })))
}

/// Update a project
async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .projects
        .update_project(
            project_id,
            UpdateProjectInput {
                name: payload.name,
                description: payload.description,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Project updated: {}", project_id);

    Ok(success_response(serde_json::json!({
        "message": "Project updated successfully"
    })))
}

/// Delete a project
async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .projects
        .delete_project(project_id)
        .await
        .map_err(map_service_error)?;

    info!("Project deleted: {}", project_id);

    Ok(no_content_response())
}
