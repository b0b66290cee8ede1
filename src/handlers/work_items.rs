use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::work_items::{CreateWorkItemInput, UpdateWorkItemInput},
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

/// Creates the router for work item endpoints
pub fn work_item_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_work_item))
        .route("/", get(list_work_items))
        .route("/{id}", get(get_work_item))
        .route("/{id}", put(update_work_item))
        .route("/{id}", delete(delete_work_item))
        .route("/{id}/progress/{step}", put(update_step))
        .route("/{id}/recompute", post(recompute))
        .route("/{id}/cost-code", put(bind_cost_code))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWorkItemRequest {
    #[validate(length(min = 1))]
    pub identifier: String,
    pub description: String,
    pub sub_job_id: Uuid,
    pub cost_code_id: Uuid,
    #[validate(range(min = 0.0))]
    pub budgeted_quantity: Option<f64>,
    pub unit_of_measure: Option<String>,
    #[validate(range(min = 0.0))]
    pub budgeted_man_hours: Option<f64>,
}

/// Budget fields distinguish absent (leave alone) from null (clear)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkItemRequest {
    pub identifier: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<f64>, nullable)]
    pub budgeted_quantity: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>, nullable)]
    pub unit_of_measure: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<f64>, nullable)]
    pub budgeted_man_hours: Option<Option<f64>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStepRequest {
    #[validate(range(min = 0.0, max = 100.0))]
    pub percent: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BindCostCodeRequest {
    pub cost_code_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct WorkItemFilters {
    pub project_id: Option<Uuid>,
    pub sub_job_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

// Handler functions

/// Create a new work item
#[utoipa::path(
    post,
    path = "/api/v1/work-items",
    request_body = CreateWorkItemRequest,
    responses(
        (status = 201, description = "Work item created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Sub-job or cost code not found", body = crate::errors::ErrorResponse)
    ),
    tag = "work-items"
)]
pub async fn create_work_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let work_item = state
        .services
        .work_items
        .create_work_item(CreateWorkItemInput {
            identifier: payload.identifier,
            description: payload.description,
            sub_job_id: payload.sub_job_id,
            cost_code_id: payload.cost_code_id,
            budgeted_quantity: payload.budgeted_quantity,
            unit_of_measure: payload.unit_of_measure,
            budgeted_man_hours: payload.budgeted_man_hours,
        })
        .await
        .map_err(map_service_error)?;

    info!(
        "Work item created: {} ({})",
        work_item.identifier, work_item.id
    );

    Ok(created_response(work_item))
}

/// Get a work item by ID
async fn get_work_item(
    State(state): State<AppState>,
    Path(work_item_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let maybe_item = state
        .services
        .work_items
        .get_work_item(&work_item_id)
        .await
        .map_err(map_service_error)?;

    if let Some(work_item) = maybe_item {
        Ok(success_response(work_item))
    } else {
        Err(ApiError::NotFound(format!(
            "Work item with ID {} not found",
            work_item_id
        )))
    }
}

/// List work items, optionally filtered by project or sub-job
async fn list_work_items(
    State(state): State<AppState>,
    Query(filters): Query<WorkItemFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let page = filters.page.unwrap_or(1).max(1);
    let per_page = filters.per_page.unwrap_or(20).max(1);

    let (work_items, total) = state
        .services
        .work_items
        .list_work_items(filters.project_id, filters.sub_job_id, page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "work_items": work_items,
        "total": total,
        "page": page,
        "per_page": per_page
    })))
}

/// Update work item metadata and budgets
async fn update_work_item(
    State(state): State<AppState>,
    Path(work_item_id): Path<Uuid>,
    Json(payload): Json<UpdateWorkItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let updated = state
        .services
        .work_items
        .update_work_item(
            work_item_id,
            UpdateWorkItemInput {
                identifier: payload.identifier,
                description: payload.description,
                budgeted_quantity: payload.budgeted_quantity,
                unit_of_measure: payload.unit_of_measure,
                budgeted_man_hours: payload.budgeted_man_hours,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Work item updated: {}", work_item_id);

    Ok(success_response(updated))
}

/// Record percent complete for one step of the item's rule of credit.
/// Earned values stay untouched until an explicit recompute.
#[utoipa::path(
    put,
    path = "/api/v1/work-items/{id}/progress/{step}",
    request_body = UpdateStepRequest,
    params(
        ("id" = Uuid, Path, description = "Work item id"),
        ("step" = String, Path, description = "Step name of the bound rule of credit")
    ),
    responses(
        (status = 200, description = "Step progress recorded"),
        (status = 400, description = "Unknown step or percent out of range", body = crate::errors::ErrorResponse),
        (status = 404, description = "Work item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "work-items"
)]
pub async fn update_step(
    State(state): State<AppState>,
    Path((work_item_id, step)): Path<(Uuid, String)>,
    Json(payload): Json<UpdateStepRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .work_items
        .update_step(work_item_id, &step, payload.percent)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "id": work_item_id,
        "step": step,
        "percent": payload.percent
    })))
}

/// Recompute earned values from current step progress
#[utoipa::path(
    post,
    path = "/api/v1/work-items/{id}/recompute",
    params(("id" = Uuid, Path, description = "Work item id")),
    responses(
        (status = 200, description = "Earned values recomputed", body = crate::services::work_items::RecomputedEarnedValues),
        (status = 404, description = "Work item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "work-items"
)]
pub async fn recompute(
    State(state): State<AppState>,
    Path(work_item_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let earned = state
        .services
        .work_items
        .recompute(work_item_id)
        .await
        .map_err(map_service_error)?;

    info!("Work item recomputed: {}", work_item_id);

    Ok(success_response(earned))
}

/// Rebind the work item to another cost code, resetting step progress
#[utoipa::path(
    put,
    path = "/api/v1/work-items/{id}/cost-code",
    request_body = BindCostCodeRequest,
    params(("id" = Uuid, Path, description = "Work item id")),
    responses(
        (status = 200, description = "Work item rebound; progress reset"),
        (status = 404, description = "Work item or cost code not found", body = crate::errors::ErrorResponse)
    ),
    tag = "work-items"
)]
pub async fn bind_cost_code(
    State(state): State<AppState>,
    Path(work_item_id): Path<Uuid>,
    Json(payload): Json<BindCostCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let updated = state
        .services
        .work_items
        .bind_cost_code(work_item_id, payload.cost_code_id)
        .await
        .map_err(map_service_error)?;

    info!(
        "Work item {} rebound to cost code {}",
        work_item_id, payload.cost_code_id
    );

    Ok(success_response(updated))
}

/// Delete a work item
async fn delete_work_item(
    State(state): State<AppState>,
    Path(work_item_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .work_items
        .delete_work_item(work_item_id)
        .await
        .map_err(map_service_error)?;

    info!("Work item deleted: {}", work_item_id);

    Ok(no_content_response())
}
