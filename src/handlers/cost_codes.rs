use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    entities::Discipline,
    errors::ApiError,
    handlers::AppState,
    services::cost_codes::{CreateCostCodeInput, UpdateCostCodeInput},
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

/// Creates the router for cost code endpoints
pub fn cost_code_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_cost_code))
        .route("/", get(list_cost_codes))
        .route("/{id}", get(get_cost_code))
        .route("/{id}", put(update_cost_code))
        .route("/{id}", delete(delete_cost_code))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCostCodeRequest {
    #[validate(length(min = 1))]
    pub code: String,
    pub description: Option<String>,
    pub discipline: Discipline,
    pub project_id: Uuid,
    pub rule_of_credit_id: Option<Uuid>,
}

/// `rule_of_credit_id` distinguishes absent (leave alone) from null (clear)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCostCodeRequest {
    pub code: Option<String>,
    pub description: Option<String>,
    pub discipline: Option<Discipline>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub rule_of_credit_id: Option<Option<Uuid>>,
}

/// Maps a field that is present (possibly null) to `Some(_)`, leaving an
/// absent field at the `None` default.
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct CostCodeFilters {
    pub project_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

// Handler functions

/// Create a new cost code
async fn create_cost_code(
    State(state): State<AppState>,
    Json(payload): Json<CreateCostCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let cost_code = state
        .services
        .cost_codes
        .create_cost_code(CreateCostCodeInput {
            code: payload.code,
            description: payload.description,
            discipline: payload.discipline,
            project_id: payload.project_id,
            rule_of_credit_id: payload.rule_of_credit_id,
        })
        .await
        .map_err(map_service_error)?;

    info!("Cost code created: {} ({})", cost_code.code, cost_code.id);

    Ok(created_response(cost_code))
}

/// Get a cost code by ID
async fn get_cost_code(
    State(state): State<AppState>,
    Path(cost_code_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let maybe_code = state
        .services
        .cost_codes
        .get_cost_code(&cost_code_id)
        .await
        .map_err(map_service_error)?;

    if let Some(cost_code) = maybe_code {
        Ok(success_response(cost_code))
    } else {
        Err(ApiError::NotFound(format!(
            "Cost code with ID {} not found",
            cost_code_id
        )))
    }
}

/// List cost codes, optionally filtered by project
async fn list_cost_codes(
    State(state): State<AppState>,
    Query(filters): Query<CostCodeFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let page = filters.page.unwrap_or(1).max(1);
    let per_page = filters.per_page.unwrap_or(20).max(1);

    let (cost_codes, total) = state
        .services
        .cost_codes
        .list_cost_codes(filters.project_id, page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "cost_codes": cost_codes,
        "total": total,
        "page": page,
        "per_page": per_page
    })))
}

/// Update a cost code
async fn update_cost_code(
    State(state): State<AppState>,
    Path(cost_code_id): Path<Uuid>,
    Json(payload): Json<UpdateCostCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .cost_codes
        .update_cost_code(
            cost_code_id,
            UpdateCostCodeInput {
                code: payload.code,
                description: payload.description,
                discipline: payload.discipline,
                rule_of_credit_id: payload.rule_of_credit_id,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Cost code updated: {}", cost_code_id);

    Ok(success_response(serde_json::json!({
        "message": "Cost code updated successfully"
    })))
}

/// Delete a cost code
async fn delete_cost_code(
    State(state): State<AppState>,
    Path(cost_code_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .cost_codes
        .delete_cost_code(cost_code_id)
        .await
        .map_err(map_service_error)?;

    info!("Cost code deleted: {}", cost_code_id);

    Ok(no_content_response())
}
