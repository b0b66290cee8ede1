use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginationParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    progress::RuleStep,
    services::rules_of_credit::{CreateRuleOfCreditInput, UpdateRuleOfCreditInput},
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

/// Creates the router for rule-of-credit endpoints
pub fn rule_of_credit_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_rule))
        .route("/", get(list_rules))
        .route("/{id}", get(get_rule))
        .route("/{id}", put(update_rule))
        .route("/{id}", delete(delete_rule))
        .route("/{id}/steps", put(set_steps))
}

// Request and response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StepRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub weight: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRuleOfCreditRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<StepRequest>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRuleOfCreditRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetStepsRequest {
    pub steps: Vec<StepRequest>,
}

fn to_rule_steps(steps: Vec<StepRequest>) -> Vec<RuleStep> {
    steps
        .into_iter()
        .map(|step| RuleStep {
            name: step.name,
            weight: step.weight,
        })
        .collect()
}

// Handler functions

/// Create a new rule of credit
#[utoipa::path(
    post,
    path = "/api/v1/rules-of-credit",
    request_body = CreateRuleOfCreditRequest,
    responses(
        (status = 201, description = "Rule of credit created"),
        (status = 400, description = "Invalid step list", body = crate::errors::ErrorResponse)
    ),
    tag = "rules-of-credit"
)]
pub async fn create_rule(
    State(state): State<AppState>,
    Json(payload): Json<CreateRuleOfCreditRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let rule = state
        .services
        .rules_of_credit
        .create_rule(CreateRuleOfCreditInput {
            name: payload.name,
            description: payload.description,
            steps: to_rule_steps(payload.steps),
        })
        .await
        .map_err(map_service_error)?;

    info!("Rule of credit created: {}", rule.id);

    Ok(created_response(rule))
}

/// Get a rule of credit by ID
async fn get_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let maybe_rule = state
        .services
        .rules_of_credit
        .get_rule(&rule_id)
        .await
        .map_err(map_service_error)?;

    if let Some(rule) = maybe_rule {
        Ok(success_response(rule))
    } else {
        Err(ApiError::NotFound(format!(
            "Rule of credit with ID {} not found",
            rule_id
        )))
    }
}

/// List rules of credit with pagination
async fn list_rules(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page.max(1);
    let per_page = params.per_page.max(1);

    let (rules, total) = state
        .services
        .rules_of_credit
        .list_rules(page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "rules_of_credit": rules,
        "total": total,
        "page": page,
        "per_page": per_page
    })))
}

/// Update rule metadata (name/description)
async fn update_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
    Json(payload): Json<UpdateRuleOfCreditRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .rules_of_credit
        .update_rule(
            rule_id,
            UpdateRuleOfCreditInput {
                name: payload.name,
                description: payload.description,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Rule of credit updated: {}", rule_id);

    Ok(success_response(serde_json::json!({
        "message": "Rule of credit updated successfully"
    })))
}

/// Replace the rule's step list wholesale
#[utoipa::path(
    put,
    path = "/api/v1/rules-of-credit/{id}/steps",
    request_body = SetStepsRequest,
    params(("id" = Uuid, Path, description = "Rule of credit id")),
    responses(
        (status = 200, description = "Step list replaced"),
        (status = 400, description = "Invalid step list", body = crate::errors::ErrorResponse),
        (status = 404, description = "Rule not found", body = crate::errors::ErrorResponse)
    ),
    tag = "rules-of-credit"
)]
pub async fn set_steps(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
    Json(payload): Json<SetStepsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let steps = state
        .services
        .rules_of_credit
        .set_steps(rule_id, to_rule_steps(payload.steps))
        .await
        .map_err(map_service_error)?;

    info!("Rule of credit steps replaced: {}", rule_id);

    Ok(success_response(serde_json::json!({
        "id": rule_id,
        "steps": steps
    })))
}

/// Delete a rule of credit
async fn delete_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .rules_of_credit
        .delete_rule(rule_id)
        .await
        .map_err(map_service_error)?;

    info!("Rule of credit deleted: {}", rule_id);

    Ok(no_content_response())
}
