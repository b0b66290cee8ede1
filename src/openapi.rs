use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Evtrack API",
        version = "1.0.0",
        description = r#"
# Evtrack Earned-Value Progress API

A backend API for tracking construction and engineering project progress with
earned-value management.

## Features

- **Projects & Sub-Jobs**: Hierarchical grouping of tracked work
- **Rules of Credit**: Weighted completion-step breakdowns
- **Cost Codes**: Discipline classification with optional rule binding
- **Work Items**: Budgeted units of work with per-step progress
- **Earned Values**: Explicit recompute of earned hours and quantity
- **Analytics**: Identical progress aggregation at sub-job, project, and portfolio scope

## Error Handling

The API uses consistent error response formats with appropriate HTTP status codes:

```json
{
  "error": "Bad Request",
  "message": "Validation error: Step weights must sum to 100 (got 60)",
  "request_id": "req-abc123xyz",
  "timestamp": "2025-03-01T00:00:00Z"
}
```

## Pagination

List endpoints support `page` and `per_page` query parameters.
        "#,
        contact(
            name = "Evtrack Support",
            email = "support@evtrack.dev"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "projects", description = "Project management endpoints"),
        (name = "sub-jobs", description = "Sub-job management endpoints"),
        (name = "rules-of-credit", description = "Rule of credit authoring endpoints"),
        (name = "cost-codes", description = "Cost code management endpoints"),
        (name = "work-items", description = "Work item and step progress endpoints"),
        (name = "analytics", description = "Progress aggregation endpoints")
    ),
    paths(
        // Rules of credit
        crate::handlers::rules_of_credit::create_rule,
        crate::handlers::rules_of_credit::set_steps,

        // Work items
        crate::handlers::work_items::create_work_item,
        crate::handlers::work_items::update_step,
        crate::handlers::work_items::recompute,
        crate::handlers::work_items::bind_cost_code,

        // Analytics
        crate::handlers::analytics::progress,
        crate::handlers::analytics::dashboard,

        // CRUD listings intentionally omitted from OpenAPI paths for now
    ),
    components(
        schemas(
            // Core value objects
            crate::progress::RuleStep,
            crate::progress::StepList,
            crate::progress::ProgressMap,
            crate::progress::ProgressTotals,
            crate::entities::Discipline,

            // Request types
            crate::handlers::projects::CreateProjectRequest,
            crate::handlers::projects::UpdateProjectRequest,
            crate::handlers::sub_jobs::CreateSubJobRequest,
            crate::handlers::sub_jobs::UpdateSubJobRequest,
            crate::handlers::rules_of_credit::StepRequest,
            crate::handlers::rules_of_credit::CreateRuleOfCreditRequest,
            crate::handlers::rules_of_credit::UpdateRuleOfCreditRequest,
            crate::handlers::rules_of_credit::SetStepsRequest,
            crate::handlers::cost_codes::CreateCostCodeRequest,
            crate::handlers::cost_codes::UpdateCostCodeRequest,
            crate::handlers::work_items::CreateWorkItemRequest,
            crate::handlers::work_items::UpdateWorkItemRequest,
            crate::handlers::work_items::UpdateStepRequest,
            crate::handlers::work_items::BindCostCodeRequest,

            // Response types
            crate::services::work_items::RecomputedEarnedValues,
            crate::services::analytics::WorkItemSummary,
            crate::services::analytics::DashboardView,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
