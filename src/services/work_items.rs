use crate::{
    db::DbPool,
    entities::{cost_code, rule_of_credit, sub_job, work_item, work_item::Entity as WorkItemEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    progress::{earned_values, initial_progress, overall_percent, StepList},
};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// Input payload for creating a work item
#[derive(Debug, Clone)]
pub struct CreateWorkItemInput {
    pub identifier: String,
    pub description: String,
    pub sub_job_id: Uuid,
    pub cost_code_id: Uuid,
    pub budgeted_quantity: Option<f64>,
    pub unit_of_measure: Option<String>,
    pub budgeted_man_hours: Option<f64>,
}

/// Input payload for updating work item metadata and budgets.
///
/// Budget fields use a double option: `None` leaves the budget alone,
/// `Some(None)` clears it, `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default)]
pub struct UpdateWorkItemInput {
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub budgeted_quantity: Option<Option<f64>>,
    pub unit_of_measure: Option<Option<String>>,
    pub budgeted_man_hours: Option<Option<f64>>,
}

/// Earned figures returned by an explicit recompute
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct RecomputedEarnedValues {
    pub earned_man_hours: f64,
    pub earned_quantity: f64,
    pub overall_percent: f64,
}

/// Service for managing work items and their step progress
#[derive(Clone)]
pub struct WorkItemService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl WorkItemService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a work item under a sub-job.
    ///
    /// The owning project is derived from the sub-job. When the cost code
    /// carries a rule of credit the progress map starts with every step at
    /// zero; without a rule it stays empty and earned values stay zero.
    #[instrument(skip(self, input))]
    pub async fn create_work_item(
        &self,
        input: CreateWorkItemInput,
    ) -> Result<work_item::Model, ServiceError> {
        let db = self.connection();

        if input.identifier.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Work item identifier must not be blank".to_string(),
            ));
        }
        validate_budget("budgeted_quantity", input.budgeted_quantity)?;
        validate_budget("budgeted_man_hours", input.budgeted_man_hours)?;

        let sub_job = sub_job::Entity::find_by_id(input.sub_job_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Sub-job {} not found", input.sub_job_id))
            })?;

        let cost_code = self.require_cost_code(input.cost_code_id).await?;
        let steps = self.rule_steps(&cost_code).await?;

        let now = Utc::now();
        let model = work_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            identifier: Set(input.identifier.trim().to_string()),
            description: Set(input.description.clone()),
            project_id: Set(sub_job.project_id),
            sub_job_id: Set(sub_job.id),
            cost_code_id: Set(cost_code.id),
            budgeted_quantity: Set(input.budgeted_quantity),
            unit_of_measure: Set(input.unit_of_measure.clone()),
            budgeted_man_hours: Set(input.budgeted_man_hours),
            earned_quantity: Set(0.0),
            earned_man_hours: Set(0.0),
            progress: Set(initial_progress(&steps)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::WorkItemCreated {
                work_item_id: created.id,
                sub_job_id: created.sub_job_id,
            })
            .await;

        Ok(created)
    }

    /// Fetches a work item by identifier.
    #[instrument(skip(self))]
    pub async fn get_work_item(
        &self,
        work_item_id: &Uuid,
    ) -> Result<Option<work_item::Model>, ServiceError> {
        let db = self.connection();
        WorkItemEntity::find_by_id(*work_item_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Returns paginated work items, newest first, optionally scoped to a
    /// project or sub-job.
    #[instrument(skip(self))]
    pub async fn list_work_items(
        &self,
        project_id: Option<Uuid>,
        sub_job_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<work_item::Model>, u64), ServiceError> {
        let db = self.connection();
        let limit = limit.max(1);
        let page = page.max(1) - 1;

        let mut query = WorkItemEntity::find().order_by_desc(work_item::Column::CreatedAt);
        if let Some(project_id) = project_id {
            query = query.filter(work_item::Column::ProjectId.eq(project_id));
        }
        if let Some(sub_job_id) = sub_job_id {
            query = query.filter(work_item::Column::SubJobId.eq(sub_job_id));
        }

        let paginator = query.paginate(db, limit);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let items = paginator
            .fetch_page(page)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((items, total))
    }

    /// Applies metadata/budget updates to a work item.
    ///
    /// Budget changes re-derive earned values from the current progress so
    /// earned never exceeds budgeted.
    #[instrument(skip(self, input))]
    pub async fn update_work_item(
        &self,
        work_item_id: Uuid,
        input: UpdateWorkItemInput,
    ) -> Result<work_item::Model, ServiceError> {
        let db = self.connection();

        let model = self.require_work_item(work_item_id).await?;

        let progress = model.progress.clone();
        let cost_code_id = model.cost_code_id;
        let mut budgeted_quantity = model.budgeted_quantity;
        let mut budgeted_man_hours = model.budgeted_man_hours;
        let mut active = model.into_active_model();

        if let Some(identifier) = input.identifier {
            if identifier.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Work item identifier must not be blank".to_string(),
                ));
            }
            active.identifier = Set(identifier.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }

        let mut budgets_changed = false;
        if let Some(new_quantity) = input.budgeted_quantity {
            validate_budget("budgeted_quantity", new_quantity)?;
            budgeted_quantity = new_quantity;
            active.budgeted_quantity = Set(new_quantity);
            budgets_changed = true;
        }
        if let Some(unit_of_measure) = input.unit_of_measure {
            active.unit_of_measure = Set(unit_of_measure);
        }
        if let Some(new_hours) = input.budgeted_man_hours {
            validate_budget("budgeted_man_hours", new_hours)?;
            budgeted_man_hours = new_hours;
            active.budgeted_man_hours = Set(new_hours);
            budgets_changed = true;
        }

        if budgets_changed {
            let cost_code = self.require_cost_code(cost_code_id).await?;
            let steps = self.rule_steps(&cost_code).await?;
            let percent = overall_percent(&steps, &progress);
            let earned = earned_values(percent, budgeted_man_hours, budgeted_quantity);
            active.earned_man_hours = Set(earned.earned_man_hours);
            active.earned_quantity = Set(earned.earned_quantity);
        }

        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::WorkItemUpdated(work_item_id))
            .await;

        Ok(updated)
    }

    /// Records a percent complete for one step of the item's rule of credit.
    ///
    /// Earned values are deliberately left stale: callers batch step updates
    /// and then issue one explicit `recompute`.
    #[instrument(skip(self))]
    pub async fn update_step(
        &self,
        work_item_id: Uuid,
        step: &str,
        percent: f64,
    ) -> Result<(), ServiceError> {
        let db = self.connection();

        let model = self.require_work_item(work_item_id).await?;
        let cost_code = self.require_cost_code(model.cost_code_id).await?;
        let steps = self.rule_steps(&cost_code).await?;

        let mut progress = model.progress.clone();
        progress.update_step(&steps, step, percent)?;

        let mut active = model.into_active_model();
        active.progress = Set(progress);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::WorkItemStepUpdated {
                work_item_id,
                step: step.to_string(),
                percent,
            })
            .await;

        Ok(())
    }

    /// Recomputes earned values from the item's current step progress.
    ///
    /// This is the only code path that writes earned figures.
    #[instrument(skip(self))]
    pub async fn recompute(
        &self,
        work_item_id: Uuid,
    ) -> Result<RecomputedEarnedValues, ServiceError> {
        let db = self.connection();

        let model = self.require_work_item(work_item_id).await?;
        let cost_code = self.require_cost_code(model.cost_code_id).await?;
        let steps = self.rule_steps(&cost_code).await?;

        let percent = overall_percent(&steps, &model.progress);
        let earned = earned_values(percent, model.budgeted_man_hours, model.budgeted_quantity);

        let mut active = model.into_active_model();
        active.earned_man_hours = Set(earned.earned_man_hours);
        active.earned_quantity = Set(earned.earned_quantity);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::WorkItemRecomputed {
                work_item_id,
                earned_man_hours: earned.earned_man_hours,
                earned_quantity: earned.earned_quantity,
            })
            .await;

        Ok(RecomputedEarnedValues {
            earned_man_hours: earned.earned_man_hours,
            earned_quantity: earned.earned_quantity,
            overall_percent: percent,
        })
    }

    /// Rebinds a work item to another cost code.
    ///
    /// The new cost code's rule (if any) replaces the old one and all prior
    /// step progress is discarded: the map is re-initialized to zero for the
    /// new rule's steps and earned values reset. Rule identity governs the
    /// reset, so rebinding between cost codes sharing one rule still resets.
    #[instrument(skip(self))]
    pub async fn bind_cost_code(
        &self,
        work_item_id: Uuid,
        cost_code_id: Uuid,
    ) -> Result<work_item::Model, ServiceError> {
        let db = self.connection();

        let model = self.require_work_item(work_item_id).await?;
        let cost_code = self.require_cost_code(cost_code_id).await?;
        let steps = self.rule_steps(&cost_code).await?;

        let mut active = model.into_active_model();
        active.cost_code_id = Set(cost_code.id);
        active.progress = Set(initial_progress(&steps));
        active.earned_man_hours = Set(0.0);
        active.earned_quantity = Set(0.0);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::WorkItemRebound {
                work_item_id,
                cost_code_id,
            })
            .await;

        Ok(updated)
    }

    /// Deletes a work item. Nothing references work items downstream.
    #[instrument(skip(self))]
    pub async fn delete_work_item(&self, work_item_id: Uuid) -> Result<(), ServiceError> {
        let db = self.connection();

        let model = self.require_work_item(work_item_id).await?;
        model.delete(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::WorkItemDeleted(work_item_id))
            .await;

        Ok(())
    }

    async fn require_work_item(
        &self,
        work_item_id: Uuid,
    ) -> Result<work_item::Model, ServiceError> {
        let db = self.connection();
        WorkItemEntity::find_by_id(work_item_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Work item {} not found", work_item_id)))
    }

    async fn require_cost_code(
        &self,
        cost_code_id: Uuid,
    ) -> Result<cost_code::Model, ServiceError> {
        let db = self.connection();
        cost_code::Entity::find_by_id(cost_code_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Cost code {} not found", cost_code_id)))
    }

    /// Step list of the rule bound to `cost_code`, or an empty list without one.
    async fn rule_steps(&self, cost_code: &cost_code::Model) -> Result<StepList, ServiceError> {
        let db = self.connection();
        match cost_code.rule_of_credit_id {
            Some(rule_id) => {
                let rule = rule_of_credit::Entity::find_by_id(rule_id)
                    .one(db)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Rule of credit {} not found", rule_id))
                    })?;
                Ok(rule.steps)
            }
            None => Ok(StepList::default()),
        }
    }

    fn connection(&self) -> &DatabaseConnection {
        self.db_pool.as_ref()
    }
}

fn validate_budget(field: &str, value: Option<f64>) -> Result<(), ServiceError> {
    if let Some(value) = value {
        if !value.is_finite() || value < 0.0 {
            return Err(ServiceError::ValidationError(format!(
                "{} must be a non-negative number",
                field
            )));
        }
    }
    Ok(())
}
