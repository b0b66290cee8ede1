use crate::{
    db::DbPool,
    entities::{
        cost_code, cost_code::Discipline, cost_code::Entity as CostCodeEntity, project,
        rule_of_credit, work_item,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    progress::{initial_progress, StepList},
};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Input payload for creating a cost code
#[derive(Debug, Clone)]
pub struct CreateCostCodeInput {
    pub code: String,
    pub description: Option<String>,
    pub discipline: Discipline,
    pub project_id: Uuid,
    pub rule_of_credit_id: Option<Uuid>,
}

/// Input payload for updating a cost code.
///
/// `rule_of_credit_id` uses a double option: `None` leaves the binding alone,
/// `Some(None)` clears it, `Some(Some(id))` rebinds.
#[derive(Debug, Clone, Default)]
pub struct UpdateCostCodeInput {
    pub code: Option<String>,
    pub description: Option<String>,
    pub discipline: Option<Discipline>,
    pub rule_of_credit_id: Option<Option<Uuid>>,
}

/// Service for managing cost codes
#[derive(Clone)]
pub struct CostCodeService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CostCodeService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a cost code, enforcing system-wide code uniqueness.
    #[instrument(skip(self, input))]
    pub async fn create_cost_code(
        &self,
        input: CreateCostCodeInput,
    ) -> Result<cost_code::Model, ServiceError> {
        let db = self.connection();

        let code = input.code.trim().to_string();
        if code.is_empty() {
            return Err(ServiceError::ValidationError(
                "Cost code identifier must not be blank".to_string(),
            ));
        }

        let project_exists = project::Entity::find_by_id(input.project_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if project_exists.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Project {} not found",
                input.project_id
            )));
        }

        if let Some(rule_id) = input.rule_of_credit_id {
            self.require_rule(rule_id).await?;
        }

        let duplicate = CostCodeEntity::find()
            .filter(cost_code::Column::Code.eq(code.clone()))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if duplicate > 0 {
            return Err(ServiceError::Conflict(format!(
                "Cost code '{}' already exists",
                code
            )));
        }

        let now = Utc::now();
        let model = cost_code::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code),
            description: Set(input.description.clone()),
            discipline: Set(input.discipline),
            project_id: Set(input.project_id),
            rule_of_credit_id: Set(input.rule_of_credit_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::CostCodeCreated {
                cost_code_id: created.id,
                project_id: created.project_id,
            })
            .await;

        Ok(created)
    }

    /// Fetches a cost code by identifier.
    #[instrument(skip(self))]
    pub async fn get_cost_code(
        &self,
        cost_code_id: &Uuid,
    ) -> Result<Option<cost_code::Model>, ServiceError> {
        let db = self.connection();
        CostCodeEntity::find_by_id(*cost_code_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Returns paginated cost codes, optionally scoped to a project.
    #[instrument(skip(self))]
    pub async fn list_cost_codes(
        &self,
        project_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<cost_code::Model>, u64), ServiceError> {
        let db = self.connection();
        let limit = limit.max(1);
        let page = page.max(1) - 1;

        let mut query = CostCodeEntity::find().order_by_asc(cost_code::Column::Code);
        if let Some(project_id) = project_id {
            query = query.filter(cost_code::Column::ProjectId.eq(project_id));
        }

        let paginator = query.paginate(db, limit);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let codes = paginator
            .fetch_page(page)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((codes, total))
    }

    /// Applies updates to a cost code.
    ///
    /// Changing the rule binding re-initializes progress of every work item
    /// carrying this cost code: their step maps must always match the rule
    /// currently bound, so old progress is discarded and earned values reset.
    #[instrument(skip(self, input))]
    pub async fn update_cost_code(
        &self,
        cost_code_id: Uuid,
        input: UpdateCostCodeInput,
    ) -> Result<(), ServiceError> {
        let db = self.connection();

        let model = CostCodeEntity::find_by_id(cost_code_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Cost code {} not found", cost_code_id))
            })?;

        let current_code = model.code.clone();
        let current_binding = model.rule_of_credit_id;
        let mut active = model.into_active_model();

        if let Some(code) = input.code {
            let code = code.trim().to_string();
            if code.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Cost code identifier must not be blank".to_string(),
                ));
            }
            if code != current_code {
                let duplicate = CostCodeEntity::find()
                    .filter(cost_code::Column::Code.eq(code.clone()))
                    .count(db)
                    .await
                    .map_err(ServiceError::db_error)?;
                if duplicate > 0 {
                    return Err(ServiceError::Conflict(format!(
                        "Cost code '{}' already exists",
                        code
                    )));
                }
                active.code = Set(code);
            }
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(discipline) = input.discipline {
            active.discipline = Set(discipline);
        }

        let new_binding = match input.rule_of_credit_id {
            Some(binding) if binding != current_binding => {
                if let Some(rule_id) = binding {
                    self.require_rule(rule_id).await?;
                }
                active.rule_of_credit_id = Set(binding);
                Some(binding)
            }
            _ => None,
        };

        active.updated_at = Set(Utc::now());

        let steps = match new_binding {
            Some(binding) => Some(self.steps_for_binding(binding).await?),
            None => None,
        };

        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        active.update(&txn).await.map_err(ServiceError::db_error)?;

        if let Some(steps) = steps {
            let bound_items = work_item::Entity::find()
                .filter(work_item::Column::CostCodeId.eq(cost_code_id))
                .all(&txn)
                .await
                .map_err(ServiceError::db_error)?;

            let now = Utc::now();
            for item in bound_items {
                let mut active = item.into_active_model();
                active.progress = Set(initial_progress(&steps));
                active.earned_man_hours = Set(0.0);
                active.earned_quantity = Set(0.0);
                active.updated_at = Set(now);
                active.update(&txn).await.map_err(ServiceError::db_error)?;
            }
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::CostCodeUpdated(cost_code_id))
            .await;

        Ok(())
    }

    /// Deletes a cost code unless work items still reference it.
    #[instrument(skip(self))]
    pub async fn delete_cost_code(&self, cost_code_id: Uuid) -> Result<(), ServiceError> {
        let db = self.connection();

        let model = CostCodeEntity::find_by_id(cost_code_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Cost code {} not found", cost_code_id))
            })?;

        let referencing = work_item::Entity::find()
            .filter(work_item::Column::CostCodeId.eq(cost_code_id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        if referencing > 0 {
            return Err(ServiceError::ReferentialIntegrity(format!(
                "Cost code {} is referenced by {} work item(s)",
                cost_code_id, referencing
            )));
        }

        model.delete(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::CostCodeDeleted(cost_code_id))
            .await;

        Ok(())
    }

    async fn require_rule(&self, rule_id: Uuid) -> Result<rule_of_credit::Model, ServiceError> {
        let db = self.connection();
        rule_of_credit::Entity::find_by_id(rule_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Rule of credit {} not found", rule_id)))
    }

    async fn steps_for_binding(
        &self,
        rule_of_credit_id: Option<Uuid>,
    ) -> Result<StepList, ServiceError> {
        match rule_of_credit_id {
            Some(rule_id) => Ok(self.require_rule(rule_id).await?.steps),
            None => Ok(StepList::default()),
        }
    }

    fn connection(&self) -> &DatabaseConnection {
        self.db_pool.as_ref()
    }
}
