use crate::{
    db::DbPool,
    entities::{cost_code, rule_of_credit, rule_of_credit::Entity as RuleOfCreditEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    progress::{RuleStep, StepList},
};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Input payload for creating a rule of credit
#[derive(Debug, Clone)]
pub struct CreateRuleOfCreditInput {
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<RuleStep>,
}

/// Input payload for updating rule metadata (steps are replaced separately)
#[derive(Debug, Clone)]
pub struct UpdateRuleOfCreditInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Service for managing rules of credit
#[derive(Clone)]
pub struct RuleOfCreditService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl RuleOfCreditService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a rule of credit with a validated step list.
    #[instrument(skip(self, input))]
    pub async fn create_rule(
        &self,
        input: CreateRuleOfCreditInput,
    ) -> Result<rule_of_credit::Model, ServiceError> {
        let db = self.connection();

        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Rule of credit name must not be blank".to_string(),
            ));
        }
        let steps = StepList::new(input.steps)?;

        let now = Utc::now();
        let model = rule_of_credit::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            steps: Set(steps),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let rule = model.insert(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::RuleOfCreditCreated(rule.id))
            .await;

        Ok(rule)
    }

    /// Fetches a rule of credit by identifier.
    #[instrument(skip(self))]
    pub async fn get_rule(
        &self,
        rule_id: &Uuid,
    ) -> Result<Option<rule_of_credit::Model>, ServiceError> {
        let db = self.connection();
        RuleOfCreditEntity::find_by_id(*rule_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Returns paginated rules, newest first.
    #[instrument(skip(self))]
    pub async fn list_rules(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<rule_of_credit::Model>, u64), ServiceError> {
        let db = self.connection();
        let limit = limit.max(1);
        let page = page.max(1) - 1;
        let paginator = RuleOfCreditEntity::find()
            .order_by_desc(rule_of_credit::Column::CreatedAt)
            .paginate(db, limit);

        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let rules = paginator
            .fetch_page(page)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((rules, total))
    }

    /// Applies updates to rule metadata; the step list is untouched.
    #[instrument(skip(self, input))]
    pub async fn update_rule(
        &self,
        rule_id: Uuid,
        input: UpdateRuleOfCreditInput,
    ) -> Result<(), ServiceError> {
        let db = self.connection();
        let model = RuleOfCreditEntity::find_by_id(rule_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Rule of credit {} not found", rule_id))
            })?;

        let mut active = model.into_active_model();
        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Rule of credit name must not be blank".to_string(),
                ));
            }
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Utc::now());

        active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::RuleOfCreditUpdated(rule_id))
            .await;

        Ok(())
    }

    /// Replaces a rule's step list wholesale.
    ///
    /// The replacement either fully applies or leaves the stored list
    /// untouched: validation happens before any write, and the write is a
    /// single row update.
    #[instrument(skip(self, steps))]
    pub async fn set_steps(
        &self,
        rule_id: Uuid,
        steps: Vec<RuleStep>,
    ) -> Result<StepList, ServiceError> {
        let db = self.connection();

        let steps = StepList::new(steps)?;

        let model = RuleOfCreditEntity::find_by_id(rule_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Rule of credit {} not found", rule_id))
            })?;

        let step_count = steps.len();
        let mut active = model.into_active_model();
        active.steps = Set(steps.clone());
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::RuleOfCreditStepsReplaced {
                rule_id,
                step_count,
            })
            .await;

        Ok(steps)
    }

    /// Deletes a rule of credit unless cost codes still reference it.
    #[instrument(skip(self))]
    pub async fn delete_rule(&self, rule_id: Uuid) -> Result<(), ServiceError> {
        let db = self.connection();

        let model = RuleOfCreditEntity::find_by_id(rule_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Rule of credit {} not found", rule_id))
            })?;

        let referencing = cost_code::Entity::find()
            .filter(cost_code::Column::RuleOfCreditId.eq(rule_id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        if referencing > 0 {
            return Err(ServiceError::ReferentialIntegrity(format!(
                "Rule of credit {} is referenced by {} cost code(s)",
                rule_id, referencing
            )));
        }

        model.delete(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::RuleOfCreditDeleted(rule_id))
            .await;

        Ok(())
    }

    fn connection(&self) -> &DatabaseConnection {
        self.db_pool.as_ref()
    }
}
