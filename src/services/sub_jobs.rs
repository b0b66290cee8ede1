use crate::{
    db::DbPool,
    entities::{project, sub_job, sub_job::Entity as SubJobEntity, work_item},
    errors::ServiceError,
    events::{Event, EventSender},
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

/// Input payload for creating a sub-job
#[derive(Debug, Clone)]
pub struct CreateSubJobInput {
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// Input payload for updating a sub-job
#[derive(Debug, Clone, Default)]
pub struct UpdateSubJobInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Service for managing sub-jobs
#[derive(Clone)]
pub struct SubJobService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SubJobService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a sub-job under an existing project.
    #[instrument(skip(self, input))]
    pub async fn create_sub_job(
        &self,
        input: CreateSubJobInput,
    ) -> Result<sub_job::Model, ServiceError> {
        let db = self.connection();

        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Sub-job name must not be blank".to_string(),
            ));
        }

        let project = project::Entity::find_by_id(input.project_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Project {} not found", input.project_id))
            })?;

        let now = Utc::now();
        let model = sub_job::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project.id),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::SubJobCreated {
                sub_job_id: created.id,
                project_id: created.project_id,
            })
            .await;

        Ok(created)
    }

    /// Fetches a sub-job by identifier.
    #[instrument(skip(self))]
    pub async fn get_sub_job(
        &self,
        sub_job_id: &Uuid,
    ) -> Result<Option<sub_job::Model>, ServiceError> {
        let db = self.connection();
        SubJobEntity::find_by_id(*sub_job_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Returns paginated sub-jobs, optionally scoped to a project.
    #[instrument(skip(self))]
    pub async fn list_sub_jobs(
        &self,
        project_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<sub_job::Model>, u64), ServiceError> {
        let db = self.connection();
        let limit = limit.max(1);
        let page = page.max(1) - 1;

        let mut query = SubJobEntity::find().order_by_desc(sub_job::Column::CreatedAt);
        if let Some(project_id) = project_id {
            query = query.filter(sub_job::Column::ProjectId.eq(project_id));
        }

        let paginator = query.paginate(db, limit);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let sub_jobs = paginator
            .fetch_page(page)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((sub_jobs, total))
    }

    /// Applies updates to a sub-job.
    #[instrument(skip(self, input))]
    pub async fn update_sub_job(
        &self,
        sub_job_id: Uuid,
        input: UpdateSubJobInput,
    ) -> Result<(), ServiceError> {
        let db = self.connection();
        let model = SubJobEntity::find_by_id(sub_job_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Sub-job {} not found", sub_job_id)))?;

        let mut active = model.into_active_model();
        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Sub-job name must not be blank".to_string(),
                ));
            }
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Utc::now());

        active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::SubJobUpdated(sub_job_id))
            .await;

        Ok(())
    }

    /// Deletes a sub-job unless work items still reference it.
    #[instrument(skip(self))]
    pub async fn delete_sub_job(&self, sub_job_id: Uuid) -> Result<(), ServiceError> {
        let db = self.connection();

        let model = SubJobEntity::find_by_id(sub_job_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Sub-job {} not found", sub_job_id)))?;

        let referencing = work_item::Entity::find()
            .filter(work_item::Column::SubJobId.eq(sub_job_id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        if referencing > 0 {
            return Err(ServiceError::ReferentialIntegrity(format!(
                "Sub-job {} is referenced by {} work item(s)",
                sub_job_id, referencing
            )));
        }

        model.delete(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::SubJobDeleted(sub_job_id))
            .await;

        Ok(())
    }

    fn connection(&self) -> &DatabaseConnection {
        self.db_pool.as_ref()
    }
}
