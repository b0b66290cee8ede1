use crate::{
    db::DbPool,
    entities::{cost_code, project, project::Entity as ProjectEntity, sub_job, work_item},
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

/// Input payload for creating a project
#[derive(Debug, Clone)]
pub struct CreateProjectInput {
    pub name: String,
    pub description: Option<String>,
}

/// Input payload for updating a project
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Service for managing projects
#[derive(Clone)]
pub struct ProjectService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ProjectService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a project.
    #[instrument(skip(self, input))]
    pub async fn create_project(
        &self,
        input: CreateProjectInput,
    ) -> Result<project::Model, ServiceError> {
        let db = self.connection();

        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Project name must not be blank".to_string(),
            ));
        }

        let now = Utc::now();
        let model = project::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::ProjectCreated(created.id))
            .await;

        Ok(created)
    }

    /// Fetches a project by identifier.
    #[instrument(skip(self))]
    pub async fn get_project(
        &self,
        project_id: &Uuid,
    ) -> Result<Option<project::Model>, ServiceError> {
        let db = self.connection();
        ProjectEntity::find_by_id(*project_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Returns paginated projects, newest first.
    #[instrument(skip(self))]
    pub async fn list_projects(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<project::Model>, u64), ServiceError> {
        let db = self.connection();
        let limit = limit.max(1);
        let page = page.max(1) - 1;
        let paginator = ProjectEntity::find()
            .order_by_desc(project::Column::CreatedAt)
            .paginate(db, limit);

        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let projects = paginator
            .fetch_page(page)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((projects, total))
    }

    /// Applies updates to a project.
    #[instrument(skip(self, input))]
    pub async fn update_project(
        &self,
        project_id: Uuid,
        input: UpdateProjectInput,
    ) -> Result<(), ServiceError> {
        let db = self.connection();
        let model = ProjectEntity::find_by_id(project_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Project {} not found", project_id)))?;

        let mut active = model.into_active_model();
        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Project name must not be blank".to_string(),
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
            .send_or_log(Event::ProjectUpdated(project_id))
            .await;

        Ok(())
    }

    /// Deletes a project unless sub-jobs, cost codes, or work items still
    /// reference it.
    #[instrument(skip(self))]
    pub async fn delete_project(&self, project_id: Uuid) -> Result<(), ServiceError> {
        let db = self.connection();

        let model = ProjectEntity::find_by_id(project_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Project {} not found", project_id)))?;

        let sub_jobs = sub_job::Entity::find()
            .filter(sub_job::Column::ProjectId.eq(project_id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let cost_codes = cost_code::Entity::find()
            .filter(cost_code::Column::ProjectId.eq(project_id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let work_items = work_item::Entity::find()
            .filter(work_item::Column::ProjectId.eq(project_id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        if sub_jobs > 0 || cost_codes > 0 || work_items > 0 {
            return Err(ServiceError::ReferentialIntegrity(format!(
                "Project {} still has {} sub-job(s), {} cost code(s), {} work item(s)",
                project_id, sub_jobs, cost_codes, work_items
            )));
        }

        model.delete(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::ProjectDeleted(project_id))
            .await;

        Ok(())
    }

    fn connection(&self) -> &DatabaseConnection {
        self.db_pool.as_ref()
    }
}
