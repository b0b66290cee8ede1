use crate::{
    db::DbPool,
    entities::{project, sub_job, work_item},
    errors::ServiceError,
    progress::{aggregate, ProgressTotals, WorkItemFigures},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

const DASHBOARD_RECENT_ITEMS: u64 = 10;

/// Condensed work item row for dashboard listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkItemSummary {
    pub id: Uuid,
    pub identifier: String,
    pub description: String,
    pub project_id: Uuid,
    pub sub_job_id: Uuid,
    pub budgeted_man_hours: Option<f64>,
    pub earned_man_hours: f64,
    /// Earned over budgeted hours; 0 when no hours are budgeted
    pub percent_complete: f64,
    pub updated_at: DateTime<Utc>,
}

/// Dashboard view: overall figures plus the most recent work items
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardView {
    pub totals: ProgressTotals,
    pub project_count: u64,
    pub recent_work_items: Vec<WorkItemSummary>,
}

/// Read-only aggregation over work-item earned values.
///
/// The same reduction serves every scope; only the filter differs.
#[derive(Clone)]
pub struct AnalyticsService {
    db_pool: Arc<DbPool>,
}

impl AnalyticsService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Progress totals across every work item in the system.
    #[instrument(skip(self))]
    pub async fn portfolio_progress(&self) -> Result<ProgressTotals, ServiceError> {
        let db = self.connection();
        let items = work_item::Entity::find()
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(aggregate(&Self::figures(&items)))
    }

    /// Progress totals for one project.
    #[instrument(skip(self))]
    pub async fn project_progress(&self, project_id: Uuid) -> Result<ProgressTotals, ServiceError> {
        let db = self.connection();

        let exists = project::Entity::find_by_id(project_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if exists.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Project {} not found",
                project_id
            )));
        }

        let items = work_item::Entity::find()
            .filter(work_item::Column::ProjectId.eq(project_id))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(aggregate(&Self::figures(&items)))
    }

    /// Progress totals for one sub-job.
    #[instrument(skip(self))]
    pub async fn sub_job_progress(&self, sub_job_id: Uuid) -> Result<ProgressTotals, ServiceError> {
        let db = self.connection();

        let exists = sub_job::Entity::find_by_id(sub_job_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if exists.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Sub-job {} not found",
                sub_job_id
            )));
        }

        let items = work_item::Entity::find()
            .filter(work_item::Column::SubJobId.eq(sub_job_id))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(aggregate(&Self::figures(&items)))
    }

    /// Dashboard: overall progress plus the latest work items, optionally
    /// restricted to one project.
    #[instrument(skip(self))]
    pub async fn dashboard(
        &self,
        project_id: Option<Uuid>,
    ) -> Result<DashboardView, ServiceError> {
        let db = self.connection();

        let mut scope = work_item::Entity::find();
        if let Some(project_id) = project_id {
            let exists = project::Entity::find_by_id(project_id)
                .one(db)
                .await
                .map_err(ServiceError::db_error)?;
            if exists.is_none() {
                return Err(ServiceError::NotFound(format!(
                    "Project {} not found",
                    project_id
                )));
            }
            scope = scope.filter(work_item::Column::ProjectId.eq(project_id));
        }

        let items = scope
            .clone()
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;
        let totals = aggregate(&Self::figures(&items));

        let recent = scope
            .order_by_desc(work_item::Column::CreatedAt)
            .limit(DASHBOARD_RECENT_ITEMS)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let project_count = match project_id {
            Some(_) => 1,
            None => project::Entity::find()
                .count(db)
                .await
                .map_err(ServiceError::db_error)?,
        };

        Ok(DashboardView {
            totals,
            project_count,
            recent_work_items: recent.into_iter().map(Self::summarize).collect(),
        })
    }

    fn figures(items: &[work_item::Model]) -> Vec<WorkItemFigures> {
        items
            .iter()
            .map(|item| WorkItemFigures {
                budgeted_man_hours: item.budgeted_man_hours,
                earned_man_hours: item.earned_man_hours,
                budgeted_quantity: item.budgeted_quantity,
                earned_quantity: item.earned_quantity,
            })
            .collect()
    }

    fn summarize(item: work_item::Model) -> WorkItemSummary {
        let percent_complete = match item.budgeted_man_hours {
            Some(budget) if budget > 0.0 => 100.0 * item.earned_man_hours / budget,
            _ => 0.0,
        };
        WorkItemSummary {
            id: item.id,
            identifier: item.identifier,
            description: item.description,
            project_id: item.project_id,
            sub_job_id: item.sub_job_id,
            budgeted_man_hours: item.budgeted_man_hours,
            earned_man_hours: item.earned_man_hours,
            percent_complete,
            updated_at: item.updated_at,
        }
    }

    fn connection(&self) -> &DatabaseConnection {
        self.db_pool.as_ref()
    }
}
