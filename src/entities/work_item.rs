use crate::progress::ProgressMap;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub identifier: String,
    pub description: String,
    pub project_id: Uuid,
    pub sub_job_id: Uuid,
    pub cost_code_id: Uuid,
    pub budgeted_quantity: Option<f64>,
    pub unit_of_measure: Option<String>,
    pub budgeted_man_hours: Option<f64>,
    /// Derived; written only by the recompute path
    pub earned_quantity: f64,
    /// Derived; written only by the recompute path
    pub earned_man_hours: f64,
    /// Step name -> percent complete; JSON in the row, typed in memory
    pub progress: ProgressMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
    #[sea_orm(
        belongs_to = "super::sub_job::Entity",
        from = "Column::SubJobId",
        to = "super::sub_job::Column::Id"
    )]
    SubJob,
    #[sea_orm(
        belongs_to = "super::cost_code::Entity",
        from = "Column::CostCodeId",
        to = "super::cost_code::Column::Id"
    )]
    CostCode,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::sub_job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubJob.def()
    }
}

impl Related<super::cost_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CostCode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
