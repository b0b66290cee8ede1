use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sub_job::Entity")]
    SubJob,
    #[sea_orm(has_many = "super::cost_code::Entity")]
    CostCode,
    #[sea_orm(has_many = "super::work_item::Entity")]
    WorkItem,
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

impl Related<super::work_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
