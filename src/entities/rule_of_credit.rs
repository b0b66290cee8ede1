use crate::progress::StepList;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rules_of_credit")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Ordered, weighted step list; JSON in the row, typed in memory
    pub steps: StepList,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cost_code::Entity")]
    CostCode,
}

impl Related<super::cost_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CostCode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
