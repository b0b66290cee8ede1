use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fixed discipline classification for cost codes.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Discipline {
    #[sea_orm(string_value = "civil")]
    Civil,
    #[sea_orm(string_value = "structural")]
    Structural,
    #[sea_orm(string_value = "piping")]
    Piping,
    #[sea_orm(string_value = "mechanical")]
    Mechanical,
    #[sea_orm(string_value = "electrical")]
    Electrical,
    #[sea_orm(string_value = "instrumentation")]
    Instrumentation,
    #[sea_orm(string_value = "insulation")]
    Insulation,
    #[sea_orm(string_value = "painting")]
    Painting,
    #[sea_orm(string_value = "scaffolding")]
    Scaffolding,
    #[sea_orm(string_value = "general")]
    General,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cost_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Unique across the whole system, not per project
    #[sea_orm(unique)]
    pub code: String,
    pub description: Option<String>,
    pub discipline: Discipline,
    pub project_id: Uuid,
    pub rule_of_credit_id: Option<Uuid>,
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
        belongs_to = "super::rule_of_credit::Entity",
        from = "Column::RuleOfCreditId",
        to = "super::rule_of_credit::Column::Id"
    )]
    RuleOfCredit,
    #[sea_orm(has_many = "super::work_item::Entity")]
    WorkItem,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::rule_of_credit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RuleOfCredit.def()
    }
}

impl Related<super::work_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
