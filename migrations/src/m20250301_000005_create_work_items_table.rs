use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WorkItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkItems::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WorkItems::Identifier).string().not_null())
                    .col(ColumnDef::new(WorkItems::Description).text().not_null())
                    .col(ColumnDef::new(WorkItems::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(WorkItems::SubJobId).uuid().not_null())
                    .col(ColumnDef::new(WorkItems::CostCodeId).uuid().not_null())
                    .col(ColumnDef::new(WorkItems::BudgetedQuantity).double().null())
                    .col(ColumnDef::new(WorkItems::UnitOfMeasure).string().null())
                    .col(ColumnDef::new(WorkItems::BudgetedManHours).double().null())
                    .col(
                        ColumnDef::new(WorkItems::EarnedQuantity)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(WorkItems::EarnedManHours)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    // Per-step completion percentages persisted as a JSON map of name -> percent
                    .col(ColumnDef::new(WorkItems::Progress).json().not_null())
                    .col(
                        ColumnDef::new(WorkItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WorkItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_items_project")
                            .from(WorkItems::Table, WorkItems::ProjectId)
                            .to(Projects::Table, Projects::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_items_sub_job")
                            .from(WorkItems::Table, WorkItems::SubJobId)
                            .to(SubJobs::Table, SubJobs::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_items_cost_code")
                            .from(WorkItems::Table, WorkItems::CostCodeId)
                            .to(CostCodes::Table, CostCodes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_work_items_project_id")
                    .table(WorkItems::Table)
                    .col(WorkItems::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_work_items_sub_job_id")
                    .table(WorkItems::Table)
                    .col(WorkItems::SubJobId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_work_items_cost_code_id")
                    .table(WorkItems::Table)
                    .col(WorkItems::CostCodeId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkItems::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum WorkItems {
    Table,
    Id,
    Identifier,
    Description,
    ProjectId,
    SubJobId,
    CostCodeId,
    BudgetedQuantity,
    UnitOfMeasure,
    BudgetedManHours,
    EarnedQuantity,
    EarnedManHours,
    Progress,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
}

#[derive(Iden)]
enum SubJobs {
    Table,
    Id,
}

#[derive(Iden)]
enum CostCodes {
    Table,
    Id,
}
