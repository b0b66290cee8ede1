use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CostCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CostCodes::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    // Cost code identifiers are unique system-wide, not per project
                    .col(
                        ColumnDef::new(CostCodes::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(CostCodes::Description).text().null())
                    .col(ColumnDef::new(CostCodes::Discipline).string().not_null())
                    .col(ColumnDef::new(CostCodes::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(CostCodes::RuleOfCreditId).uuid().null())
                    .col(
                        ColumnDef::new(CostCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CostCodes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cost_codes_project")
                            .from(CostCodes::Table, CostCodes::ProjectId)
                            .to(Projects::Table, Projects::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cost_codes_rule_of_credit")
                            .from(CostCodes::Table, CostCodes::RuleOfCreditId)
                            .to(RulesOfCredit::Table, RulesOfCredit::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cost_codes_project_id")
                    .table(CostCodes::Table)
                    .col(CostCodes::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cost_codes_rule_of_credit_id")
                    .table(CostCodes::Table)
                    .col(CostCodes::RuleOfCreditId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CostCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CostCodes {
    Table,
    Id,
    Code,
    Description,
    Discipline,
    ProjectId,
    RuleOfCreditId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
}

#[derive(Iden)]
enum RulesOfCredit {
    Table,
    Id,
}
