use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubJobs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SubJobs::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(SubJobs::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(SubJobs::Name).string().not_null())
                    .col(ColumnDef::new(SubJobs::Description).text().null())
                    .col(
                        ColumnDef::new(SubJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubJobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sub_jobs_project")
                            .from(SubJobs::Table, SubJobs::ProjectId)
                            .to(Projects::Table, Projects::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sub_jobs_project_id")
                    .table(SubJobs::Table)
                    .col(SubJobs::ProjectId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SubJobs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SubJobs {
    Table,
    Id,
    ProjectId,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
}
