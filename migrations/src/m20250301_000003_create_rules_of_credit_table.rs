use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RulesOfCredit::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RulesOfCredit::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RulesOfCredit::Name).string().not_null())
                    .col(ColumnDef::new(RulesOfCredit::Description).text().null())
                    // Ordered step list persisted as a JSON array of {name, weight}
                    .col(ColumnDef::new(RulesOfCredit::Steps).json().not_null())
                    .col(
                        ColumnDef::new(RulesOfCredit::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RulesOfCredit::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RulesOfCredit::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RulesOfCredit {
    Table,
    Id,
    Name,
    Description,
    Steps,
    CreatedAt,
    UpdatedAt,
}
