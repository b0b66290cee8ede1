pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_projects_table;
mod m20250301_000002_create_sub_jobs_table;
mod m20250301_000003_create_rules_of_credit_table;
mod m20250301_000004_create_cost_codes_table;
mod m20250301_000005_create_work_items_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_projects_table::Migration),
            Box::new(m20250301_000002_create_sub_jobs_table::Migration),
            Box::new(m20250301_000003_create_rules_of_credit_table::Migration),
            Box::new(m20250301_000004_create_cost_codes_table::Migration),
            Box::new(m20250301_000005_create_work_items_table::Migration),
        ]
    }
}
