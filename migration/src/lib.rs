pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_virtual_cards;
mod m20250301_000002_create_qr_codes;
mod m20250301_000003_create_job_executions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_virtual_cards::Migration),
            Box::new(m20250301_000002_create_qr_codes::Migration),
            Box::new(m20250301_000003_create_job_executions::Migration),
        ]
    }
}
