use sea_orm_migration::prelude::*;

mod m20250901_000001_create_identities;
mod m20250901_000002_create_lecturer_profiles;
mod m20250901_000003_create_student_profiles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_identities::Migration),
            Box::new(m20250901_000002_create_lecturer_profiles::Migration),
            Box::new(m20250901_000003_create_student_profiles::Migration),
        ]
    }
}
