use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StudentProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentProfiles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StudentProfiles::IdentityId).uuid().not_null())
                    .col(
                        ColumnDef::new(StudentProfiles::StudentNumber)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentProfiles::FullName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentProfiles::EnrollmentYear)
                            .string_len(4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentProfiles::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(StudentProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_profiles_identity_id")
                            .from(StudentProfiles::Table, StudentProfiles::IdentityId)
                            .to(Identities::Table, Identities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(StudentProfiles::Table)
                    .col(StudentProfiles::IdentityId)
                    .name("uq_student_profiles_identity_id")
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(StudentProfiles::Table)
                    .col(StudentProfiles::StudentNumber)
                    .name("uq_student_profiles_student_number")
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Backs the cohort listing order (enrollment_year DESC, full_name ASC).
        manager
            .create_index(
                Index::create()
                    .table(StudentProfiles::Table)
                    .col(StudentProfiles::EnrollmentYear)
                    .col(StudentProfiles::FullName)
                    .name("idx_student_profiles_cohort")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StudentProfiles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum StudentProfiles {
    Table,
    Id,
    IdentityId,
    StudentNumber,
    FullName,
    EnrollmentYear,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum Identities {
    Table,
    Id,
}
