use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LecturerProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LecturerProfiles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LecturerProfiles::IdentityId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LecturerProfiles::StaffNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LecturerProfiles::FullName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LecturerProfiles::Department)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LecturerProfiles::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(LecturerProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lecturer_profiles_identity_id")
                            .from(LecturerProfiles::Table, LecturerProfiles::IdentityId)
                            .to(Identities::Table, Identities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(LecturerProfiles::Table)
                    .col(LecturerProfiles::IdentityId)
                    .name("uq_lecturer_profiles_identity_id")
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(LecturerProfiles::Table)
                    .col(LecturerProfiles::StaffNumber)
                    .name("uq_lecturer_profiles_staff_number")
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(LecturerProfiles::Table)
                    .col(LecturerProfiles::FullName)
                    .name("idx_lecturer_profiles_full_name")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LecturerProfiles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LecturerProfiles {
    Table,
    Id,
    IdentityId,
    StaffNumber,
    FullName,
    Department,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum Identities {
    Table,
    Id,
}
