use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Identities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Identities::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Identities::Email).string().not_null())
                    .col(
                        ColumnDef::new(Identities::CredentialHash)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Identities::Role).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Identities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Authoritative email uniqueness; concurrent creates that both pass the
        // application pre-check are settled here.
        manager
            .create_index(
                Index::create()
                    .table(Identities::Table)
                    .col(Identities::Email)
                    .name("uq_identities_email")
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Identities::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Identities {
    Table,
    Id,
    Email,
    CredentialHash,
    Role,
    CreatedAt,
}
