//! Migration: Create the reviews table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Reviews::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Reviews::UserId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::Code).text().not_null())
                    .col(ColumnDef::new(Reviews::Review).text().not_null())
                    .col(ColumnDef::new(Reviews::Language).string_len(20).not_null())
                    .col(ColumnDef::new(Reviews::ReviewStyle).string_len(10).null())
                    .col(
                        ColumnDef::new(Reviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reviews::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_user_id")
                            .from(Reviews::Table, Reviews::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Owner-scoped listing is always ordered newest-first
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_user_id_created_at")
                    .table(Reviews::Table)
                    .col(Reviews::UserId)
                    .col(Reviews::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Reviews {
    Table,
    Id,
    UserId,
    Code,
    Review,
    ReviewStyle,
    Language,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
