use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Cascades on virtual_card_qr_codes rely on this for SQLite
        if manager.get_database_backend() == sea_orm::DatabaseBackend::Sqlite {
            manager
                .get_connection()
                .execute_unprepared("PRAGMA foreign_keys = ON")
                .await?;
        }

        // Ids are handed out by the `virtual_card_id` sequence, never by the table
        manager
            .create_table(
                Table::create()
                    .table(VirtualCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VirtualCards::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(VirtualCards::CardType))
                    .col(big_integer(VirtualCards::UserId))
                    .col(string(VirtualCards::Privilege))
                    .col(string(VirtualCards::Status))
                    .col(string(VirtualCards::IdText))
                    .col(string(VirtualCards::UsernameText))
                    .col(string(VirtualCards::PrivilegeText))
                    .col(string(VirtualCards::RoleText))
                    .col(string(VirtualCards::TextColor))
                    .col(string_null(VirtualCards::BackgroundColor))
                    .col(string_null(VirtualCards::ImageUrl))
                    .col(blob_null(VirtualCards::Image))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_virtual_cards_user_id")
                    .table(VirtualCards::Table)
                    .col(VirtualCards::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sequences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sequences::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(big_integer(Sequences::Value))
                    .to_owned(),
            )
            .await?;

        let seed = Query::insert()
            .into_table(Sequences::Table)
            .columns([Sequences::Name, Sequences::Value])
            .values_panic(["virtual_card_id".into(), 0i64.into()])
            .to_owned();
        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sequences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VirtualCards::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VirtualCards {
    Table,
    Id,
    CardType,
    UserId,
    Privilege,
    Status,
    IdText,
    UsernameText,
    PrivilegeText,
    RoleText,
    TextColor,
    BackgroundColor,
    ImageUrl,
    Image,
}

#[derive(DeriveIden)]
enum Sequences {
    Table,
    Name,
    Value,
}
