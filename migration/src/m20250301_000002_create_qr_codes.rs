use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite only autoincrements an INTEGER PRIMARY KEY
        let id_col = match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => ColumnDef::new(QrCodes::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key()
                .to_owned(),
            _ => ColumnDef::new(QrCodes::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key()
                .to_owned(),
        };

        manager
            .create_table(
                Table::create()
                    .table(QrCodes::Table)
                    .if_not_exists()
                    .col(id_col)
                    .col(boolean(QrCodes::IsDisposable))
                    .col(big_integer(QrCodes::ExpireTime))
                    .col(big_integer(QrCodes::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_qr_codes_expire_time")
                    .table(QrCodes::Table)
                    .col(QrCodes::ExpireTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VirtualCardQrCodes::Table)
                    .if_not_exists()
                    .col(big_integer(VirtualCardQrCodes::VirtualCardId))
                    .col(big_integer(VirtualCardQrCodes::QrCodeId))
                    .primary_key(
                        Index::create()
                            .col(VirtualCardQrCodes::VirtualCardId)
                            .col(VirtualCardQrCodes::QrCodeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_virtual_card_qr_codes_card")
                            .from(VirtualCardQrCodes::Table, VirtualCardQrCodes::VirtualCardId)
                            .to(VirtualCards::Table, VirtualCards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_virtual_card_qr_codes_qr_code")
                            .from(VirtualCardQrCodes::Table, VirtualCardQrCodes::QrCodeId)
                            .to(QrCodes::Table, QrCodes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A code belongs to exactly one card
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_virtual_card_qr_codes_qr_code")
                    .table(VirtualCardQrCodes::Table)
                    .col(VirtualCardQrCodes::QrCodeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VirtualCardQrCodes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(QrCodes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum QrCodes {
    Table,
    Id,
    IsDisposable,
    ExpireTime,
    CreatedAt,
}

#[derive(DeriveIden)]
enum VirtualCardQrCodes {
    Table,
    VirtualCardId,
    QrCodeId,
}

#[derive(DeriveIden)]
enum VirtualCards {
    Table,
    Id,
}
