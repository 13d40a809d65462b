use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Link between a card and one code issued for it. Removed by the database
/// when either side is deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "virtual_card_qr_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub virtual_card_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub qr_code_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::virtual_card::Entity",
        from = "Column::VirtualCardId",
        to = "super::virtual_card::Column::Id",
        on_delete = "Cascade"
    )]
    VirtualCard,
    #[sea_orm(
        belongs_to = "super::qr_code::Entity",
        from = "Column::QrCodeId",
        to = "super::qr_code::Column::Id",
        on_delete = "Cascade"
    )]
    QrCode,
}

impl Related<super::virtual_card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VirtualCard.def()
    }
}

impl Related<super::qr_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QrCode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
