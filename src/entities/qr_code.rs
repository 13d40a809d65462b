use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "qr_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub is_disposable: bool,
    pub expire_time: i64, // unix seconds
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::virtual_card_qr_code::Entity")]
    VirtualCardQrCode,
}

impl Related<super::virtual_card_qr_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VirtualCardQrCode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
