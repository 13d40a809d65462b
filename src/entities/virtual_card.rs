use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Discriminant of the two card variants. Serialized as the `type` field of
/// every card representation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum CardType {
    #[sea_orm(string_value = "COLOR_BASED")]
    #[serde(rename = "COLOR_BASED")]
    ColorBased,
    #[sea_orm(string_value = "IMAGE_BASED")]
    #[serde(rename = "IMAGE_BASED")]
    ImageBased,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum CardPrivilege {
    #[sea_orm(string_value = "CARD_PRIVILEGE_STANDARD")]
    #[serde(rename = "CARD_PRIVILEGE_STANDARD")]
    Standard,
    #[sea_orm(string_value = "CARD_PRIVILEGE_SILVER")]
    #[serde(rename = "CARD_PRIVILEGE_SILVER")]
    Silver,
    #[sea_orm(string_value = "CARD_PRIVILEGE_GOLD")]
    #[serde(rename = "CARD_PRIVILEGE_GOLD")]
    Gold,
    #[sea_orm(string_value = "CARD_PRIVILEGE_PLATINUM")]
    #[serde(rename = "CARD_PRIVILEGE_PLATINUM")]
    Platinum,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum CardStatus {
    #[sea_orm(string_value = "CARD_STATUS_WAITING")]
    #[serde(rename = "CARD_STATUS_WAITING")]
    Waiting,
    #[sea_orm(string_value = "CARD_STATUS_ACTIVE")]
    #[serde(rename = "CARD_STATUS_ACTIVE")]
    Active,
    #[sea_orm(string_value = "CARD_STATUS_BLOCKED")]
    #[serde(rename = "CARD_STATUS_BLOCKED")]
    Blocked,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "virtual_cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub card_type: CardType,
    pub user_id: i64,
    pub privilege: CardPrivilege,
    pub status: CardStatus,
    pub id_text: String,        // JSON: CardText
    pub username_text: String,  // JSON: CardText
    pub privilege_text: String, // JSON: CardText
    pub role_text: String,      // JSON: CardText
    pub text_color: String,
    pub background_color: Option<String>, // COLOR_BASED only
    pub image_url: Option<String>,        // IMAGE_BASED only
    pub image: Option<Vec<u8>>,           // IMAGE_BASED only
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::virtual_card_qr_code::Entity")]
    VirtualCardQrCode,
}

impl Related<super::virtual_card_qr_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VirtualCardQrCode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
