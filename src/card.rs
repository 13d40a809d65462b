//! Virtual card domain model.
//!
//! A card is one record with a closed, two-case style: flat colors or a
//! user-supplied background image. The same shape appears in three places:
//! the database row ([`entities::virtual_card::Model`]), the domain value
//! ([`VirtualCard`]) and the JSON representation ([`VirtualCardDto`]), whose
//! `type` field carries the discriminant.

use crate::entities;
use crate::entities::virtual_card::{CardPrivilege, CardStatus, CardType};
use crate::errors::CardError;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Placement and styling of one text overlay on the rendered card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardText {
    pub px_size: i32,
    pub is_bold: bool,
    pub position_x: i32,
    pub position_y: i32,
}

impl CardText {
    pub const fn new(px_size: i32, is_bold: bool, position_x: i32, position_y: i32) -> Self {
        Self {
            px_size,
            is_bold,
            position_x,
            position_y,
        }
    }
}

pub const DEFAULT_ID_TEXT: CardText = CardText::new(20, false, 50, -50);
pub const DEFAULT_USERNAME_TEXT: CardText = CardText::new(30, true, 60, 60);
pub const DEFAULT_PRIVILEGE_TEXT: CardText = CardText::new(30, false, 30, 80);
pub const DEFAULT_ROLE_TEXT: CardText = CardText::new(25, false, -40, -40);
pub const DEFAULT_TEXT_COLOR: &str = "black";
pub const DEFAULT_BACKGROUND_COLOR: &str = "white";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardStyle {
    ColorBased {
        text_color: String,
        background_color: String,
    },
    ImageBased {
        text_color: String,
        /// Set when an image is uploaded, never taken from client input
        image_url: Option<String>,
        image: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualCard {
    pub id: i64,
    pub user_id: i64,
    pub privilege: CardPrivilege,
    pub status: CardStatus,
    pub id_text: CardText,
    pub username_text: CardText,
    pub privilege_text: CardText,
    pub role_text: CardText,
    pub style: CardStyle,
}

pub fn image_url_for(card_id: i64) -> String {
    format!("/virtual-card/image/get/{}", card_id)
}

impl VirtualCard {
    /// A fresh color-based card with the stock layout.
    pub fn with_defaults(id: i64, user_id: i64) -> Self {
        Self {
            id,
            user_id,
            privilege: CardPrivilege::Standard,
            status: CardStatus::Waiting,
            id_text: DEFAULT_ID_TEXT,
            username_text: DEFAULT_USERNAME_TEXT,
            privilege_text: DEFAULT_PRIVILEGE_TEXT,
            role_text: DEFAULT_ROLE_TEXT,
            style: CardStyle::ColorBased {
                text_color: DEFAULT_TEXT_COLOR.to_string(),
                background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            },
        }
    }

    pub fn card_type(&self) -> CardType {
        match self.style {
            CardStyle::ColorBased { .. } => CardType::ColorBased,
            CardStyle::ImageBased { .. } => CardType::ImageBased,
        }
    }

    pub fn image(&self) -> Option<&[u8]> {
        match &self.style {
            CardStyle::ImageBased { image, .. } => image.as_deref(),
            CardStyle::ColorBased { .. } => None,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match &self.style {
            CardStyle::ImageBased { image_url, .. } => image_url.as_deref(),
            CardStyle::ColorBased { .. } => None,
        }
    }

    fn fields(&self) -> CardFields {
        CardFields {
            id: self.id,
            user_id: self.user_id,
            privilege: self.privilege,
            status: self.status,
            id_text: self.id_text,
            username_text: self.username_text,
            privilege_text: self.privilege_text,
            role_text: self.role_text,
        }
    }

    pub fn to_dto(&self) -> VirtualCardDto {
        let card = self.fields();
        match &self.style {
            CardStyle::ColorBased {
                text_color,
                background_color,
            } => VirtualCardDto::ColorBased(ColorBasedCardDto {
                card,
                text_color: text_color.clone(),
                background_color: background_color.clone(),
            }),
            CardStyle::ImageBased {
                text_color,
                image_url,
                ..
            } => VirtualCardDto::ImageBased(ImageBasedCardDto {
                card,
                text_color: text_color.clone(),
                image_url: image_url.clone(),
            }),
        }
    }

    /// Builds a card from its JSON representation. Image URL and bytes are
    /// store-managed, so an image-based card always starts without them.
    pub fn from_dto(dto: VirtualCardDto) -> Self {
        let (card, style) = match dto {
            VirtualCardDto::ColorBased(c) => (
                c.card,
                CardStyle::ColorBased {
                    text_color: c.text_color,
                    background_color: c.background_color,
                },
            ),
            VirtualCardDto::ImageBased(c) => (
                c.card,
                CardStyle::ImageBased {
                    text_color: c.text_color,
                    image_url: None,
                    image: None,
                },
            ),
        };

        Self {
            id: card.id,
            user_id: card.user_id,
            privilege: card.privilege,
            status: card.status,
            id_text: card.id_text,
            username_text: card.username_text,
            privilege_text: card.privilege_text,
            role_text: card.role_text,
            style,
        }
    }

    pub fn from_model(model: entities::virtual_card::Model) -> Result<Self, CardError> {
        let style = match model.card_type {
            CardType::ColorBased => CardStyle::ColorBased {
                text_color: model.text_color,
                background_color: model.background_color.unwrap_or_default(),
            },
            CardType::ImageBased => CardStyle::ImageBased {
                text_color: model.text_color,
                image_url: model.image_url,
                image: model.image,
            },
        };

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            privilege: model.privilege,
            status: model.status,
            id_text: serde_json::from_str(&model.id_text)?,
            username_text: serde_json::from_str(&model.username_text)?,
            privilege_text: serde_json::from_str(&model.privilege_text)?,
            role_text: serde_json::from_str(&model.role_text)?,
            style,
        })
    }

    /// Every column set, suitable for both insert and full overwrite.
    pub fn to_active_model(&self) -> Result<entities::virtual_card::ActiveModel, CardError> {
        let (text_color, background_color, image_url, image) = match &self.style {
            CardStyle::ColorBased {
                text_color,
                background_color,
            } => (text_color.clone(), Some(background_color.clone()), None, None),
            CardStyle::ImageBased {
                text_color,
                image_url,
                image,
            } => (text_color.clone(), None, image_url.clone(), image.clone()),
        };

        Ok(entities::virtual_card::ActiveModel {
            id: Set(self.id),
            card_type: Set(self.card_type()),
            user_id: Set(self.user_id),
            privilege: Set(self.privilege),
            status: Set(self.status),
            id_text: Set(serde_json::to_string(&self.id_text)?),
            username_text: Set(serde_json::to_string(&self.username_text)?),
            privilege_text: Set(serde_json::to_string(&self.privilege_text)?),
            role_text: Set(serde_json::to_string(&self.role_text)?),
            text_color: Set(text_color),
            background_color: Set(background_color),
            image_url: Set(image_url),
            image: Set(image),
        })
    }

    /// Applies the fields a patch names. The declared type must match the
    /// stored variant; image URL and bytes are never touched.
    pub fn apply_patch(&mut self, patch: CardPatch) -> Result<(), CardError> {
        if patch.card_type != Some(self.card_type()) {
            return Err(CardError::BadRequest(
                "Virtual Card TYPE does not match the stored card.".to_string(),
            ));
        }

        if let Some(user_id) = patch.user_id {
            self.user_id = user_id;
        }
        if let Some(privilege) = patch.privilege {
            self.privilege = privilege;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(text) = patch.id_text {
            self.id_text = text;
        }
        if let Some(text) = patch.username_text {
            self.username_text = text;
        }
        if let Some(text) = patch.privilege_text {
            self.privilege_text = text;
        }
        if let Some(text) = patch.role_text {
            self.role_text = text;
        }

        match &mut self.style {
            CardStyle::ColorBased {
                text_color,
                background_color,
            } => {
                if let Some(color) = patch.text_color {
                    *text_color = color;
                }
                if let Some(color) = patch.background_color {
                    *background_color = color;
                }
            }
            CardStyle::ImageBased { text_color, .. } => {
                if let Some(color) = patch.text_color {
                    *text_color = color;
                }
            }
        }

        Ok(())
    }
}

/// Fields shared by both variants of the JSON representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFields {
    pub id: i64,
    pub user_id: i64,
    pub privilege: CardPrivilege,
    pub status: CardStatus,
    pub id_text: CardText,
    pub username_text: CardText,
    pub privilege_text: CardText,
    pub role_text: CardText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorBasedCardDto {
    #[serde(flatten)]
    pub card: CardFields,
    pub text_color: String,
    pub background_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBasedCardDto {
    #[serde(flatten)]
    pub card: CardFields,
    pub text_color: String,
    #[serde(rename = "imageURL", default)]
    pub image_url: Option<String>,
}

/// Full card representation, used for responses and full replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VirtualCardDto {
    #[serde(rename = "COLOR_BASED")]
    ColorBased(ColorBasedCardDto),
    #[serde(rename = "IMAGE_BASED")]
    ImageBased(ImageBasedCardDto),
}

impl VirtualCardDto {
    pub fn id(&self) -> i64 {
        match self {
            VirtualCardDto::ColorBased(c) => c.card.id,
            VirtualCardDto::ImageBased(c) => c.card.id,
        }
    }

    pub fn validate(&self) -> Result<(), CardError> {
        let text_color = match self {
            VirtualCardDto::ColorBased(c) => {
                if c.background_color.trim().is_empty() {
                    return Err(CardError::BadRequest(
                        "Background Color must not be empty!".to_string(),
                    ));
                }
                &c.text_color
            }
            VirtualCardDto::ImageBased(c) => &c.text_color,
        };
        if text_color.trim().is_empty() {
            return Err(CardError::BadRequest(
                "Text Color must not be empty!".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update. `type` and `id` are mandatory, checked by the card service
/// so the client gets a readable message instead of a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPatch {
    #[serde(rename = "type")]
    pub card_type: Option<CardType>,
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub privilege: Option<CardPrivilege>,
    pub status: Option<CardStatus>,
    pub id_text: Option<CardText>,
    pub username_text: Option<CardText>,
    pub privilege_text: Option<CardText>,
    pub role_text: Option<CardText>,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
}
