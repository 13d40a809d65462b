use chrono::Utc;
use sea_orm::DatabaseConnection;
use virtualcard::card::{image_url_for, CardStyle, VirtualCard};
use virtualcard::entities;
use virtualcard::storage;

/// Builder for creating test cards
pub struct CardBuilder {
    user_id: i64,
    style: Option<CardStyle>,
}

impl CardBuilder {
    pub fn new() -> Self {
        Self {
            user_id: 42,
            style: None,
        }
    }

    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_colors(mut self, text_color: &str, background_color: &str) -> Self {
        self.style = Some(CardStyle::ColorBased {
            text_color: text_color.to_string(),
            background_color: background_color.to_string(),
        });
        self
    }

    /// Image-based card without an uploaded image yet
    pub fn image_based(mut self, text_color: &str) -> Self {
        self.style = Some(CardStyle::ImageBased {
            text_color: text_color.to_string(),
            image_url: None,
            image: None,
        });
        self
    }

    /// Image-based card with `bytes` already uploaded
    pub fn with_image(mut self, text_color: &str, bytes: Vec<u8>) -> Self {
        self.style = Some(CardStyle::ImageBased {
            text_color: text_color.to_string(),
            image_url: None,
            image: Some(bytes),
        });
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> VirtualCard {
        let id = storage::next_sequence_value(db, storage::VIRTUAL_CARD_ID_SEQUENCE)
            .await
            .expect("Failed to allocate card id");

        let mut card = VirtualCard::with_defaults(id, self.user_id);
        if let Some(style) = self.style {
            card.style = match style {
                CardStyle::ImageBased {
                    text_color,
                    image: Some(image),
                    ..
                } => CardStyle::ImageBased {
                    text_color,
                    image_url: Some(image_url_for(id)),
                    image: Some(image),
                },
                other => other,
            };
        }

        storage::insert_card(db, &card)
            .await
            .expect("Failed to create test card");
        card
    }
}

impl Default for CardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test QR codes with an arbitrary expiry
pub struct QrCodeBuilder {
    card_id: i64,
    is_disposable: bool,
    expire_time: i64,
}

impl QrCodeBuilder {
    pub fn new(card_id: i64) -> Self {
        Self {
            card_id,
            is_disposable: false,
            expire_time: Utc::now().timestamp() + 3600,
        }
    }

    pub fn disposable(mut self) -> Self {
        self.is_disposable = true;
        self
    }

    /// Expiry `hours` in the past
    pub fn expired_for(mut self, hours: i64) -> Self {
        self.expire_time = Utc::now().timestamp() - hours * 3600;
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> entities::qr_code::Model {
        storage::create_qr_code_for_card(db, self.card_id, self.is_disposable, self.expire_time)
            .await
            .expect("Failed to create test QR code")
    }
}
