use crate::card::{image_url_for, CardPatch, CardStyle, VirtualCard, VirtualCardDto};
use crate::errors::CardError;
use crate::storage;
use sea_orm::{DatabaseConnection, TransactionTrait};

fn not_image_based() -> CardError {
    CardError::BadRequest("Virtual Card is not Image Based.".to_string())
}

/// Allocates the next card id and stores a default color-based card for `user_id`.
pub async fn create(db: &DatabaseConnection, user_id: i64) -> Result<VirtualCard, CardError> {
    let txn = db.begin().await?;
    let id = storage::next_sequence_value(&txn, storage::VIRTUAL_CARD_ID_SEQUENCE).await?;
    let card = VirtualCard::with_defaults(id, user_id);
    storage::insert_card(&txn, &card).await?;
    txn.commit().await?;

    tracing::info!(card_id = id, user_id, "Created virtual card");
    Ok(card)
}

pub async fn get(db: &DatabaseConnection, id: i64) -> Result<VirtualCard, CardError> {
    storage::get_card(db, id)
        .await?
        .ok_or_else(CardError::card_not_found)
}

/// Full replacement under the same id: the old row is deleted and the new
/// one inserted, so codes issued for the old card are unlinked. The variant
/// may change. An uploaded image survives only when the card stays
/// image-based.
pub async fn replace(db: &DatabaseConnection, dto: VirtualCardDto) -> Result<VirtualCard, CardError> {
    dto.validate()?;

    let txn = db.begin().await?;
    let existing = storage::get_card(&txn, dto.id())
        .await?
        .ok_or_else(CardError::card_not_found)?;

    let mut card = VirtualCard::from_dto(dto);
    if let (
        CardStyle::ImageBased {
            image_url: old_url,
            image: old_image,
            ..
        },
        CardStyle::ImageBased {
            image_url, image, ..
        },
    ) = (existing.style, &mut card.style)
    {
        *image_url = old_url;
        *image = old_image;
    }

    storage::delete_card(&txn, card.id).await?;
    storage::insert_card(&txn, &card).await?;
    txn.commit().await?;

    tracing::info!(card_id = card.id, card_type = ?card.card_type(), "Replaced virtual card");
    Ok(card)
}

pub async fn patch(db: &DatabaseConnection, patch: CardPatch) -> Result<VirtualCard, CardError> {
    let id = match (patch.card_type, patch.id) {
        (Some(_), Some(id)) => id,
        _ => {
            return Err(CardError::BadRequest(
                "Virtual Card TYPE and ID must be present.".to_string(),
            ))
        }
    };

    let txn = db.begin().await?;
    let mut card = storage::get_card(&txn, id)
        .await?
        .ok_or_else(CardError::card_not_found)?;
    card.apply_patch(patch)?;
    storage::overwrite_card(&txn, &card).await?;
    txn.commit().await?;

    tracing::debug!(card_id = id, "Patched virtual card");
    Ok(card)
}

/// Removes the card and its code associations. Issued codes themselves are
/// left for explicit deletion or the expiry sweep.
pub async fn delete(db: &DatabaseConnection, id: i64) -> Result<(), CardError> {
    if !storage::delete_card(db, id).await? {
        return Err(CardError::card_not_found());
    }
    tracing::info!(card_id = id, "Deleted virtual card");
    Ok(())
}

pub async fn save_image(
    db: &DatabaseConnection,
    id: i64,
    bytes: Vec<u8>,
) -> Result<VirtualCard, CardError> {
    let mut card = storage::get_card(db, id)
        .await?
        .ok_or_else(not_image_based)?;

    match &mut card.style {
        CardStyle::ImageBased {
            image_url, image, ..
        } => {
            *image_url = Some(image_url_for(id));
            *image = Some(bytes);
        }
        CardStyle::ColorBased { .. } => return Err(not_image_based()),
    }

    storage::overwrite_card(db, &card).await?;
    tracing::info!(card_id = id, size = card.image().map_or(0, <[u8]>::len), "Stored card image");
    Ok(card)
}

pub async fn get_image(db: &DatabaseConnection, id: i64) -> Result<Vec<u8>, CardError> {
    let card = storage::get_card(db, id)
        .await?
        .ok_or_else(not_image_based)?;

    match card.style {
        CardStyle::ImageBased {
            image: Some(image), ..
        } => Ok(image),
        CardStyle::ImageBased { image: None, .. } => Err(CardError::BadRequest(
            "Virtual Card has no image.".to_string(),
        )),
        CardStyle::ColorBased { .. } => Err(not_image_based()),
    }
}
