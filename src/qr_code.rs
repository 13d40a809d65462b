//! QR code lifecycle.
//!
//! A code is issued for one card and lives until it expires, is deleted, or,
//! when disposable, is consumed by its first successful check:
//!
//! ```text
//! Active --check (expired)------> Deleted   (403)
//! Active --check (disposable)---> Deleted   (200 + card)
//! Active --check (reusable)-----> Active    (200 + card)
//! Active --delete---------------> Deleted
//! ```
//!
//! The code row and its association row are always written and removed
//! together inside one transaction.

use crate::card::VirtualCardDto;
use crate::entities;
use crate::errors::CardError;
use crate::settings::QrCode as QrCfg;
use crate::storage;
use chrono::{DateTime, Duration, TimeZone, Utc};
use image::{imageops, DynamicImage, ImageFormat, Luma};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Public view of a stored code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeInfo {
    pub id: i64,
    pub is_disposable: bool,
    pub expire_time: DateTime<Utc>,
    #[serde(rename = "qrCodeURL")]
    pub qr_code_url: String,
}

pub fn qr_code_url_for(id: i64) -> String {
    format!("/qr-code/get-image/{}", id)
}

impl From<entities::qr_code::Model> for QrCodeInfo {
    fn from(model: entities::qr_code::Model) -> Self {
        Self {
            id: model.id,
            is_disposable: model.is_disposable,
            expire_time: Utc
                .timestamp_opt(model.expire_time, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            qr_code_url: qr_code_url_for(model.id),
        }
    }
}

/// Issues a new code for `card_id`, valid for the configured number of hours.
pub async fn generate(
    db: &DatabaseConnection,
    cfg: &QrCfg,
    card_id: i64,
    is_disposable: bool,
) -> Result<i64, CardError> {
    if storage::get_card(db, card_id).await?.is_none() {
        return Err(CardError::card_not_found());
    }

    let expire_time = Duration::try_hours(cfg.expire_hours)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| {
            CardError::Other(format!(
                "QR code lifetime of {} hours is out of range",
                cfg.expire_hours
            ))
        })?
        .timestamp();
    let code = storage::create_qr_code_for_card(db, card_id, is_disposable, expire_time).await?;

    tracing::info!(
        card_id,
        qr_code_id = code.id,
        is_disposable,
        expire_time,
        "Issued QR code"
    );
    Ok(code.id)
}

/// Renders the code's id as a JPEG QR symbol of the configured size.
pub async fn render_image(
    db: &DatabaseConnection,
    cfg: &QrCfg,
    qr_code_id: i64,
) -> Result<Vec<u8>, CardError> {
    let code = storage::get_qr_code(db, qr_code_id)
        .await?
        .ok_or_else(CardError::qr_code_not_found)?;

    encode_jpeg(&code.id.to_string(), cfg.width, cfg.height)
}

/// Encodes `payload` into a QR symbol and serializes it as a `width` x `height` JPEG.
pub fn encode_jpeg(payload: &str, width: u32, height: u32) -> Result<Vec<u8>, CardError> {
    let symbol = qrcode::QrCode::new(payload.as_bytes())?
        .render::<Luma<u8>>()
        .min_dimensions(width, height)
        .build();

    // The renderer works in whole modules, so scale to the exact size asked for
    let sized = imageops::resize(&symbol, width, height, imageops::FilterType::Nearest);

    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(sized).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)?;
    Ok(bytes)
}

pub async fn get_info(db: &DatabaseConnection, qr_code_id: i64) -> Result<QrCodeInfo, CardError> {
    let code = storage::get_qr_code(db, qr_code_id)
        .await?
        .ok_or_else(CardError::qr_code_not_found)?;
    Ok(code.into())
}

/// Every code issued for a card. Unknown cards simply have none.
pub async fn list_info(db: &DatabaseConnection, card_id: i64) -> Result<Vec<QrCodeInfo>, CardError> {
    let codes = storage::get_qr_codes_for_card(db, card_id).await?;
    Ok(codes.into_iter().map(QrCodeInfo::from).collect())
}

/// Checks a scanned code and resolves it to its card.
///
/// Expired codes are removed and rejected. Disposable codes are removed and
/// accepted; the removal is guarded, so when two checks race on one
/// disposable code only the one whose delete hits the row succeeds. The
/// other sees the code as gone or, on SQLite, fails its write with a busy
/// error.
pub async fn validate(db: &DatabaseConnection, qr_code_id: i64) -> Result<VirtualCardDto, CardError> {
    let txn = db.begin().await?;

    let (card_id, code) = storage::get_qr_code_with_card_id(&txn, qr_code_id)
        .await?
        .ok_or_else(CardError::qr_code_not_found)?;

    let card = storage::get_card(&txn, card_id)
        .await?
        .ok_or_else(CardError::qr_code_not_found)?;

    let now = Utc::now().timestamp();
    if code.expire_time < now {
        storage::remove_qr_code(&txn, qr_code_id).await?;
        txn.commit().await?;
        tracing::info!(card_id, qr_code_id, "Rejected expired QR code");
        return Err(CardError::Expired("QR Code expired!".to_string()));
    }

    if code.is_disposable {
        if let Err(e) = consume(&txn, qr_code_id).await {
            txn.rollback().await?;
            return Err(e);
        }
        txn.commit().await?;
        tracing::info!(card_id, qr_code_id, "Consumed disposable QR code");
    } else {
        txn.commit().await?;
        tracing::debug!(card_id, qr_code_id, "Accepted QR code");
    }

    Ok(card.to_dto())
}

/// Removes a disposable code on its accepted check. A code some other check
/// already removed is reported as not found.
async fn consume<C: ConnectionTrait>(db: &C, qr_code_id: i64) -> Result<(), CardError> {
    if !storage::remove_qr_code(db, qr_code_id).await? {
        return Err(CardError::qr_code_not_found());
    }
    Ok(())
}

pub async fn delete(db: &DatabaseConnection, qr_code_id: i64) -> Result<(), CardError> {
    if !storage::delete_qr_code(db, qr_code_id).await? {
        return Err(CardError::qr_code_not_found());
    }
    tracing::info!(qr_code_id, "Deleted QR code");
    Ok(())
}
