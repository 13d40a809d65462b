use crate::card::VirtualCard;
use crate::entities;
use crate::errors::CardError;
use crate::settings::Database as DbCfg;
use migration::MigratorTrait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

pub const VIRTUAL_CARD_ID_SEQUENCE: &str = "virtual_card_id";

pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, CardError> {
    let db = Database::connect(&cfg.url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Bumps a named sequence and returns the new value. Call inside a
/// transaction when the value is used for an insert in the same unit.
pub async fn next_sequence_value<C: ConnectionTrait>(db: &C, name: &str) -> Result<i64, CardError> {
    use entities::sequence::{Column, Entity};

    Entity::update_many()
        .col_expr(Column::Value, Expr::col(Column::Value).add(1))
        .filter(Column::Name.eq(name))
        .exec(db)
        .await?;

    let model = Entity::find_by_id(name.to_string())
        .one(db)
        .await?
        .ok_or_else(|| CardError::Other(format!("Unknown sequence: {}", name)))?;

    Ok(model.value)
}

// Card store

pub async fn insert_card<C: ConnectionTrait>(db: &C, card: &VirtualCard) -> Result<(), CardError> {
    let model = card.to_active_model()?;
    entities::VirtualCard::insert(model).exec(db).await?;
    Ok(())
}

pub async fn get_card<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<VirtualCard>, CardError> {
    match entities::VirtualCard::find_by_id(id).one(db).await? {
        Some(model) => Ok(Some(VirtualCard::from_model(model)?)),
        None => Ok(None),
    }
}

/// Rewrites every column of an existing card, including its variant.
pub async fn overwrite_card<C: ConnectionTrait>(db: &C, card: &VirtualCard) -> Result<(), CardError> {
    card.to_active_model()?.update(db).await?;
    Ok(())
}

/// Returns false when there was no such card. Associations go with it.
pub async fn delete_card<C: ConnectionTrait>(db: &C, id: i64) -> Result<bool, CardError> {
    let result = entities::VirtualCard::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

// QR store and card/QR associations

/// Creates a code and its association to `card_id` as one unit.
pub async fn create_qr_code_for_card(
    db: &DatabaseConnection,
    card_id: i64,
    is_disposable: bool,
    expire_time: i64,
) -> Result<entities::qr_code::Model, CardError> {
    let now = chrono::Utc::now().timestamp();
    let txn = db.begin().await?;

    let qr_code = entities::qr_code::ActiveModel {
        is_disposable: Set(is_disposable),
        expire_time: Set(expire_time),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    entities::virtual_card_qr_code::ActiveModel {
        virtual_card_id: Set(card_id),
        qr_code_id: Set(qr_code.id),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(qr_code)
}

pub async fn get_qr_code<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<entities::qr_code::Model>, CardError> {
    Ok(entities::QrCode::find_by_id(id).one(db).await?)
}

/// Every code issued for a card, oldest first.
pub async fn get_qr_codes_for_card<C: ConnectionTrait>(
    db: &C,
    card_id: i64,
) -> Result<Vec<entities::qr_code::Model>, CardError> {
    use entities::qr_code::{Column, Entity, Relation};
    use entities::virtual_card_qr_code::Column as LinkColumn;

    let codes = Entity::find()
        .join(JoinType::InnerJoin, Relation::VirtualCardQrCode.def())
        .filter(LinkColumn::VirtualCardId.eq(card_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await?;

    Ok(codes)
}

/// Looks a code up through its association, returning the owning card id
/// alongside the code.
pub async fn get_qr_code_with_card_id<C: ConnectionTrait>(
    db: &C,
    qr_code_id: i64,
) -> Result<Option<(i64, entities::qr_code::Model)>, CardError> {
    use entities::virtual_card_qr_code::{Column, Entity};

    let found = Entity::find()
        .filter(Column::QrCodeId.eq(qr_code_id))
        .find_also_related(entities::QrCode)
        .one(db)
        .await?;

    Ok(match found {
        Some((link, Some(code))) => Some((link.virtual_card_id, code)),
        _ => None,
    })
}

/// Deletes a code and its association. Returns false if the code row was
/// already gone, which lets callers treat the delete as a guarded consume.
pub async fn remove_qr_code<C: ConnectionTrait>(db: &C, qr_code_id: i64) -> Result<bool, CardError> {
    use entities::virtual_card_qr_code::Column;

    entities::VirtualCardQrCode::delete_many()
        .filter(Column::QrCodeId.eq(qr_code_id))
        .exec(db)
        .await?;

    let result = entities::QrCode::delete_by_id(qr_code_id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

pub async fn delete_qr_code(db: &DatabaseConnection, qr_code_id: i64) -> Result<bool, CardError> {
    let txn = db.begin().await?;
    let removed = remove_qr_code(&txn, qr_code_id).await?;
    txn.commit().await?;
    Ok(removed)
}

/// Removes codes whose expiry is older than `cutoff` (unix seconds).
pub async fn cleanup_expired_qr_codes(db: &DatabaseConnection, cutoff: i64) -> Result<u64, CardError> {
    use entities::qr_code::{Column, Entity};

    let txn = db.begin().await?;

    let ids: Vec<i64> = Entity::find()
        .select_only()
        .column(Column::Id)
        .filter(Column::ExpireTime.lt(cutoff))
        .into_tuple()
        .all(&txn)
        .await?;

    if ids.is_empty() {
        txn.commit().await?;
        return Ok(0);
    }

    entities::VirtualCardQrCode::delete_many()
        .filter(entities::virtual_card_qr_code::Column::QrCodeId.is_in(ids.clone()))
        .exec(&txn)
        .await?;

    let result = Entity::delete_many()
        .filter(Column::Id.is_in(ids))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(result.rows_affected)
}
