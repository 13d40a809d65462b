//! HTTP surface. Paths and query parameter names are kept stable for
//! existing clients; every error body is `{"message": ...}`.
use crate::card::{CardPatch, VirtualCardDto};
use crate::card_service;
use crate::errors::CardError;
use crate::qr_code::{self, QrCodeInfo};
use crate::settings::Settings;
use axum::body::Body;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{header, HeaderName, HeaderValue, Request};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use miette::IntoDiagnostic;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DatabaseConnection,
}

// Security headers middleware
async fn security_headers(request: Request<Body>, next: Next) -> impl IntoResponse {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    // Card images and QR codes are served as-is, never embedded by third parties
    headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );

    response
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.settings.server.max_upload_bytes;

    Router::new()
        .route("/virtual-card/post", post(create_card))
        .route("/virtual-card/image/post/{id}", post(save_card_image))
        .route("/virtual-card/image/get/{id}", get(get_card_image))
        .route("/virtual-card/get", get(get_card))
        .route("/virtual-card/put", put(replace_card))
        .route("/virtual-card/patch", patch(patch_card))
        .route("/virtual-card/delete", delete(delete_card))
        .route("/qr-code/post", post(generate_qr_code))
        .route("/qr-code/get-image/{id}", get(get_qr_code_image))
        .route("/qr-code/get-info/{id}", get(get_qr_code_info))
        .route("/qr-code/get-info/all/{card_id}", get(list_qr_code_info))
        .route("/qr-code/check/{id}", get(check_qr_code))
        .route("/qr-code/delete/{id}", delete(delete_qr_code))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(settings: Settings, db: DatabaseConnection) -> miette::Result<()> {
    let addr: SocketAddr = settings
        .listen_addr()
        .parse()
        .map_err(|e| miette::miette!("bad listen addr: {e}"))?;

    let state = AppState {
        settings: Arc::new(settings),
        db,
    };
    let app = router(state);

    tracing::info!(%addr, "Virtual card API listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()?;
    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}

fn bad_query(rejection: QueryRejection) -> CardError {
    CardError::BadRequest(rejection.body_text())
}

fn bad_path(rejection: PathRejection) -> CardError {
    CardError::BadRequest(rejection.body_text())
}

fn bad_json(rejection: JsonRejection) -> CardError {
    CardError::BadRequest(rejection.body_text())
}

fn ack(message: &str) -> Json<Value> {
    Json(json!({ "message": message }))
}

fn jpeg(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCardQuery {
    user_id: i64,
}

#[derive(Debug, Deserialize)]
struct CardIdQuery {
    id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateQuery {
    virtual_card_id: i64,
    is_disposable: bool,
}

// Virtual cards

async fn create_card(
    State(state): State<AppState>,
    query: Result<Query<CreateCardQuery>, QueryRejection>,
) -> Result<Json<VirtualCardDto>, CardError> {
    let Query(q) = query.map_err(bad_query)?;
    let card = card_service::create(&state.db, q.user_id).await?;
    Ok(Json(card.to_dto()))
}

async fn get_card(
    State(state): State<AppState>,
    query: Result<Query<CardIdQuery>, QueryRejection>,
) -> Result<Json<VirtualCardDto>, CardError> {
    let Query(q) = query.map_err(bad_query)?;
    let card = card_service::get(&state.db, q.id).await?;
    Ok(Json(card.to_dto()))
}

async fn replace_card(
    State(state): State<AppState>,
    body: Result<Json<VirtualCardDto>, JsonRejection>,
) -> Result<Json<VirtualCardDto>, CardError> {
    let Json(dto) = body.map_err(bad_json)?;
    let card = card_service::replace(&state.db, dto).await?;
    Ok(Json(card.to_dto()))
}

async fn patch_card(
    State(state): State<AppState>,
    body: Result<Json<CardPatch>, JsonRejection>,
) -> Result<Json<VirtualCardDto>, CardError> {
    let Json(patch) = body.map_err(bad_json)?;
    let card = card_service::patch(&state.db, patch).await?;
    Ok(Json(card.to_dto()))
}

async fn delete_card(
    State(state): State<AppState>,
    query: Result<Query<CardIdQuery>, QueryRejection>,
) -> Result<Json<Value>, CardError> {
    let Query(q) = query.map_err(bad_query)?;
    card_service::delete(&state.db, q.id).await?;
    Ok(ack("Virtual Card deleted."))
}

async fn save_card_image(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, axum::extract::multipart::MultipartRejection>,
) -> Result<Json<VirtualCardDto>, CardError> {
    let Path(id) = id.map_err(bad_path)?;
    let mut multipart = multipart.map_err(|e| CardError::BadRequest(e.body_text()))?;

    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CardError::BadRequest(e.body_text()))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| CardError::BadRequest(e.body_text()))?;
            image = Some(bytes.to_vec());
            break;
        }
    }
    let image = image.ok_or_else(|| CardError::BadRequest("Image file must be present.".to_string()))?;

    let card = card_service::save_image(&state.db, id, image).await?;
    Ok(Json(card.to_dto()))
}

async fn get_card_image(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, CardError> {
    let Path(id) = id.map_err(bad_path)?;
    let bytes = card_service::get_image(&state.db, id).await?;
    Ok(jpeg(bytes))
}

// QR codes

async fn generate_qr_code(
    State(state): State<AppState>,
    query: Result<Query<GenerateQuery>, QueryRejection>,
) -> Result<Json<Value>, CardError> {
    let Query(q) = query.map_err(bad_query)?;
    let id = qr_code::generate(
        &state.db,
        &state.settings.qr_code,
        q.virtual_card_id,
        q.is_disposable,
    )
    .await?;
    Ok(Json(json!({ "message": "QR Code generated.", "id": id })))
}

async fn get_qr_code_image(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, CardError> {
    let Path(id) = id.map_err(bad_path)?;
    let bytes = qr_code::render_image(&state.db, &state.settings.qr_code, id).await?;
    Ok(jpeg(bytes))
}

async fn get_qr_code_info(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<QrCodeInfo>, CardError> {
    let Path(id) = id.map_err(bad_path)?;
    Ok(Json(qr_code::get_info(&state.db, id).await?))
}

async fn list_qr_code_info(
    State(state): State<AppState>,
    card_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<QrCodeInfo>>, CardError> {
    let Path(card_id) = card_id.map_err(bad_path)?;
    Ok(Json(qr_code::list_info(&state.db, card_id).await?))
}

async fn check_qr_code(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<VirtualCardDto>, CardError> {
    let Path(id) = id.map_err(bad_path)?;
    Ok(Json(qr_code::validate(&state.db, id).await?))
}

async fn delete_qr_code(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, CardError> {
    let Path(id) = id.map_err(bad_path)?;
    qr_code::delete(&state.db, id).await?;
    Ok(ack("QR Code deleted."))
}
