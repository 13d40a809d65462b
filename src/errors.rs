use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CardError {
    #[error("I/O error: {0}")]
    #[diagnostic(code(virtualcard::io))]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    #[diagnostic(code(virtualcard::config))]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(virtualcard::serde))]
    Serde(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    #[diagnostic(code(virtualcard::db))]
    Db(#[from] sea_orm::DbErr),

    #[error("QR encoding error: {0}")]
    #[diagnostic(code(virtualcard::qr_encode))]
    QrEncode(#[from] qrcode::types::QrError),

    #[error("Image error: {0}")]
    #[diagnostic(code(virtualcard::image))]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    #[diagnostic(code(virtualcard::not_found))]
    NotFound(String),

    #[error("{0}")]
    #[diagnostic(code(virtualcard::bad_request))]
    BadRequest(String),

    #[error("{0}")]
    #[diagnostic(
        code(virtualcard::expired),
        help("Issue a new QR code for the card")
    )]
    Expired(String),

    #[error("{0}")]
    #[diagnostic(code(virtualcard::other))]
    Other(String),
}

impl CardError {
    pub fn card_not_found() -> Self {
        CardError::NotFound("Virtual Card not found.".to_string())
    }

    pub fn qr_code_not_found() -> Self {
        CardError::NotFound("QR Code not found.".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CardError::NotFound(_) => StatusCode::NOT_FOUND,
            CardError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CardError::Expired(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CardError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error.".to_string()
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
            self.to_string()
        };
        let body = json!({ "message": message });
        (status, Json(body)).into_response()
    }
}
