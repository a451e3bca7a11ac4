pub mod export;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use leavecal_core::ExportError;
use serde::Serialize;
use tracing::error;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(export::router())
}

/// GET /health
async fn health() -> &'static str {
    "ok"
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

/// Convert anyhow errors to HTTP responses. Export errors keep their stage
/// and get a status matching their kind; anything else is a 500.
pub struct AppError(anyhow::Error);

pub fn status_for(err: &ExportError) -> StatusCode {
    match err {
        ExportError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ExportError::UnknownTenant(_) => StatusCode::FORBIDDEN,
        ExportError::Fetch(_) => StatusCode::BAD_GATEWAY,
        ExportError::Render { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ExportError::Delivery { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, stage) = match self.0.downcast_ref::<ExportError>() {
            Some(err) => (status_for(err), Some(err.stage().to_string())),
            None => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        let body = Json(ErrorResponse {
            success: false,
            message: self.0.to_string(),
            stage,
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
