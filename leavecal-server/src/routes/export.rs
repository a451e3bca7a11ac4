//! Calendar export endpoint

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    routing::post,
};
use chrono::Utc;
use leavecal_core::sync::{RecordFilter, SyncMode};
use leavecal_core::{ExportError, ExportOutcome, SyncRequest};
use serde::{Deserialize, Serialize};

use crate::routes::AppError;
use crate::state::AppState;

pub const TENANT_HEADER: &str = "x-tenant-id";

pub fn router() -> Router<AppState> {
    Router::new().route("/calendar/export", post(export_calendar))
}

fn yes() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    #[serde(default)]
    pub recipient_email: Option<String>,
    #[serde(default)]
    pub send_mode: SyncMode,
    #[serde(default = "yes")]
    pub include_leaves: bool,
    #[serde(default = "yes")]
    pub include_holidays: bool,
    #[serde(default)]
    pub location_filter: Option<String>,
    #[serde(default)]
    pub download_only: bool,
}

impl From<ExportRequest> for SyncRequest {
    fn from(req: ExportRequest) -> Self {
        let filter = RecordFilter {
            include_leaves: req.include_leaves,
            include_holidays: req.include_holidays,
            location: None,
        }
        .with_location(req.location_filter.as_deref());

        SyncRequest {
            recipient: req.recipient_email,
            mode: req.send_mode,
            filter,
            download_only: req.download_only,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub success: bool,
    pub message: String,
    pub leave_count: usize,
    pub holiday_count: usize,
    pub total_events: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Only for downloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ics_content: Option<String>,
}

impl From<ExportOutcome> for ExportResponse {
    fn from(outcome: ExportOutcome) -> Self {
        let ics_content = outcome
            .delivered_to
            .is_none()
            .then(|| outcome.document.content.clone());

        ExportResponse {
            success: true,
            message: outcome.message(),
            leave_count: outcome.leave_count(),
            holiday_count: outcome.holiday_count(),
            total_events: outcome.total_events(),
            warning: outcome.warning(),
            ics_content,
        }
    }
}

/// POST /calendar/export - Render the tenant's calendar and email or return it
async fn export_calendar(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Json<ExportResponse>, AppError> {
    let Json(body) = body.map_err(|rejection| ExportError::InvalidRequest(rejection.body_text()))?;

    let tenant_id = headers
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ExportError::InvalidRequest(format!("Missing {} header", TENANT_HEADER)))?;

    let tenant = state
        .tenant(tenant_id)
        .ok_or_else(|| ExportError::UnknownTenant(tenant_id.to_string()))?;

    let request = SyncRequest::from(body);
    let outcome = state
        .exporter()
        .export(tenant, &request, Utc::now())
        .await?;

    Ok(Json(ExportResponse::from(outcome)))
}
