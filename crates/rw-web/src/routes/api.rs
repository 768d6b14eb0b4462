//! JSON status endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rw_core::ReportError;
use rw_storage::Retrieved;
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

/// Report errors as `{"error": code, "message": text}`.
pub struct ApiError(ReportError);

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({
            "error": self.0.code(),
            "message": self.0.user_message(),
        }));
        (status, body).into_response()
    }
}

#[derive(Serialize)]
pub struct ReportStatus {
    pub source: String,
    pub kind: &'static str,
    pub file_name: Option<String>,
    pub last_modified: Option<String>,
    pub signed_url_expires_at: Option<String>,
}

#[derive(Serialize)]
pub struct RefreshStatus {
    pub policy: String,
    pub timezone: String,
    pub next_refresh: Option<String>,
    pub delay_ms: Option<u64>,
}

/// GET /api/report - Describe the current retrieval result.
pub async fn report_status(State(state): State<AppState>) -> Result<Json<ReportStatus>, ApiError> {
    let retrieved = state.reports.retrieve(state.now()).await?;

    let file_name = match &retrieved {
        Retrieved::Inline(object) => Some(object.key.clone()),
        Retrieved::Local(report) => Some(report.file_name.clone()),
        Retrieved::Signed { .. } | Retrieved::Missing { .. } => None,
    };
    let signed_url_expires_at = match &retrieved {
        Retrieved::Signed { url, .. } => Some(url.expires_at.to_rfc3339()),
        _ => None,
    };

    Ok(Json(ReportStatus {
        source: state.reports.describe(),
        kind: retrieved.kind(),
        file_name,
        last_modified: retrieved.last_modified().map(|t| t.to_rfc3339()),
        signed_url_expires_at,
    }))
}

/// GET /api/refresh - Next page reload for the configured policy.
pub async fn refresh_status(State(state): State<AppState>) -> Json<RefreshStatus> {
    let tz = state.config.page.timezone;
    let delay = state.config.refresh.reload_delay(state.now(), tz);

    Json(RefreshStatus {
        policy: state.config.refresh.describe(),
        timezone: tz.name().to_string(),
        next_refresh: delay.as_ref().map(|d| d.at.to_rfc3339()),
        delay_ms: delay.map(|d| d.delay_ms),
    })
}
