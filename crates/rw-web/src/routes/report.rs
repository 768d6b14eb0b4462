//! Full-screen report page.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rw_core::report::content_type_for;
use rw_storage::Retrieved;
use tracing::{error, info, warn};

use crate::state::AppState;
use crate::views::{self, ReportPage};

/// GET /report - Fetch the report and render it in a full-screen frame.
pub async fn report_page(State(state): State<AppState>) -> Response {
    let now = state.now();

    let retrieved = match state.reports.retrieve(now).await {
        Ok(r) => r,
        Err(e) => {
            error!(source = %state.reports.describe(), error = %e, "Report retrieval failed");
            return views::error_page(&state, &e, now);
        }
    };

    if let Retrieved::Missing { location } = &retrieved {
        warn!(%location, "No report available yet");
        return views::warning_page(&state, format!("No report found in {}.", location), now);
    }

    let Some(embed) = views::embed_for(&retrieved) else {
        return views::warning_page(&state, "No report to display.".to_string(), now);
    };

    info!(kind = retrieved.kind(), "Rendering report page");
    let page = ReportPage {
        title: state.config.page.title.clone(),
        frame_src: embed.src().to_string(),
        frame_title: "report".to_string(),
        caption: views::caption_for(&state, &retrieved),
        refresh: views::refresh_view(&state, now),
    };
    views::render(&page, StatusCode::OK)
}

/// GET /report/file/{name} - Stream the latest local report, typed by extension.
pub async fn report_file(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.reports.read_local(&name).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, content_type_for(&name).to_string()),
                (header::CONTENT_DISPOSITION, format!("inline; filename=\"{}\"", name.replace('"', ""))),
                (header::CACHE_CONTROL, "no-store".to_string()),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            warn!(file = %name, error = %e, "Local report not served");
            let status = StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, e.user_message()).into_response()
        }
    }
}
