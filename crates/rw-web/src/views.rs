//! Page templates and view models.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use rw_core::config::ReportSourceConfig;
use rw_core::report::Embed;
use rw_core::ReportError;
use rw_storage::{uri_encode, Retrieved};
use tracing::error;

use crate::state::AppState;

// ============================================================
// TEMPLATES
// ============================================================

#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportPage {
    pub title: String,
    pub frame_src: String,
    pub frame_title: String,
    pub caption: Option<String>,
    pub refresh: Option<RefreshView>,
}

#[derive(Template)]
#[template(path = "viz.html")]
pub struct VizPage {
    pub title: String,
    pub script_url: String,
    pub viz_url: String,
    pub toolbar: String,
    pub hide_tabs: bool,
    pub height_offset: u32,
    pub refreshed_at: String,
    pub refresh: Option<RefreshView>,
}

#[derive(Template)]
#[template(path = "notice.html")]
pub struct NoticePage {
    pub title: String,
    pub level: &'static str,
    pub icon: &'static str,
    pub message: String,
    pub refresh: Option<RefreshView>,
}

/// Reload timer values for the client-side script.
pub struct RefreshView {
    pub delay_ms: u64,
    pub at: String,
}

// ============================================================
// BUILDERS
// ============================================================

pub fn refresh_view(state: &AppState, now: DateTime<Utc>) -> Option<RefreshView> {
    state
        .config
        .refresh
        .reload_delay(now, state.config.page.timezone)
        .map(|d| RefreshView {
            delay_ms: d.delay_ms,
            at: d.at.to_rfc3339(),
        })
}

/// Frame source for a retrieval; `None` when there is nothing to show.
pub fn embed_for(retrieved: &Retrieved) -> Option<Embed> {
    match retrieved {
        Retrieved::Inline(object) => Some(Embed::DataUri(object.to_data_uri())),
        Retrieved::Signed { url, .. } => Some(Embed::Remote(url.url.clone())),
        Retrieved::Local(report) => Some(Embed::LocalFile {
            file_name: report.file_name.clone(),
            href: format!("/report/file/{}", uri_encode(&report.file_name, true)),
        }),
        Retrieved::Missing { .. } => None,
    }
}

/// "Report updated" caption, when the source is set up to show one.
pub fn caption_for(state: &AppState, retrieved: &Retrieved) -> Option<String> {
    let enabled = match &state.config.report {
        ReportSourceConfig::S3(s3) => s3.show_last_modified,
        ReportSourceConfig::Local(_) => true,
    };
    if !enabled {
        return None;
    }

    retrieved.last_modified().map(|at| {
        format!(
            "Report updated: {}",
            at.with_timezone(&state.config.page.timezone)
                .format("%Y-%m-%d %H:%M %Z")
        )
    })
}

pub fn error_page(state: &AppState, err: &ReportError, now: DateTime<Utc>) -> Response {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let page = NoticePage {
        title: state.config.page.title.clone(),
        level: "error",
        icon: "\u{274C}",
        message: err.user_message(),
        refresh: refresh_view(state, now),
    };
    render(&page, status)
}

pub fn warning_page(state: &AppState, message: String, now: DateTime<Utc>) -> Response {
    let page = NoticePage {
        title: state.config.page.title.clone(),
        level: "warning",
        icon: "\u{26A0}\u{FE0F}",
        message,
        refresh: refresh_view(state, now),
    };
    render(&page, StatusCode::OK)
}

/// Render a template, falling back to a plain 500 on template errors.
pub fn render<T: Template>(template: &T, status: StatusCode) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!(error = %e, "Template rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("Template error: {}", e))).into_response()
        }
    }
}
