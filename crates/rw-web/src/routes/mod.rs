//! Route handlers.

pub mod api;
pub mod report;
pub mod viz;

use axum::{extract::State, response::Response};
use rw_core::config::Landing;

use crate::state::AppState;

/// GET / - Serve the configured landing page.
pub async fn index(State(state): State<AppState>) -> Response {
    match state.config.page.landing {
        Landing::Report => report::report_page(State(state)).await,
        Landing::Viz => viz::viz_page(State(state)).await,
    }
}

/// GET /healthz - Liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}
