//! Embedded Tableau visualization page.

use axum::{extract::State, http::StatusCode, response::Response};

use crate::state::AppState;
use crate::views::{self, VizPage};

/// GET /viz - Render the responsive Tableau embed.
pub async fn viz_page(State(state): State<AppState>) -> Response {
    let now = state.now();

    let Some(viz) = &state.config.visualization else {
        return views::warning_page(&state, "No visualization configured.".to_string(), now);
    };

    let page = VizPage {
        title: state.config.page.title.clone(),
        script_url: viz.script_url.clone(),
        viz_url: viz.url.clone(),
        toolbar: viz.toolbar.clone(),
        hide_tabs: viz.hide_tabs,
        height_offset: viz.height_offset,
        refreshed_at: now
            .with_timezone(&state.config.page.timezone)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        refresh: views::refresh_view(&state, now),
    };
    views::render(&page, StatusCode::OK)
}
