//! Reportwall Web Server
//!
//! Axum-based server for the full-screen report page, the embedded
//! visualization page and a small JSON status API.

pub mod routes;
pub mod state;
pub mod views;

use axum::{routing::get, Router};
use rw_core::DashboardConfig;
use rw_storage::ReportService;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/report", get(routes::api::report_status))
        .route("/refresh", get(routes::api::refresh_status))
        .layer(cors);

    Router::new()
        .route("/", get(routes::index))
        .route("/report", get(routes::report::report_page))
        .route("/report/file/{name}", get(routes::report::report_file))
        .route("/viz", get(routes::viz::viz_page))
        .route("/healthz", get(routes::healthz))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the web server.
pub async fn run_server(config: DashboardConfig, host: &str, port: u16) -> anyhow::Result<()> {
    let reports = ReportService::from_config(&config.report);
    tracing::info!(source = %reports.describe(), refresh = %config.refresh.describe(), "Report source ready");

    let state = AppState::new(config, reports);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use chrono::{DateTime, TimeZone, Utc};
    use rw_core::config::{
        Delivery, Landing, LocalSource, ReportSourceConfig, S3Source, VisualizationConfig,
    };
    use rw_core::report::{ObjectMeta, ReportObject, SignedUrl};
    use rw_core::{ReportError, ReportResult};
    use rw_storage::ObjectStore;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};
    use tower::ServiceExt;

    struct FakeStore {
        missing: bool,
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        async fn get_object(&self, _bucket: &str, key: &str) -> ReportResult<ReportObject> {
            if self.missing {
                return Err(ReportError::NotFound(key.to_string()));
            }
            Ok(ReportObject {
                key: key.to_string(),
                bytes: b"%PDF-1.4".to_vec(),
                content_type: "application/pdf".to_string(),
                last_modified: None,
            })
        }

        async fn head_object(&self, _bucket: &str, key: &str) -> ReportResult<ObjectMeta> {
            Ok(ObjectMeta {
                key: key.to_string(),
                content_type: None,
                content_length: None,
                last_modified: Some(Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap()),
            })
        }

        fn presign_get(
            &self,
            _bucket: &str,
            _key: &str,
            _expires: Duration,
            _content_type: Option<&str>,
            now: DateTime<Utc>,
        ) -> ReportResult<SignedUrl> {
            Ok(SignedUrl {
                url: "https://reports.example/latest.pdf?sig=abc123".to_string(),
                expires_at: now,
            })
        }
    }

    /// 09:00 in Chicago.
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 15, 0, 0).unwrap()
    }

    fn s3_app(delivery: Delivery, missing: bool, landing: Landing) -> Router {
        let source = S3Source {
            delivery,
            show_last_modified: true,
            ..S3Source::default()
        };
        let mut config = DashboardConfig::default();
        config.page.landing = landing;
        config.report = ReportSourceConfig::S3(source.clone());
        config.visualization = Some(VisualizationConfig::default());

        let reports = ReportService::s3(Arc::new(FakeStore { missing }), source);
        create_router(AppState::new(config, reports).with_clock(fixed_now))
    }

    fn local_app(dir: &Path) -> Router {
        local_app_with_extension(dir, "pdf")
    }

    fn local_app_with_extension(dir: &Path, extension: &str) -> Router {
        let source = LocalSource {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        };
        let mut config = DashboardConfig::default();
        config.report = ReportSourceConfig::Local(source.clone());
        create_router(AppState::new(config, ReportService::local(source)).with_clock(fixed_now))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn test_inline_report_page() {
        let (status, body) = get(s3_app(Delivery::Inline, false, Landing::Report), "/report").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<iframe class=\"report\""));
        assert!(body.contains("base64,JVBERi0xLjQ="));
        // Daily 12:30 refresh, 3.5 hours ahead.
        assert!(body.contains("12600000"));
    }

    #[tokio::test]
    async fn test_missing_object_renders_error_panel() {
        let (status, body) = get(s3_app(Delivery::Inline, true, Landing::Report), "/report").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("No PDF report found."));
        assert!(body.contains("notice error"));
        assert!(body.contains("window.location.reload"));
    }

    #[tokio::test]
    async fn test_signed_report_page() {
        let (status, body) = get(s3_app(Delivery::Signed, false, Landing::Report), "/report").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("sig=abc123"));
        assert!(body.contains("Report updated: 2024-01-01 00:00 CST"));
    }

    #[tokio::test]
    async fn test_local_report_page_and_file() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = get(local_app(dir.path()), "/report").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("notice warning"));
        assert!(body.contains("No report found in"));

        let older = dir.path().join("a.pdf");
        std::fs::write(&older, b"old").unwrap();
        std::fs::File::options()
            .write(true)
            .open(&older)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(3600))
            .unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"%PDF-new").unwrap();

        let (status, body) = get(local_app(dir.path()), "/report").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("b.pdf"));
        assert!(!body.contains("a.pdf"));

        let response = local_app(dir.path())
            .oneshot(Request::builder().uri("/report/file/b.pdf").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/pdf");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"%PDF-new");

        let (status, _) = get(local_app(dir.path()), "/report/file/a.pdf").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_viz_page() {
        let (status, body) = get(s3_app(Delivery::Inline, false, Landing::Report), "/viz").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("tableau-viz"));
        assert!(body.contains("RanchPassScoreboard"));
        assert!(body.contains("Last refreshed: 2024-01-01 09:00:00"));
    }

    #[tokio::test]
    async fn test_viz_page_without_visualization() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(local_app(dir.path()), "/viz").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("notice warning"));
        assert!(body.contains("No visualization configured."));
        assert!(!body.contains("tableau-viz"));
    }

    #[tokio::test]
    async fn test_local_file_content_type_follows_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("board.png"), b"\x89PNG").unwrap();

        let response = local_app_with_extension(dir.path(), "png")
            .oneshot(Request::builder().uri("/report/file/board.png").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/png");
    }

    #[tokio::test]
    async fn test_landing_page() {
        let (_, body) = get(s3_app(Delivery::Inline, false, Landing::Viz), "/").await;
        assert!(body.contains("tableau-viz"));

        let (_, body) = get(s3_app(Delivery::Inline, false, Landing::Report), "/").await;
        assert!(body.contains("base64,JVBERi0xLjQ="));
    }

    #[tokio::test]
    async fn test_refresh_api() {
        let (status, body) = get(s3_app(Delivery::Inline, false, Landing::Report), "/api/refresh").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["delay_ms"], 12_600_000);
        assert_eq!(json["next_refresh"], "2024-01-01T12:30:00-06:00");
        assert_eq!(json["timezone"], "America/Chicago");
        assert_eq!(json["policy"], "daily at 12:30");
    }

    #[tokio::test]
    async fn test_report_api() {
        let (status, body) = get(s3_app(Delivery::Inline, false, Landing::Report), "/api/report").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["kind"], "inline");
        assert_eq!(json["source"], "s3://sitelevel-reports/scoreboard/richardson/latest.pdf");

        let (status, body) = get(s3_app(Delivery::Inline, true, Landing::Report), "/api/report").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "NotFound");
        assert_eq!(json["message"], "No PDF report found.");
    }

    #[tokio::test]
    async fn test_healthz() {
        let (status, body) = get(s3_app(Delivery::Inline, false, Landing::Report), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
