//! Report status command.

use anyhow::Result;
use colored::Colorize;
use rw_core::DashboardConfig;
use rw_storage::ReportService;
use tracing::{info, warn};

use crate::output;

pub async fn execute(config: &DashboardConfig) -> Result<()> {
    let reports = ReportService::from_config(&config.report);

    println!("{}: {}", "Source".bold(), reports.describe().cyan());

    info!(source = %reports.describe(), "Checking report object");
    match reports.head().await {
        Ok(meta) => {
            info!(key = %meta.key, size = ?meta.content_length, "Report object found");
            output::print_object_meta(&meta, config.page.timezone);
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Report status check failed");
            output::print_error(&e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rw_core::config::{LocalSource, ReportSourceConfig};

    fn local_config(dir: &std::path::Path) -> DashboardConfig {
        let mut config = DashboardConfig::default();
        config.report = ReportSourceConfig::Local(LocalSource {
            dir: dir.to_path_buf(),
            extension: "pdf".to_string(),
        });
        config
    }

    #[tokio::test]
    async fn test_status_reports_missing_report() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(&local_config(dir.path())).await.unwrap_err();
        assert!(err.to_string().contains("Report not found"));
    }

    #[tokio::test]
    async fn test_status_finds_local_report() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("latest.pdf"), b"%PDF-1.4").unwrap();
        assert!(execute(&local_config(dir.path())).await.is_ok());
    }
}
