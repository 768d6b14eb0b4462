//! Latest local report command.

use anyhow::{Context, Result};
use clap::Args;
use rw_core::config::ReportSourceConfig;
use rw_core::DashboardConfig;
use std::path::PathBuf;
use tracing::debug;

use crate::output;

#[derive(Args)]
pub struct LatestArgs {
    /// Folder to scan (defaults to report.dir, or ./reports)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// File extension to match
    #[arg(long)]
    pub ext: Option<String>,
}

/// Folder and extension to scan: flags first, then the local source config.
fn scan_target(args: LatestArgs, config: &DashboardConfig) -> (PathBuf, String) {
    let (dir, ext) = match &config.report {
        ReportSourceConfig::Local(local) => (local.dir.clone(), local.extension.clone()),
        ReportSourceConfig::S3(_) => (PathBuf::from("reports"), "pdf".to_string()),
    };
    (args.dir.unwrap_or(dir), args.ext.unwrap_or(ext))
}

pub async fn execute(args: LatestArgs, config: &DashboardConfig) -> Result<()> {
    let (dir, ext) = scan_target(args, config);
    debug!(dir = %dir.display(), ext = %ext, "Scanning for latest report");

    let latest = rw_storage::local::latest_matching(&dir, &ext)
        .await
        .with_context(|| format!("cannot scan {}", dir.display()))?;

    match latest {
        Some(report) => output::print_local_report(&report, config.page.timezone),
        None => output::print_warning(&format!(
            "No .{} files found in {}",
            ext.trim_start_matches('.'),
            dir.display()
        )),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rw_core::config::LocalSource;

    #[test]
    fn test_scan_target_prefers_flags() {
        let mut config = DashboardConfig::default();
        config.report = ReportSourceConfig::Local(LocalSource {
            dir: PathBuf::from("/srv/reports"),
            extension: "PDF".to_string(),
        });

        let (dir, ext) = scan_target(LatestArgs { dir: None, ext: None }, &config);
        assert_eq!(dir, PathBuf::from("/srv/reports"));
        assert_eq!(ext, "PDF");

        let args = LatestArgs {
            dir: Some(PathBuf::from("out")),
            ext: Some("xlsx".to_string()),
        };
        let (dir, ext) = scan_target(args, &config);
        assert_eq!(dir, PathBuf::from("out"));
        assert_eq!(ext, "xlsx");
    }

    #[test]
    fn test_scan_target_defaults_for_s3() {
        let (dir, ext) = scan_target(LatestArgs { dir: None, ext: None }, &DashboardConfig::default());
        assert_eq!(dir, PathBuf::from("reports"));
        assert_eq!(ext, "pdf");
    }
}
