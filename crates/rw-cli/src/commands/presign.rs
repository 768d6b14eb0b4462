//! Signed URL command.

use anyhow::{bail, Result};
use chrono::Utc;
use clap::Args;
use rw_core::config::{ReportSourceConfig, MAX_SIGNED_URL_TTL_SECS};
use rw_core::DashboardConfig;
use rw_storage::ReportService;
use std::time::Duration;
use tracing::{info, warn};

use crate::output;

#[derive(Args)]
pub struct PresignArgs {
    /// URL validity in seconds (defaults to report.signed_url_ttl_secs)
    #[arg(long)]
    pub expires: Option<u64>,
}

fn validity(args: &PresignArgs, config: &DashboardConfig) -> Result<Duration> {
    let ReportSourceConfig::S3(source) = &config.report else {
        bail!("presign needs an s3 report source");
    };
    let secs = args.expires.unwrap_or(source.signed_url_ttl_secs);
    if secs == 0 || secs > MAX_SIGNED_URL_TTL_SECS {
        bail!("--expires must be between 1 and {} seconds", MAX_SIGNED_URL_TTL_SECS);
    }
    Ok(Duration::from_secs(secs))
}

pub fn execute(args: PresignArgs, config: &DashboardConfig) -> Result<()> {
    let expires = validity(&args, config)?;
    let reports = ReportService::from_config(&config.report);

    info!(source = %reports.describe(), expires_secs = expires.as_secs(), "Presigning report URL");
    match reports.presign(expires, Utc::now()) {
        Ok(signed) => {
            info!(expires_at = %signed.expires_at, "Signed URL issued");
            output::print_signed_url(&signed, config.page.timezone);
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Presign failed");
            output::print_error(&e);
            Err(e.into())
        }
    }
}
