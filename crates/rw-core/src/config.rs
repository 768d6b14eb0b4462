//! Dashboard configuration.
//!
//! Loaded from a TOML file (default `reportwall.toml` in the working
//! directory), then overridden from the environment.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ReportError, ReportResult};
use crate::report::PDF_CONTENT_TYPE;
use crate::schedule::{RefreshPolicy, MAX_REFRESH_INTERVAL_SECS};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "reportwall.toml";

/// Longest validity S3 accepts for a presigned URL (7 days).
pub const MAX_SIGNED_URL_TTL_SECS: u64 = 604_800;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerConfig,
    pub page: PageConfig,
    pub report: ReportSourceConfig,
    /// Present only when the file has a `[visualization]` table.
    pub visualization: Option<VisualizationConfig>,
    pub refresh: RefreshPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// Which page `/` serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Landing {
    #[default]
    Report,
    Viz,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Browser tab title. Empty hides it, as on the wall displays.
    pub title: String,
    /// Zone for captions and daily refresh.
    pub timezone: Tz,
    pub landing: Landing,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            timezone: chrono_tz::America::Chicago,
            landing: Landing::Report,
        }
    }
}

/// Where the report lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ReportSourceConfig {
    S3(S3Source),
    Local(LocalSource),
}

impl Default for ReportSourceConfig {
    fn default() -> Self {
        Self::S3(S3Source::default())
    }
}

/// How an S3 report reaches the browser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Download the bytes and embed them as a data URI.
    #[default]
    Inline,
    /// Hand the browser a presigned URL.
    Signed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Source {
    pub bucket: String,
    pub key: String,
    pub region: String,
    /// Custom endpoint for S3-compatible stores; switches to path-style URLs.
    pub endpoint: Option<String>,
    /// Profile in the shared credentials file.
    pub profile: Option<String>,
    pub delivery: Delivery,
    pub signed_url_ttl_secs: u64,
    pub content_type: String,
    pub show_last_modified: bool,
}

impl Default for S3Source {
    fn default() -> Self {
        Self {
            bucket: "sitelevel-reports".to_string(),
            key: "scoreboard/richardson/latest.pdf".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            profile: None,
            delivery: Delivery::Inline,
            signed_url_ttl_secs: 21_600,
            content_type: PDF_CONTENT_TYPE.to_string(),
            show_last_modified: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSource {
    pub dir: PathBuf,
    /// File extension to match, without the dot.
    pub extension: String,
}

impl Default for LocalSource {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("reports"),
            extension: "pdf".to_string(),
        }
    }
}

/// Embedded Tableau view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    pub url: String,
    pub script_url: String,
    pub toolbar: String,
    pub hide_tabs: bool,
    /// Pixels left free below the viz for the caption.
    pub height_offset: u32,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            url: "https://us-east-1.online.tableau.com/t/bluejeansgolf/views/RanchPassScoreboard/RichardsonDB".to_string(),
            script_url: "https://us-east-1.online.tableau.com/javascripts/api/tableau.embedding.3.latest.min.js".to_string(),
            toolbar: "bottom".to_string(),
            hide_tabs: true,
            height_offset: 100,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from `path`, or from `reportwall.toml` if present.
    ///
    /// An explicit path must exist; the implicit one falls back to defaults.
    pub fn load(path: Option<&Path>) -> ReportResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.exists() {
                    Self::from_file(implicit)?
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without applying overrides.
    pub fn from_file(path: &Path) -> ReportResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ReportError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&raw)
            .map_err(|e| ReportError::config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Apply `REPORTWALL_*` and `AWS_REGION` overrides.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("REPORTWALL_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        match &mut self.report {
            ReportSourceConfig::S3(s3) => {
                if let Some(bucket) = lookup("REPORTWALL_BUCKET") {
                    s3.bucket = bucket;
                }
                if let Some(key) = lookup("REPORTWALL_KEY") {
                    s3.key = key;
                }
                if let Some(region) = lookup("AWS_REGION") {
                    s3.region = region;
                }
            }
            ReportSourceConfig::Local(local) => {
                if let Some(dir) = lookup("REPORTWALL_REPORT_DIR") {
                    local.dir = PathBuf::from(dir);
                }
            }
        }
    }

    pub fn validate(&self) -> ReportResult<()> {
        match &self.report {
            ReportSourceConfig::S3(s3) => {
                if s3.bucket.trim().is_empty() {
                    return Err(ReportError::config("report.bucket must not be empty"));
                }
                if s3.key.trim().is_empty() {
                    return Err(ReportError::config("report.key must not be empty"));
                }
                if s3.signed_url_ttl_secs == 0 || s3.signed_url_ttl_secs > MAX_SIGNED_URL_TTL_SECS {
                    return Err(ReportError::config(format!(
                        "report.signed_url_ttl_secs must be between 1 and {}",
                        MAX_SIGNED_URL_TTL_SECS
                    )));
                }
            }
            ReportSourceConfig::Local(local) => {
                if local.extension.trim_start_matches('.').is_empty() {
                    return Err(ReportError::config("report.extension must not be empty"));
                }
            }
        }

        if let RefreshPolicy::Interval { every_secs } = self.refresh {
            if every_secs == 0 || every_secs > MAX_REFRESH_INTERVAL_SECS {
                return Err(ReportError::config(format!(
                    "refresh.every_secs must be between 1 and {}",
                    MAX_REFRESH_INTERVAL_SECS
                )));
            }
        }

        Ok(())
    }
}
