//! Local folder source: the newest matching file wins.

use chrono::{DateTime, Utc};
use rw_core::report::LocalReport;
use rw_core::ReportResult;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

fn matches_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

/// Find the most recently modified file in `dir` with the given extension.
///
/// Returns `Ok(None)` when nothing matches. On equal timestamps the first
/// file in directory order is kept.
pub async fn latest_matching(dir: &Path, extension: &str) -> ReportResult<Option<LocalReport>> {
    let wanted = extension.trim_start_matches('.');
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut latest: Option<(SystemTime, u64, PathBuf)> = None;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !matches_extension(&path, wanted) {
            continue;
        }

        // Entries that vanish or dangle mid-scan are skipped, not fatal.
        let meta = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }

        let modified = match meta.modified() {
            Ok(modified) => modified,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping entry without mtime");
                continue;
            }
        };
        if latest.as_ref().map_or(true, |(best, _, _)| modified > *best) {
            latest = Some((modified, meta.len(), path));
        }
    }

    let report = latest.map(|(modified, size, path)| LocalReport {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path,
        size,
        modified: DateTime::<Utc>::from(modified),
    });

    match &report {
        Some(r) => debug!(dir = %dir.display(), file = %r.file_name, "Selected latest report"),
        None => debug!(dir = %dir.display(), extension = wanted, "No matching report"),
    }
    Ok(report)
}

/// Read a report file's bytes.
pub async fn read_report(path: &Path) -> ReportResult<Vec<u8>> {
    Ok(tokio::fs::read(path).await?)
}
