//! Reuse of issued signed URLs.
//!
//! Entries expire a little before the URLs they hold, so a page never
//! embeds a URL that is about to stop working.

use moka::future::Cache;
use rw_core::report::SignedUrl;
use rw_core::ReportResult;
use std::time::Duration;
use tracing::debug;

const EXPIRY_MARGIN: Duration = Duration::from_secs(600);

/// Cache lifetime for URLs valid for `validity`.
///
/// Ten minutes short of the validity, or a tenth short for short-lived URLs.
pub fn cache_ttl(validity: Duration) -> Duration {
    let margin = EXPIRY_MARGIN.min(validity / 10);
    validity.saturating_sub(margin)
}

/// Signed URLs keyed by `bucket/key`.
#[derive(Clone)]
pub struct SignedUrlCache {
    inner: Cache<String, SignedUrl>,
    ttl: Duration,
}

impl SignedUrlCache {
    pub fn new(validity: Duration) -> Self {
        let ttl = cache_ttl(validity);
        Self {
            inner: Cache::builder().max_capacity(64).time_to_live(ttl).build(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached URL, or issue and cache a new one.
    ///
    /// Concurrent misses each issue a URL; the last insert wins.
    pub async fn get_or_issue<F>(&self, cache_key: &str, issue: F) -> ReportResult<SignedUrl>
    where
        F: FnOnce() -> ReportResult<SignedUrl>,
    {
        if let Some(cached) = self.inner.get(cache_key).await {
            debug!(cache_key, "Signed URL cache hit");
            return Ok(cached);
        }

        let signed = issue()?;
        self.inner.insert(cache_key.to_string(), signed.clone()).await;
        debug!(cache_key, expires_at = %signed.expires_at, "Signed URL cached");
        Ok(signed)
    }

    pub async fn invalidate(&self, cache_key: &str) {
        self.inner.invalidate(cache_key).await;
    }
}
