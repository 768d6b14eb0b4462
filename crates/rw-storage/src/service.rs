//! Report retrieval.
//!
//! One call per page load: download the object, hand out a signed URL, or
//! pick the newest file from a folder, depending on configuration.

use chrono::{DateTime, Utc};
use rw_core::config::{Delivery, LocalSource, ReportSourceConfig, S3Source};
use rw_core::report::{LocalReport, ObjectMeta, ReportObject, SignedUrl};
use rw_core::{ReportError, ReportResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::local;
use crate::s3::{ObjectStore, S3Client};
use crate::signed_cache::SignedUrlCache;

/// The outcome of one retrieval.
#[derive(Debug, Clone)]
pub enum Retrieved {
    /// Object bytes, to embed as a data URI.
    Inline(ReportObject),
    /// A signed URL for the browser to load directly.
    Signed {
        url: SignedUrl,
        last_modified: Option<DateTime<Utc>>,
    },
    /// Newest file in the local folder.
    Local(LocalReport),
    /// Nothing to show yet; rendered as a warning, not an error.
    Missing { location: String },
}

impl Retrieved {
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        match self {
            Retrieved::Inline(object) => object.last_modified,
            Retrieved::Signed { last_modified, .. } => *last_modified,
            Retrieved::Local(report) => Some(report.modified),
            Retrieved::Missing { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Retrieved::Inline(_) => "inline",
            Retrieved::Signed { .. } => "signed",
            Retrieved::Local(_) => "local",
            Retrieved::Missing { .. } => "missing",
        }
    }
}

enum Backend {
    S3 {
        store: Arc<dyn ObjectStore>,
        source: S3Source,
        signed: SignedUrlCache,
    },
    Local(LocalSource),
}

/// Retrieves the report from its configured source.
pub struct ReportService {
    backend: Backend,
}

impl ReportService {
    pub fn from_config(config: &ReportSourceConfig) -> Self {
        match config {
            ReportSourceConfig::S3(source) => {
                Self::s3(Arc::new(S3Client::from_source(source)), source.clone())
            }
            ReportSourceConfig::Local(source) => Self::local(source.clone()),
        }
    }

    /// Serve from object storage through any [`ObjectStore`].
    pub fn s3(store: Arc<dyn ObjectStore>, source: S3Source) -> Self {
        let signed = SignedUrlCache::new(Duration::from_secs(source.signed_url_ttl_secs));
        Self {
            backend: Backend::S3 {
                store,
                source,
                signed,
            },
        }
    }

    pub fn local(source: LocalSource) -> Self {
        Self {
            backend: Backend::Local(source),
        }
    }

    /// Human-readable location, e.g. `s3://bucket/key`.
    pub fn describe(&self) -> String {
        match &self.backend {
            Backend::S3 { source, .. } => format!("s3://{}/{}", source.bucket, source.key),
            Backend::Local(source) => format!(
                "{}/*.{}",
                source.dir.display(),
                source.extension.trim_start_matches('.')
            ),
        }
    }

    pub async fn retrieve(&self, now: DateTime<Utc>) -> ReportResult<Retrieved> {
        match &self.backend {
            Backend::S3 {
                store,
                source,
                signed,
            } => match source.delivery {
                Delivery::Inline => {
                    let mut object = store.get_object(&source.bucket, &source.key).await?;
                    // Objects uploaded without metadata come back as
                    // binary/octet-stream, which browsers download instead of showing.
                    if object.content_type != source.content_type {
                        debug!(stored = %object.content_type, configured = %source.content_type, "Overriding object content type");
                        object.content_type = source.content_type.clone();
                    }
                    Ok(Retrieved::Inline(object))
                }
                Delivery::Signed => {
                    let url = self.signed_url(store.as_ref(), source, signed, now).await?;
                    let last_modified = if source.show_last_modified {
                        match store.head_object(&source.bucket, &source.key).await {
                            Ok(meta) => meta.last_modified,
                            Err(e) => {
                                warn!(error = %e, "HEAD for last-modified failed; continuing without it");
                                None
                            }
                        }
                    } else {
                        None
                    };
                    Ok(Retrieved::Signed { url, last_modified })
                }
            },
            Backend::Local(source) => {
                match local::latest_matching(&source.dir, &source.extension).await? {
                    Some(report) => Ok(Retrieved::Local(report)),
                    None => Ok(Retrieved::Missing {
                        location: self.describe(),
                    }),
                }
            }
        }
    }

    async fn signed_url(
        &self,
        store: &dyn ObjectStore,
        source: &S3Source,
        cache: &SignedUrlCache,
        now: DateTime<Utc>,
    ) -> ReportResult<SignedUrl> {
        let cache_key = format!("{}/{}", source.bucket, source.key);
        cache
            .get_or_issue(&cache_key, || {
                store.presign_get(
                    &source.bucket,
                    &source.key,
                    Duration::from_secs(source.signed_url_ttl_secs),
                    Some(&source.content_type),
                    now,
                )
            })
            .await
    }

    /// Metadata of the current report, without its body.
    pub async fn head(&self) -> ReportResult<ObjectMeta> {
        match &self.backend {
            Backend::S3 { store, source, .. } => store.head_object(&source.bucket, &source.key).await,
            Backend::Local(source) => {
                let report = local::latest_matching(&source.dir, &source.extension)
                    .await?
                    .ok_or_else(|| ReportError::NotFound(self.describe()))?;
                Ok(ObjectMeta {
                    key: report.file_name,
                    content_type: None,
                    content_length: Some(report.size),
                    last_modified: Some(report.modified),
                })
            }
        }
    }

    /// Issue a fresh signed URL, bypassing the cache.
    pub fn presign(&self, expires: Duration, now: DateTime<Utc>) -> ReportResult<SignedUrl> {
        match &self.backend {
            Backend::S3 { store, source, .. } => store.presign_get(
                &source.bucket,
                &source.key,
                expires,
                Some(&source.content_type),
                now,
            ),
            Backend::Local(_) => Err(ReportError::config(
                "signed URLs need an s3 report source",
            )),
        }
    }

    /// Bytes of the local report named `file_name`.
    ///
    /// Only the file the latest scan selects is served, so arbitrary names
    /// from the request path never reach the filesystem.
    pub async fn read_local(&self, file_name: &str) -> ReportResult<Vec<u8>> {
        let Backend::Local(source) = &self.backend else {
            return Err(ReportError::NotFound(file_name.to_string()));
        };

        match local::latest_matching(&source.dir, &source.extension).await? {
            Some(report) if report.file_name == file_name => {
                debug!(file = %report.path.display(), "Serving local report");
                local::read_report(&report.path).await
            }
            _ => Err(ReportError::NotFound(file_name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store counting calls.
    #[derive(Default)]
    struct FakeStore {
        missing: bool,
        stored_type: Option<&'static str>,
        presigns: AtomicUsize,
        heads: AtomicUsize,
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
                content_type: self.stored_type.unwrap_or("application/pdf").to_string(),
                last_modified: None,
            })
        }

        async fn head_object(&self, _bucket: &str, key: &str) -> ReportResult<ObjectMeta> {
            self.heads.fetch_add(1, Ordering::SeqCst);
            Ok(ObjectMeta {
                key: key.to_string(),
                content_type: Some("application/pdf".to_string()),
                content_length: Some(8),
                last_modified: Some(Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap()),
            })
        }

        fn presign_get(
            &self,
            bucket: &str,
            key: &str,
            expires: Duration,
            _content_type: Option<&str>,
            now: DateTime<Utc>,
        ) -> ReportResult<SignedUrl> {
            let n = self.presigns.fetch_add(1, Ordering::SeqCst);
            Ok(SignedUrl {
                url: format!("https://{}.example/{}?sig={}", bucket, key, n),
                expires_at: now + chrono::Duration::seconds(expires.as_secs() as i64),
            })
        }
    }

    fn source(delivery: Delivery) -> S3Source {
        S3Source {
            bucket: "reports".to_string(),
            key: "site/latest.pdf".to_string(),
            delivery,
            show_last_modified: true,
            ..S3Source::default()
        }
    }

    #[tokio::test]
    async fn test_inline_retrieval() {
        let service = ReportService::s3(Arc::new(FakeStore::default()), source(Delivery::Inline));
        let retrieved = service.retrieve(Utc::now()).await.unwrap();
        match retrieved {
            Retrieved::Inline(object) => assert_eq!(object.bytes, b"%PDF-1.4"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(service.describe(), "s3://reports/site/latest.pdf");
    }

    #[tokio::test]
    async fn test_inline_uses_configured_content_type() {
        let store = FakeStore {
            stored_type: Some("binary/octet-stream"),
            ..FakeStore::default()
        };
        let service = ReportService::s3(Arc::new(store), source(Delivery::Inline));
        let Retrieved::Inline(object) = service.retrieve(Utc::now()).await.unwrap() else {
            panic!("expected inline retrieval");
        };
        assert_eq!(object.content_type, "application/pdf");
        assert!(object.to_data_uri().starts_with("data:application/pdf;base64,"));
    }

    #[tokio::test]
    async fn test_inline_missing_object_is_error() {
        let store = FakeStore {
            missing: true,
            ..FakeStore::default()
        };
        let service = ReportService::s3(Arc::new(store), source(Delivery::Inline));
        let err = service.retrieve(Utc::now()).await.unwrap_err();
        assert_eq!(err.user_message(), "No PDF report found.");
    }

    #[tokio::test]
    async fn test_signed_url_is_cached() {
        let store = Arc::new(FakeStore::default());
        let service = ReportService::s3(store.clone(), source(Delivery::Signed));

        let first = service.retrieve(Utc::now()).await.unwrap();
        let second = service.retrieve(Utc::now()).await.unwrap();

        let (Retrieved::Signed { url: a, last_modified }, Retrieved::Signed { url: b, .. }) =
            (first, second)
        else {
            panic!("expected signed retrievals");
        };
        assert_eq!(a.url, b.url);
        assert!(last_modified.is_some());
        assert_eq!(store.presigns.load(Ordering::SeqCst), 1);
        assert_eq!(store.heads.load(Ordering::SeqCst), 2);

        // Explicit presign bypasses the cache.
        service.presign(Duration::from_secs(60), Utc::now()).unwrap();
        assert_eq!(store.presigns.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_local_retrieval_and_serving() {
        let dir = tempfile::tempdir().unwrap();
        let service = ReportService::local(LocalSource {
            dir: dir.path().to_path_buf(),
            extension: "pdf".to_string(),
        });

        let retrieved = service.retrieve(Utc::now()).await.unwrap();
        assert!(matches!(retrieved, Retrieved::Missing { .. }));
        assert!(matches!(service.head().await.unwrap_err(), ReportError::NotFound(_)));

        std::fs::write(dir.path().join("latest.pdf"), b"%PDF-local").unwrap();
        let retrieved = service.retrieve(Utc::now()).await.unwrap();
        assert_eq!(retrieved.kind(), "local");
        assert!(retrieved.last_modified().is_some());

        assert_eq!(service.read_local("latest.pdf").await.unwrap(), b"%PDF-local");
        assert!(service.read_local("../secrets.pdf").await.is_err());
        assert!(service.presign(Duration::from_secs(60), Utc::now()).is_err());
    }
}
