//! S3 object storage client.
//!
//! Reads a single object, fetches its metadata, and presigns GET URLs.
//! Requests are signed with SigV4 and sent with `reqwest`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Method, StatusCode, Url};
use rw_core::config::{S3Source, MAX_SIGNED_URL_TTL_SECS};
use rw_core::report::{ObjectMeta, ReportObject, SignedUrl, PDF_CONTENT_TYPE};
use rw_core::{ReportError, ReportResult};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::credentials::Credentials;
use crate::sigv4;

/// Read access to a single object in a bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Download an object's bytes.
    async fn get_object(&self, bucket: &str, key: &str) -> ReportResult<ReportObject>;

    /// Fetch an object's metadata without its body.
    async fn head_object(&self, bucket: &str, key: &str) -> ReportResult<ObjectMeta>;

    /// Issue a time-limited GET URL for an object.
    fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires: Duration,
        content_type: Option<&str>,
        now: DateTime<Utc>,
    ) -> ReportResult<SignedUrl>;
}

/// Error document returned by S3.
#[derive(Debug, Deserialize)]
struct S3ErrorBody {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

fn parse_error_body(body: &str) -> Option<S3ErrorBody> {
    if body.trim().is_empty() {
        return None;
    }
    quick_xml::de::from_str(body).ok()
}

/// Map a failed response to the error taxonomy.
fn classify_error(status: StatusCode, body: &str, key: &str) -> ReportError {
    match parse_error_body(body) {
        Some(err) if err.code == "NoSuchKey" => ReportError::NotFound(key.to_string()),
        Some(err) => {
            let message = if err.message.is_empty() {
                err.code.clone()
            } else {
                err.message
            };
            ReportError::provider(err.code, message)
        }
        None if status == StatusCode::NOT_FOUND => ReportError::NotFound(key.to_string()),
        None => ReportError::provider(
            status.as_str(),
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        ),
    }
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

fn header_str<'a>(headers: &'a header::HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// S3 REST client.
#[derive(Clone)]
pub struct S3Client {
    http: reqwest::Client,
    region: String,
    endpoint: Option<String>,
    credentials: Option<Credentials>,
}

impl S3Client {
    pub fn new(region: &str, endpoint: Option<String>, credentials: Option<Credentials>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            region: region.to_string(),
            endpoint,
            credentials,
        }
    }

    /// Build a client for a configured source, resolving credentials now.
    pub fn from_source(source: &S3Source) -> Self {
        let credentials = Credentials::resolve(source.profile.as_deref());
        if credentials.is_none() {
            warn!("No object storage credentials found; report requests will fail");
        }
        Self::new(&source.region, source.endpoint.clone(), credentials)
    }

    fn credentials(&self) -> ReportResult<&Credentials> {
        self.credentials.as_ref().ok_or(ReportError::MissingCredentials)
    }

    /// Virtual-hosted URL on AWS, path-style on a custom endpoint.
    fn object_url(&self, bucket: &str, key: &str) -> ReportResult<Url> {
        let encoded_key = sigv4::uri_encode(key.trim_start_matches('/'), false);
        let raw = match &self.endpoint {
            Some(endpoint) => format!(
                "{}/{}/{}",
                endpoint.trim_end_matches('/'),
                bucket,
                encoded_key
            ),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                bucket, self.region, encoded_key
            ),
        };
        Url::parse(&raw).map_err(|e| ReportError::config(format!("invalid object URL {}: {}", raw, e)))
    }

    fn host_header(url: &Url) -> String {
        let host = url.host_str().unwrap_or_default();
        match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    async fn send(&self, method: Method, bucket: &str, key: &str) -> ReportResult<reqwest::Response> {
        let creds = self.credentials()?;
        let url = self.object_url(bucket, key)?;
        let headers = sigv4::sign_headers(
            creds,
            &self.region,
            method.as_str(),
            &Self::host_header(&url),
            url.path(),
            &[],
            &[],
            sigv4::EMPTY_PAYLOAD_SHA256,
            Utc::now(),
        )?;

        debug!(%method, url = %url, "Sending object storage request");
        let mut request = self.http.request(method, url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ReportError::Transport(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let err = classify_error(status, &body, key);
        warn!(bucket, key, status = %status, error = %err, "Object storage request failed");
        Err(err)
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn get_object(&self, bucket: &str, key: &str) -> ReportResult<ReportObject> {
        let response = self.send(Method::GET, bucket, key).await?;
        let headers = response.headers().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ReportError::Transport(e.to_string()))?;

        info!(bucket, key, bytes = bytes.len(), "Fetched report object");
        Ok(ReportObject {
            key: key.to_string(),
            bytes: bytes.to_vec(),
            content_type: header_str(&headers, header::CONTENT_TYPE)
                .unwrap_or(PDF_CONTENT_TYPE)
                .to_string(),
            last_modified: header_str(&headers, header::LAST_MODIFIED).and_then(parse_http_date),
        })
    }

    async fn head_object(&self, bucket: &str, key: &str) -> ReportResult<ObjectMeta> {
        let response = self.send(Method::HEAD, bucket, key).await?;
        let headers = response.headers();

        Ok(ObjectMeta {
            key: key.to_string(),
            content_type: header_str(headers, header::CONTENT_TYPE).map(str::to_string),
            content_length: header_str(headers, header::CONTENT_LENGTH).and_then(|v| v.parse().ok()),
            last_modified: header_str(headers, header::LAST_MODIFIED).and_then(parse_http_date),
        })
    }

    fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires: Duration,
        content_type: Option<&str>,
        now: DateTime<Utc>,
    ) -> ReportResult<SignedUrl> {
        let expires_secs = expires.as_secs();
        if expires_secs == 0 || expires_secs > MAX_SIGNED_URL_TTL_SECS {
            return Err(ReportError::config(format!(
                "signed URL expiry must be between 1 and {} seconds",
                MAX_SIGNED_URL_TTL_SECS
            )));
        }

        let creds = self.credentials()?;
        let url = self.object_url(bucket, key)?;
        let host = Self::host_header(&url);
        let extra: Vec<(String, String)> = content_type
            .map(|ct| vec![("response-content-type".to_string(), ct.to_string())])
            .unwrap_or_default();

        let query = sigv4::presign_query(
            creds,
            &self.region,
            "GET",
            &host,
            url.path(),
            &extra,
            expires_secs,
            now,
        )?;

        debug!(bucket, key, expires_secs, "Issued signed URL");
        Ok(SignedUrl {
            url: format!("{}://{}{}?{}", url.scheme(), host, url.path(), query),
            expires_at: now + chrono::Duration::seconds(expires_secs as i64),
        })
    }
}
