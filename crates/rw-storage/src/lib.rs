//! Reportwall Storage Layer
//!
//! Fetches the report from S3 (or an S3-compatible store) or from a local
//! folder, and issues signed URLs for it.

pub mod credentials;
pub mod local;
pub mod s3;
pub mod service;
pub mod signed_cache;
pub mod sigv4;

pub use credentials::Credentials;
pub use s3::{ObjectStore, S3Client};
pub use service::{ReportService, Retrieved};
pub use signed_cache::SignedUrlCache;
pub use sigv4::uri_encode;
