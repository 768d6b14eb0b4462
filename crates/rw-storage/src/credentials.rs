//! Object storage credentials.
//!
//! Resolved once at startup from the environment, falling back to the
//! shared credentials file. Never rotated or validated here; a bad key
//! surfaces as the provider's own error.

use std::fmt;
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_PROFILE: &str = "default";

/// An access key pair, optionally with a session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Read `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let access_key_id = lookup("AWS_ACCESS_KEY_ID").filter(|v| !v.is_empty())?;
        let secret_access_key = lookup("AWS_SECRET_ACCESS_KEY").filter(|v| !v.is_empty())?;
        Some(Self {
            access_key_id,
            secret_access_key,
            session_token: lookup("AWS_SESSION_TOKEN").filter(|v| !v.is_empty()),
        })
    }

    /// Extract a profile from the contents of a shared credentials file.
    pub fn from_profile_file(contents: &str, profile: &str) -> Option<Self> {
        let mut in_profile = false;
        let mut access_key_id = None;
        let mut secret_access_key = None;
        let mut session_token = None;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = section.trim();
                let name = name.strip_prefix("profile ").unwrap_or(name).trim();
                in_profile = name == profile;
                continue;
            }

            if !in_profile {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let value = value.trim().to_string();
                match key.trim().to_ascii_lowercase().as_str() {
                    "aws_access_key_id" => access_key_id = Some(value),
                    "aws_secret_access_key" => secret_access_key = Some(value),
                    "aws_session_token" => session_token = Some(value),
                    _ => {}
                }
            }
        }

        Some(Self {
            access_key_id: access_key_id?,
            secret_access_key: secret_access_key?,
            session_token,
        })
    }

    /// Resolve credentials from the process environment and the shared file.
    pub fn resolve(profile: Option<&str>) -> Option<Self> {
        Self::resolve_with(profile, |name| std::env::var(name).ok())
    }

    fn resolve_with(profile: Option<&str>, lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        if let Some(creds) = Self::from_lookup(&lookup) {
            debug!(access_key_id = %creds.access_key_id, "Using credentials from environment");
            return Some(creds);
        }

        let path = lookup("AWS_SHARED_CREDENTIALS_FILE")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".aws").join("credentials")))?;
        let profile = profile
            .map(str::to_string)
            .or_else(|| lookup("AWS_PROFILE"))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No shared credentials file");
                return None;
            }
        };

        let creds = Self::from_profile_file(&contents, &profile);
        match &creds {
            Some(c) => debug!(
                path = %path.display(),
                profile = %profile,
                access_key_id = %c.access_key_id,
                "Using credentials from shared file"
            ),
            None => debug!(path = %path.display(), profile = %profile, "Profile not found in shared file"),
        }
        creds
    }
}
