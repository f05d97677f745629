//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::session::SessionStore;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the affiliate API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the dashboard backend.
    pub base_url: String,
    /// Where the session document is persisted.
    pub session_file: PathBuf,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let base_url =
            env::var("AFFILIATE_API_URL").context("AFFILIATE_API_URL must be set")?;
        let session_file = env::var("AFFILIATE_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| SessionStore::default_path());
        let timeout_secs = env::var("AFFILIATE_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .context("AFFILIATE_HTTP_TIMEOUT_SECS must be a valid number")?;

        Ok(Self {
            base_url,
            session_file,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Configuration pointed at `base_url`, defaults elsewhere.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            session_file: SessionStore::default_path(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
