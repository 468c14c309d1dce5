//! Configuration loading for the briefing flow
//!
//! Two pieces of configuration are needed:
//! - [`BriefingConfig`]: where the summarization service lives and how the
//!   flow is bounded (unread limit, request timeout)
//! - [`GmailCredentials`]: OAuth client credentials for the desktop sign-in
//!
//! Both are read from the Herald config directory, with environment
//! variable overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Credentials filename in the Herald config directory
const CREDENTIALS_FILE: &str = "google-credentials.json";

/// Briefing settings filename in the Herald config directory
const SETTINGS_FILE: &str = "herald.json";

/// Default number of unread messages summarized per flow
pub const DEFAULT_UNREAD_LIMIT: usize = 5;

/// Default per-phase network timeout (connect, send, receive)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default summarization service location (local development server)
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Settings for one briefing flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BriefingConfig {
    /// Base URL of the summarization service
    pub api_base_url: String,
    /// Maximum number of unread messages fetched per flow
    pub unread_limit: usize,
    /// Bound applied separately to connect, send and receive
    pub request_timeout_secs: u64,
    /// Optional service key, sent as a bearer token to the summarization service
    pub api_key: Option<String>,
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            unread_limit: DEFAULT_UNREAD_LIMIT,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

impl BriefingConfig {
    /// Load settings using the following priority:
    /// 1. `HERALD_API_URL` / `HERALD_API_KEY` environment variables
    /// 2. JSON file (~/.config/herald/herald.json)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self> {
        let config: Self = config::load_json_or_default(SETTINGS_FILE)?;
        config.with_env_overrides().validated()
    }

    /// Load settings from a specific JSON file (no environment overrides)
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = config::load_json_file(path)?;
        config.validated()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("HERALD_API_URL")
            && !url.trim().is_empty()
        {
            self.api_base_url = url;
        }
        if let Ok(key) = std::env::var("HERALD_API_KEY")
            && !key.trim().is_empty()
        {
            self.api_key = Some(key);
        }
        self
    }

    /// Check the base URL and clamp numeric settings into usable ranges
    pub fn validated(mut self) -> Result<Self> {
        let url = url::Url::parse(&self.api_base_url)
            .with_context(|| format!("Invalid summary service URL: {}", self.api_base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!(
                "Summary service URL must be http or https, got {}",
                url.scheme()
            );
        }

        self.unread_limit = self.unread_limit.clamp(1, 500);
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the default settings file path (~/.config/herald/herald.json)
    pub fn default_settings_path() -> Option<PathBuf> {
        config::config_path(SETTINGS_FILE)
    }
}

/// OAuth credentials for Gmail API access
#[derive(Debug, Clone)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Google Cloud Console credential file format (installed app)
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<InstalledCredentials>,
    web: Option<InstalledCredentials>,
}

#[derive(Deserialize)]
struct InstalledCredentials {
    client_id: String,
    client_secret: String,
}

impl GmailCredentials {
    /// Load credentials using the following priority:
    /// 1. Compile-time embedded credentials (for release builds)
    /// 2. JSON file (~/.config/herald/google-credentials.json)
    /// 3. Runtime environment variables
    pub fn load() -> Result<Self> {
        if let Some(creds) = Self::from_compile_time() {
            return Ok(creds);
        }

        if config::config_exists(CREDENTIALS_FILE) {
            let creds: GoogleCredentialFile = config::load_json(CREDENTIALS_FILE)?;
            return Self::from_credential_file(creds);
        }

        Self::from_env()
    }

    /// Load credentials embedded at compile time via environment variables.
    /// Build with: GOOGLE_CLIENT_ID=xxx GOOGLE_CLIENT_SECRET=yyy cargo build --release
    pub fn from_compile_time() -> Option<Self> {
        let client_id = option_env!("GOOGLE_CLIENT_ID")?;
        let client_secret = option_env!("GOOGLE_CLIENT_SECRET")?;

        if client_id.is_empty() || client_secret.is_empty() {
            return None;
        }

        Some(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    /// Load credentials from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let creds: GoogleCredentialFile = config::load_json_file(path)?;
        Self::from_credential_file(creds)
    }

    fn from_credential_file(creds: GoogleCredentialFile) -> Result<Self> {
        // "installed" (desktop) and "web" credential types share a layout
        let installed = creds
            .installed
            .or(creds.web)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: installed.client_id,
            client_secret: installed.client_secret,
        })
    }

    /// Parse credentials from JSON string (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(creds)
    }

    /// Load credentials from environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GMAIL_CLIENT_ID")
            .context("GMAIL_CLIENT_ID environment variable not set")?;
        let client_secret = std::env::var("GMAIL_CLIENT_SECRET")
            .context("GMAIL_CLIENT_SECRET environment variable not set")?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }

    /// Get the default credentials file path (~/.config/herald/google-credentials.json)
    pub fn default_credentials_path() -> Option<PathBuf> {
        config::config_path(CREDENTIALS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_installed_credentials() {
        let json = r#"{
            "installed": {
                "client_id": "test-client-id.apps.googleusercontent.com",
                "client_secret": "test-secret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        }"#;

        let creds = GmailCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "test-client-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "test-secret");
    }

    #[test]
    fn test_parse_web_credentials() {
        let json = r#"{ "web": { "client_id": "web-id", "client_secret": "web-secret" } }"#;

        let creds = GmailCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "web-id");
        assert_eq!(creds.client_secret, "web-secret");
    }

    #[test]
    fn test_invalid_credentials_json() {
        assert!(GmailCredentials::from_json(r#"{ "other": {} }"#).is_err());
    }

    #[test]
    fn test_briefing_defaults() {
        let config = BriefingConfig::default();
        assert_eq!(config.unread_limit, 5);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_partial_settings_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("herald.json");
        std::fs::write(&path, r#"{ "api_base_url": "https://summary.example.com" }"#).unwrap();

        let config = BriefingConfig::from_file(&path).unwrap();
        assert_eq!(config.api_base_url, "https://summary.example.com");
        assert_eq!(config.unread_limit, DEFAULT_UNREAD_LIMIT);
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_validation_clamps_limits() {
        let config = BriefingConfig {
            unread_limit: 0,
            request_timeout_secs: 0,
            ..BriefingConfig::default()
        }
        .validated()
        .unwrap();
        assert_eq!(config.unread_limit, 1);
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_validation_rejects_non_http_url() {
        let config = BriefingConfig {
            api_base_url: "ftp://summary.example.com".into(),
            ..BriefingConfig::default()
        };
        assert!(config.validated().is_err());

        let config = BriefingConfig {
            api_base_url: "not a url".into(),
            ..BriefingConfig::default()
        };
        assert!(config.validated().is_err());
    }
}
