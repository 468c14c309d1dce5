//! Gmail OAuth2 authentication
//!
//! Implements the OAuth2 authorization code flow for desktop use, with a
//! local HTTP listener receiving the redirect. Tokens are cached as JSON in
//! the Herald config directory and refreshed when they are about to expire.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};

use crate::auth::IdentityProvider;
use crate::config::GmailCredentials;
use crate::error::{FlowError, FlowResult};
use crate::models::Identity;

/// Desktop identity provider backed by Google's OAuth2 endpoints
pub struct GmailAuth {
    client_id: String,
    client_secret: String,
    token_path: PathBuf,
}

/// Token data cached on disk
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
}

impl StoredToken {
    /// Tokens this close to expiry are treated as expired
    const EXPIRY_BUFFER_SECS: i64 = 300;

    fn is_fresh(&self, now: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at > now + Self::EXPIRY_BUFFER_SECS)
    }
}

/// Token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

/// What the browser redirect carried back
#[derive(Debug, PartialEq, Eq)]
enum CallbackOutcome {
    Code(String),
    Denied,
    Failed(String),
}

impl GmailAuth {
    /// Google OAuth2 endpoints
    const AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Read-only access is all the briefing needs
    const GMAIL_READONLY_SCOPE: &'static str = "https://www.googleapis.com/auth/gmail.readonly";

    /// Port range to try for the local OAuth callback listener
    const PORT_RANGE_START: u16 = 8080;
    const PORT_RANGE_END: u16 = 8090;

    /// Token cache filename in the Herald config directory
    const TOKEN_FILE: &'static str = "gmail-tokens.json";

    /// Create a provider that caches tokens in ~/.config/herald/gmail-tokens.json
    pub fn new(credentials: &GmailCredentials) -> Result<Self> {
        let token_path =
            config::config_path(Self::TOKEN_FILE).context("Could not determine config directory")?;
        Ok(Self::with_token_path(
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
            token_path,
        ))
    }

    /// Create a provider with an explicit token cache location
    pub fn with_token_path(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_path: token_path.into(),
        }
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Perform the authorization code flow in the user's browser
    fn authorization_code_auth(&self) -> FlowResult<TokenResponse> {
        let (listener, port) = self
            .start_local_server()
            .map_err(|e| FlowError::Auth(format!("{:#}", e)))?;
        let redirect_uri = format!("http://localhost:{}", port);

        let auth_url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            Self::AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&redirect_uri),
            urlencoding::encode(Self::GMAIL_READONLY_SCOPE),
        );

        println!("\n=== Google Sign-In Required ===");
        println!("Opening browser for authentication...");
        println!("If the browser doesn't open, visit: {}", auth_url);

        if let Err(e) = open::that(&auth_url) {
            warn!("Failed to open browser: {}", e);
        }

        // No timeout: the user may take as long as they like
        let outcome = self
            .wait_for_callback(listener)
            .map_err(|e| FlowError::Auth(format!("{:#}", e)))?;

        let code = match outcome {
            CallbackOutcome::Code(code) => code,
            CallbackOutcome::Denied => return Err(FlowError::AuthCancelled),
            CallbackOutcome::Failed(reason) => {
                return Err(FlowError::Auth(format!("OAuth error: {}", reason)));
            }
        };

        debug!("Exchanging authorization code for tokens");
        let mut response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .map_err(|e| FlowError::Auth(format!("Failed to exchange authorization code: {}", e)))?;

        response
            .body_mut()
            .read_json()
            .map_err(|e| FlowError::Decode(format!("token response: {}", e)))
    }

    /// Start a local TCP listener on an available port
    fn start_local_server(&self) -> Result<(TcpListener, u16)> {
        for port in Self::PORT_RANGE_START..=Self::PORT_RANGE_END {
            if let Ok(listener) = TcpListener::bind(format!("127.0.0.1:{}", port)) {
                return Ok((listener, port));
            }
        }
        anyhow::bail!(
            "Could not bind to any port in range {}-{}",
            Self::PORT_RANGE_START,
            Self::PORT_RANGE_END
        )
    }

    /// Wait for the OAuth redirect and answer the browser
    fn wait_for_callback(&self, listener: TcpListener) -> Result<CallbackOutcome> {
        let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

        let mut request_line = String::new();
        BufReader::new(&stream)
            .read_line(&mut request_line)
            .context("Failed to read request")?;

        let outcome = parse_callback(&request_line);

        let (status, body) = match outcome {
            CallbackOutcome::Code(_) => ("200 OK", "Signed in! You can close this window."),
            CallbackOutcome::Denied => ("200 OK", "Sign-in cancelled. You can close this window."),
            CallbackOutcome::Failed(_) => ("400 Bad Request", "Sign-in failed. Please try again."),
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h1>{}</h1></body></html>",
            status, body
        );
        stream.write_all(response.as_bytes()).ok();

        Ok(outcome)
    }

    /// Refresh an access token using a refresh token
    fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .context("Failed to refresh access token")?;

        let mut token: TokenResponse = response
            .into_body()
            .read_json()
            .context("Failed to parse refresh token response")?;

        // Google omits the refresh token on refresh; keep the one we have
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }

        Ok(token)
    }

    fn load_token(&self) -> Result<StoredToken> {
        config::load_json_file(&self.token_path)
    }

    fn save_token_response(&self, token: &TokenResponse) -> Result<StoredToken> {
        let stored = StoredToken {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_at: token
                .expires_in
                .map(|d| chrono::Utc::now().timestamp() + d as i64),
        };
        config::save_json_file(&self.token_path, &stored)?;
        Ok(stored)
    }

    fn remove_token(&self) -> FlowResult<()> {
        if self.token_path.exists() {
            fs::remove_file(&self.token_path)
                .with_context(|| format!("Failed to remove {}", self.token_path.display()))?;
        }
        Ok(())
    }
}

impl IdentityProvider for GmailAuth {
    fn is_signed_in(&self) -> bool {
        self.token_path.exists()
    }

    fn cached_identity(&self) -> FlowResult<Option<Identity>> {
        let token = match self.load_token() {
            Ok(token) => token,
            Err(e) => {
                debug!("No usable cached token: {:#}", e);
                return Ok(None);
            }
        };

        if token.is_fresh(chrono::Utc::now().timestamp()) {
            return Ok(Some(Identity::new(token.access_token)));
        }

        if let Some(refresh_token) = token.refresh_token {
            match self.refresh_access_token(&refresh_token) {
                Ok(fresh) => {
                    let stored = self.save_token_response(&fresh)?;
                    info!("Refreshed Gmail access token");
                    return Ok(Some(Identity::new(stored.access_token)));
                }
                Err(e) => warn!("Token refresh failed, sign-in required: {:#}", e),
            }
        }

        Ok(None)
    }

    fn sign_in(&self) -> FlowResult<Identity> {
        let token = self.authorization_code_auth()?;
        let stored = self.save_token_response(&token)?;
        Ok(Identity::new(stored.access_token))
    }

    fn sign_out(&self) -> FlowResult<()> {
        self.remove_token()
    }

    fn invalidate(&self) -> FlowResult<()> {
        // A revoked grant can't be refreshed either; start over
        self.remove_token()
    }
}

/// Parse the redirect request line, e.g. `GET /?code=AUTH_CODE&scope=... HTTP/1.1`
fn parse_callback(request_line: &str) -> CallbackOutcome {
    let Some(target) = request_line.split_whitespace().nth(1) else {
        return CallbackOutcome::Failed("malformed callback request".into());
    };
    let Ok(url) = url::Url::parse(&format!("http://localhost{}", target)) else {
        return CallbackOutcome::Failed("malformed callback URL".into());
    };

    let mut code = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    match (code, error) {
        (_, Some(error)) if error == "access_denied" => CallbackOutcome::Denied,
        (_, Some(error)) => CallbackOutcome::Failed(error),
        (Some(code), None) => CallbackOutcome::Code(code),
        (None, None) => CallbackOutcome::Failed("no authorization code received".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_in(dir: &tempfile::TempDir) -> GmailAuth {
        GmailAuth::with_token_path("client", "secret", dir.path().join("gmail-tokens.json"))
    }

    fn write_token(auth: &GmailAuth, expires_at: Option<i64>, refresh: Option<&str>) {
        let token = StoredToken {
            access_token: "cached-access".to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_at,
        };
        config::save_json_file(auth.token_path(), &token).unwrap();
    }

    #[test]
    fn test_parse_callback_code() {
        assert_eq!(
            parse_callback("GET /?code=4%2F0Abc&scope=gmail.readonly HTTP/1.1\r\n"),
            CallbackOutcome::Code("4/0Abc".into())
        );
    }

    #[test]
    fn test_parse_callback_access_denied_is_cancel() {
        assert_eq!(
            parse_callback("GET /?error=access_denied HTTP/1.1"),
            CallbackOutcome::Denied
        );
    }

    #[test]
    fn test_parse_callback_other_error() {
        assert_eq!(
            parse_callback("GET /?error=invalid_scope HTTP/1.1"),
            CallbackOutcome::Failed("invalid_scope".into())
        );
    }

    #[test]
    fn test_parse_callback_without_code() {
        assert!(matches!(
            parse_callback("GET /favicon.ico HTTP/1.1"),
            CallbackOutcome::Failed(_)
        ));
        assert!(matches!(parse_callback(""), CallbackOutcome::Failed(_)));
    }

    #[test]
    fn test_no_token_file_means_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let auth = auth_in(&dir);

        assert!(!auth.is_signed_in());
        assert_eq!(auth.cached_identity().unwrap(), None);
    }

    #[test]
    fn test_fresh_token_is_returned_without_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let auth = auth_in(&dir);
        write_token(&auth, Some(chrono::Utc::now().timestamp() + 3600), None);

        assert!(auth.is_signed_in());
        let identity = auth.cached_identity().unwrap().unwrap();
        assert_eq!(identity.access_token(), "cached-access");
    }

    #[test]
    fn test_expired_token_without_refresh_needs_sign_in() {
        let dir = tempfile::tempdir().unwrap();
        let auth = auth_in(&dir);
        // Inside the five-minute buffer counts as expired
        write_token(&auth, Some(chrono::Utc::now().timestamp() + 60), None);

        assert_eq!(auth.cached_identity().unwrap(), None);
    }

    #[test]
    fn test_invalidate_drops_token_that_looks_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let auth = auth_in(&dir);
        write_token(&auth, Some(chrono::Utc::now().timestamp() + 3600), Some("refresh"));

        auth.invalidate().unwrap();

        assert!(!auth.is_signed_in());
        assert_eq!(auth.cached_identity().unwrap(), None);
    }

    #[test]
    fn test_sign_out_removes_cache_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let auth = auth_in(&dir);
        write_token(&auth, None, None);

        auth.sign_out().unwrap();
        assert!(!auth.is_signed_in());
        auth.sign_out().unwrap();
    }
}
