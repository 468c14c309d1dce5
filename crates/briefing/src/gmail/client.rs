//! Gmail API HTTP client
//!
//! Lists unread messages and fetches their header metadata. Only the
//! `From` and `Subject` headers plus the provider snippet are requested,
//! never message bodies.

use log::{debug, info};
use std::time::Duration;
use ureq::Agent;

use super::api::{ErrorResponse, GmailMessage, ListMessagesResponse};
use super::normalize_metadata;
use crate::error::{FlowError, FlowResult};
use crate::fetch::MailFetcher;
use crate::http;
use crate::models::{EmailRecord, Identity};

/// Gmail error reasons that mean "slow down" rather than "not allowed"
const RATE_LIMIT_REASONS: &[&str] = &[
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "quotaExceeded",
    "dailyLimitExceeded",
];

/// Gmail API client for reading unread message metadata
pub struct GmailClient {
    agent: Agent,
    base_url: String,
}

impl GmailClient {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Search filter applied to the listing
    const UNREAD_QUERY: &'static str = "is:unread";

    /// Headers requested per message
    const METADATA_HEADERS: [&'static str; 2] = ["From", "Subject"];

    /// Gmail's page-size ceiling
    const MAX_RESULTS: usize = 500;

    /// Create a client for the public Gmail API
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(Self::BASE_URL, timeout)
    }

    /// Create a client against another endpoint (e.g. a local stub)
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            agent: http::agent(timeout),
            base_url,
        }
    }

    /// List unread message IDs, newest first
    ///
    /// # Arguments
    /// * `identity` - Signed-in account whose mailbox is listed
    /// * `max_results` - Maximum number of IDs to return (clamped to 1-500)
    pub fn list_unread(
        &self,
        identity: &Identity,
        max_results: usize,
    ) -> FlowResult<ListMessagesResponse> {
        let url = format!("{}/users/me/messages", self.base_url);
        let max_results = max_results.clamp(1, Self::MAX_RESULTS).to_string();

        let result = self
            .agent
            .get(&url)
            .query("q", Self::UNREAD_QUERY)
            .query("maxResults", &max_results)
            .header("Authorization", &http::bearer(identity.access_token()))
            .call();

        let body = Self::expect_success(http::read_response(result, "Listing unread mail")?)?;
        serde_json::from_str(&body)
            .map_err(|e| FlowError::Decode(format!("message list: {}", e)))
    }

    /// Get header-only metadata for one message
    pub fn get_metadata(&self, identity: &Identity, id: &str) -> FlowResult<GmailMessage> {
        let url = format!(
            "{}/users/me/messages/{}",
            self.base_url,
            urlencoding::encode(id)
        );

        let mut request = self
            .agent
            .get(&url)
            .query("format", "metadata")
            .header("Authorization", &http::bearer(identity.access_token()));
        for header in Self::METADATA_HEADERS {
            request = request.query("metadataHeaders", header);
        }

        let body = Self::expect_success(http::read_response(request.call(), "Reading message")?)?;
        serde_json::from_str(&body)
            .map_err(|e| FlowError::Decode(format!("message metadata: {}", e)))
    }

    fn expect_success((status, body): (u16, String)) -> FlowResult<String> {
        if http::is_success(status) {
            Ok(body)
        } else {
            Err(classify_status(status, &body))
        }
    }
}

impl MailFetcher for GmailClient {
    fn fetch_unread(&self, identity: &Identity, limit: usize) -> FlowResult<Vec<EmailRecord>> {
        let listing = self.list_unread(identity, limit)?;
        let refs = listing.messages.unwrap_or_default();

        if refs.is_empty() {
            info!("No unread messages");
            return Ok(Vec::new());
        }

        // One detail call per message, in listing order
        let mut records = Vec::with_capacity(refs.len().min(limit));
        for msg_ref in refs.iter().take(limit) {
            debug!("Fetching metadata for message {}", msg_ref.id);
            let message = self.get_metadata(identity, &msg_ref.id)?;
            records.push(normalize_metadata(message));
        }

        info!("Fetched metadata for {} unread messages", records.len());
        Ok(records)
    }
}

/// Classify a non-2xx Gmail response
fn classify_status(status: u16, body: &str) -> FlowError {
    let detail = serde_json::from_str::<ErrorResponse>(body).ok().map(|r| r.error);

    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| format!("HTTP {}", status));

    let rate_limited = detail
        .as_ref()
        .and_then(|d| d.errors.as_ref())
        .is_some_and(|errors| {
            errors.iter().any(|e| {
                e.reason
                    .as_deref()
                    .is_some_and(|r| RATE_LIMIT_REASONS.contains(&r))
            })
        });

    match status {
        429 => FlowError::Quota(message),
        403 if rate_limited => FlowError::Quota(message),
        401 | 403 => FlowError::Auth(message),
        _ => FlowError::Network(format!("Gmail returned HTTP {}: {}", status, message)),
    }
}
