//! HTTP client for the summarization service
//!
//! One POST per flow, no retries. Only counts and status codes are logged;
//! the email batch itself never reaches the log.

use log::{debug, info};
use std::time::Duration;
use ureq::Agent;

use super::Summarizer;
use super::api::{GENERATE_SUMMARY_PATH, SummaryRequest, SummaryResponse};
use crate::config::BriefingConfig;
use crate::error::{FlowError, FlowResult};
use crate::http;
use crate::models::{EmailRecord, SummaryResult};

/// Client for `POST /generate-summary-audio`
pub struct SummaryApiClient {
    agent: Agent,
    endpoint: String,
    api_key: Option<String>,
}

impl SummaryApiClient {
    /// Create a client from the briefing configuration
    pub fn new(config: &BriefingConfig) -> Self {
        let client = Self::with_base_url(&config.api_base_url, config.request_timeout());
        match &config.api_key {
            Some(key) => client.with_api_key(key.clone()),
            None => client,
        }
    }

    /// Create a client for `base_url` with each network phase bounded by `timeout`
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        let endpoint = format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            GENERATE_SUMMARY_PATH
        );
        Self {
            agent: http::agent(timeout),
            endpoint,
            api_key: None,
        }
    }

    /// Send `key` as a bearer token on every request
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Summarizer for SummaryApiClient {
    fn summarize(&self, records: &[EmailRecord]) -> FlowResult<SummaryResult> {
        info!("Requesting summary for {} messages", records.len());

        let mut request = self
            .agent
            .post(&self.endpoint)
            .header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", &http::bearer(key));
        }

        let result = request.send_json(&SummaryRequest { emails: records });
        let (status, body) = http::read_response(result, "Summary request")?;
        debug!("Summary service answered HTTP {}", status);

        if !http::is_success(status) {
            return Err(FlowError::HttpStatus { status });
        }

        decode_summary(&body)
    }
}

/// Decode and validate a summarization response body
pub(crate) fn decode_summary(body: &str) -> FlowResult<SummaryResult> {
    let response: SummaryResponse =
        serde_json::from_str(body).map_err(|e| FlowError::Decode(e.to_string()))?;

    SummaryResult::new(response.audio_url, response.summary_text_for_debug)
        .ok_or_else(|| FlowError::Decode("audio_url is empty".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Canned, StubServer};

    fn client(server: &StubServer) -> SummaryApiClient {
        SummaryApiClient::with_base_url(&server.base_url, Duration::from_secs(5))
    }

    #[test]
    fn test_decode_summary() {
        let result =
            decode_summary(r#"{"audio_url":"https://x/a.mp3","summary_text_for_debug":"ok"}"#)
                .unwrap();
        assert_eq!(result.audio_url, "https://x/a.mp3");
        assert_eq!(result.summary_text, "ok");
    }

    #[test]
    fn test_decode_missing_audio_url() {
        let err = decode_summary(r#"{"summary_text_for_debug":"ok"}"#).unwrap_err();
        match err {
            FlowError::Decode(msg) => assert!(msg.contains("audio_url")),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_empty_audio_url() {
        let err = decode_summary(r#"{"audio_url":"","summary_text_for_debug":"ok"}"#).unwrap_err();
        assert_eq!(err, FlowError::Decode("audio_url is empty".into()));
    }

    #[test]
    fn test_decode_missing_summary_text_defaults_to_empty() {
        let result = decode_summary(r#"{"audio_url":"https://x/a.mp3"}"#).unwrap();
        assert_eq!(result.summary_text, "");
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = SummaryApiClient::with_base_url("https://api.example.com/", Duration::from_secs(1));
        assert_eq!(client.endpoint(), "https://api.example.com/generate-summary-audio");
    }

    #[test]
    fn test_summarize_posts_batch() {
        let server = StubServer::start(vec![Canned::json(
            200,
            r#"{"audio_url":"https://x/a.mp3","summary_text_for_debug":"two new emails"}"#,
        )]);
        let records = vec![
            EmailRecord::new(Some("Ann <ann@example.com>".into()), Some("Hi".into()), None),
            EmailRecord::new(None, None, Some("preview".into())),
        ];

        let result = client(&server).summarize(&records).unwrap();
        assert_eq!(result.summary_text, "two new emails");

        let requests = server.finish();
        assert_eq!(
            requests[0].request_line(),
            "POST /generate-summary-audio HTTP/1.1"
        );
        assert!(requests[0].header("authorization").is_none());

        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        let emails = body["emails"].as_array().unwrap();
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0]["from"], "Ann <ann@example.com>");
        assert_eq!(emails[1]["snippet"], "preview");
        assert!(emails[1].get("from").is_none());
    }

    #[test]
    fn test_summarize_empty_batch() {
        let server = StubServer::start(vec![Canned::json(
            200,
            r#"{"audio_url":"https://x/none.mp3","summary_text_for_debug":"No unread mail."}"#,
        )]);

        let result = client(&server).summarize(&[]).unwrap();
        assert_eq!(result.summary_text, "No unread mail.");

        let requests = server.finish();
        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(body, serde_json::json!({ "emails": [] }));
    }

    #[test]
    fn test_summarize_sends_api_key() {
        let server = StubServer::start(vec![Canned::json(
            200,
            r#"{"audio_url":"https://x/a.mp3","summary_text_for_debug":"ok"}"#,
        )]);

        client(&server).with_api_key("service-key").summarize(&[]).unwrap();

        let requests = server.finish();
        assert_eq!(requests[0].header("authorization"), Some("Bearer service-key"));
    }

    #[test]
    fn test_summarize_non_success_status() {
        let server = StubServer::start(vec![Canned::json(
            500,
            r#"{"detail":"Error generating or uploading the audio."}"#,
        )]);

        let err = client(&server).summarize(&[]).unwrap_err();
        assert_eq!(err, FlowError::HttpStatus { status: 500 });
        server.finish();
    }

    #[test]
    fn test_summarize_schema_mismatch() {
        let server = StubServer::start(vec![Canned::json(200, r#"{"url":"https://x/a.mp3"}"#)]);

        let err = client(&server).summarize(&[]).unwrap_err();
        assert!(matches!(err, FlowError::Decode(_)));
        server.finish();
    }
}
