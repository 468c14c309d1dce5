//! Remote summarization service
//!
//! The service takes a batch of email metadata and answers with the URL of a
//! synthesized audio summary plus the text it was read from.

mod client;

pub use client::SummaryApiClient;

use crate::error::FlowResult;
use crate::models::{EmailRecord, SummaryResult};

/// Turns a batch of email metadata into an audio summary
pub trait Summarizer: Send + Sync {
    fn summarize(&self, records: &[EmailRecord]) -> FlowResult<SummaryResult>;
}

/// Summarization service wire types
pub mod api {
    use serde::{Deserialize, Serialize};

    use crate::models::EmailRecord;

    /// Path of the summarization endpoint, relative to the base URL
    pub const GENERATE_SUMMARY_PATH: &str = "/generate-summary-audio";

    /// Request body: `{"emails": [...]}`
    #[derive(Debug, Serialize)]
    pub struct SummaryRequest<'a> {
        pub emails: &'a [EmailRecord],
    }

    /// Response body
    #[derive(Debug, Deserialize)]
    pub struct SummaryResponse {
        pub audio_url: String,
        #[serde(default)]
        pub summary_text_for_debug: String,
    }
}
