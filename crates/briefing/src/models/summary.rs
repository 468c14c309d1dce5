//! Result of a summarization request

/// Audio location and transcript returned by the summarization service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    /// HTTP(S) URL of the synthesized audio; never empty
    pub audio_url: String,
    /// Text the audio was synthesized from
    pub summary_text: String,
}

impl SummaryResult {
    /// Build a result, rejecting an empty audio URL
    pub fn new(audio_url: impl Into<String>, summary_text: impl Into<String>) -> Option<Self> {
        let audio_url = audio_url.into();
        if audio_url.trim().is_empty() {
            return None;
        }
        Some(Self {
            audio_url,
            summary_text: summary_text.into(),
        })
    }
}
