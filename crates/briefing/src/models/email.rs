//! Email metadata record sent to the summarization service

use serde::{Deserialize, Serialize};

/// Header-only metadata for one unread message
///
/// Every field is optional: the mail provider may omit a header, and the
/// summarization service copes with gaps. Records are immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    snippet: Option<String>,
}

impl EmailRecord {
    pub fn new(from: Option<String>, subject: Option<String>, snippet: Option<String>) -> Self {
        Self {
            from,
            subject,
            snippet,
        }
    }

    /// Raw `From` header, e.g. `"Jane Doe <jane@example.com>"`
    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Provider-supplied preview text
    pub fn snippet(&self) -> Option<&str> {
        self.snippet.as_deref()
    }
}
