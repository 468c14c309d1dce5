//! Gmail API response normalization
//!
//! Converts metadata-format Gmail messages to [`EmailRecord`]s.

use super::api::{GmailMessage, MessagePayload};
use crate::models::EmailRecord;

/// Normalize a metadata-format Gmail message to an [`EmailRecord`]
///
/// Missing headers stay `None`; nothing is invented.
pub fn normalize_metadata(gmail_msg: GmailMessage) -> EmailRecord {
    let payload = gmail_msg.payload.as_ref();

    let from = payload.and_then(|p| extract_header(p, "From"));
    let subject = payload.and_then(|p| extract_header(p, "Subject"));
    let snippet = gmail_msg.snippet.as_deref().map(decode_html_entities);

    EmailRecord::new(from, subject, snippet)
}

/// Extract a header value by name
fn extract_header(payload: &MessagePayload, name: &str) -> Option<String> {
    payload.headers.as_ref()?.iter().find_map(|h| {
        if h.name.eq_ignore_ascii_case(name) {
            Some(h.value.clone())
        } else {
            None
        }
    })
}

/// Decode HTML entities in snippet text
fn decode_html_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::api::Header;

    fn make_message(headers: Vec<(&str, &str)>, snippet: Option<&str>) -> GmailMessage {
        GmailMessage {
            id: "m1".to_string(),
            snippet: snippet.map(str::to_string),
            payload: Some(MessagePayload {
                headers: Some(
                    headers
                        .into_iter()
                        .map(|(n, v)| Header {
                            name: n.to_string(),
                            value: v.to_string(),
                        })
                        .collect(),
                ),
            }),
        }
    }

    #[test]
    fn test_extracts_from_and_subject() {
        let msg = make_message(
            vec![("From", "Jane <jane@example.com>"), ("Subject", "Quarterly report")],
            Some("Numbers attached"),
        );
        let record = normalize_metadata(msg);
        assert_eq!(record.from(), Some("Jane <jane@example.com>"));
        assert_eq!(record.subject(), Some("Quarterly report"));
        assert_eq!(record.snippet(), Some("Numbers attached"));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let msg = make_message(vec![("from", "a@example.com"), ("SUBJECT", "Hi")], None);
        let record = normalize_metadata(msg);
        assert_eq!(record.from(), Some("a@example.com"));
        assert_eq!(record.subject(), Some("Hi"));
    }

    #[test]
    fn test_missing_headers_stay_empty() {
        let msg = GmailMessage {
            id: "m2".to_string(),
            snippet: None,
            payload: None,
        };
        let record = normalize_metadata(msg);
        assert_eq!(record, EmailRecord::default());
    }

    #[test]
    fn test_snippet_entities_are_decoded() {
        let msg = make_message(vec![], Some("Tom &amp; Jerry &lt;3 &quot;cheese&quot; &#39;n&#39; more"));
        let record = normalize_metadata(msg);
        assert_eq!(record.snippet(), Some("Tom & Jerry <3 \"cheese\" 'n' more"));
    }

    #[test]
    fn test_double_escaped_entity_decodes_once() {
        let msg = make_message(vec![], Some("&amp;lt;"));
        let record = normalize_metadata(msg);
        assert_eq!(record.snippet(), Some("&lt;"));
    }
}
