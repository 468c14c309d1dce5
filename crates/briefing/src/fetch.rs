//! Mail fetching contract
//!
//! The orchestrator only needs "give me the newest unread headers"; the Gmail
//! client is the production implementation, tests substitute fakes.

use crate::error::FlowResult;
use crate::models::{EmailRecord, Identity};

/// Lists unread messages and returns their header metadata
pub trait MailFetcher: Send + Sync {
    /// Fetch up to `limit` unread messages for `identity`, in provider order
    ///
    /// No unread mail is an empty list, not an error.
    fn fetch_unread(&self, identity: &Identity, limit: usize) -> FlowResult<Vec<EmailRecord>>;
}
