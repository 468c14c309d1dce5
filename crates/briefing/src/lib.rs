//! Briefing crate - spoken summaries of unread Gmail
//!
//! This crate provides the platform-independent core of Herald:
//! - Domain models (EmailRecord, SummaryResult, Identity)
//! - Gmail metadata client and desktop OAuth sign-in
//! - Summarization service client
//! - Single-resource audio playback controller over an injected backend
//! - The flow state machine tying the stages together
//!
//! This crate has zero UI dependencies; mobile shells drive it through the
//! UniFFI bindings in [`ffi`].

uniffi::setup_scaffolding!();

pub mod auth;
pub mod config;
pub mod error;
pub mod ffi;
pub mod fetch;
pub mod flow;
pub mod gmail;
mod http;
pub mod models;
pub mod playback;
pub mod summary;

#[cfg(test)]
mod test_support;

pub use auth::{AuthGate, IdentityProvider};
pub use config::{BriefingConfig, GmailCredentials};
pub use error::{FlowError, FlowResult};
pub use fetch::MailFetcher;
pub use flow::{FlowObserver, FlowOrchestrator, FlowState, stages};
pub use gmail::{GmailAuth, GmailClient};
pub use models::{EmailRecord, Identity, SummaryResult};
pub use playback::{AudioBackend, AudioHandle, AudioPlaybackController, PlaybackError, PlaybackListener};
pub use summary::{SummaryApiClient, Summarizer};
