//! FFI-friendly types for UniFFI export
//!
//! These mirror the core types in shapes Kotlin/Swift can consume:
//! - `FlowError` → flat `BriefingError`
//! - `FlowState` → `FfiFlowState` (sealed class / enum with payloads)
//! - `usize`/`Duration` settings → `u32`/`u64`

use std::sync::Arc;

use crate::config::BriefingConfig;
use crate::error::FlowError;
use crate::flow::FlowState;
use crate::models::Identity;

use super::service::PlaybackEvents;

// ============================================================================
// Error Types
// ============================================================================

/// FFI-friendly error type
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum BriefingError {
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Sign-in was cancelled")]
    AuthCancelled,

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Summary service returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("Could not decode response: {message}")]
    Decode { message: String },

    #[error("Rate limited: {message}")]
    Quota { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("{message}")]
    Flow { message: String },
}

impl From<FlowError> for BriefingError {
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::Auth(message) => BriefingError::Auth { message },
            FlowError::AuthCancelled => BriefingError::AuthCancelled,
            FlowError::Network(message) => BriefingError::Network { message },
            FlowError::HttpStatus { status } => BriefingError::HttpStatus { status },
            FlowError::Decode(message) => BriefingError::Decode { message },
            FlowError::Quota(message) => BriefingError::Quota { message },
            FlowError::Other(message) => BriefingError::Flow { message },
        }
    }
}

// ============================================================================
// Flow State
// ============================================================================

/// FFI-friendly flow state; render it with one exhaustive `when`/`switch`
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FfiFlowState {
    SignedOut,
    Idle,
    Loading { message: String },
    Playing { summary_text: String },
    Finished,
    Error { message: String },
}

impl From<FlowState> for FfiFlowState {
    fn from(state: FlowState) -> Self {
        match state {
            FlowState::SignedOut => FfiFlowState::SignedOut,
            FlowState::Idle => FfiFlowState::Idle,
            FlowState::Loading { message } => FfiFlowState::Loading { message },
            FlowState::Playing { summary_text } => FfiFlowState::Playing { summary_text },
            FlowState::Finished => FfiFlowState::Finished,
            FlowState::Error { message } => FfiFlowState::Error { message },
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// FFI-friendly briefing settings
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBriefingConfig {
    pub api_base_url: String,
    pub unread_limit: u32,
    pub request_timeout_secs: u64,
    pub api_key: Option<String>,
}

impl From<BriefingConfig> for FfiBriefingConfig {
    fn from(c: BriefingConfig) -> Self {
        Self {
            api_base_url: c.api_base_url,
            unread_limit: c.unread_limit as u32,
            request_timeout_secs: c.request_timeout_secs,
            api_key: c.api_key,
        }
    }
}

impl TryFrom<FfiBriefingConfig> for BriefingConfig {
    type Error = BriefingError;

    fn try_from(c: FfiBriefingConfig) -> Result<Self, Self::Error> {
        BriefingConfig {
            api_base_url: c.api_base_url,
            unread_limit: c.unread_limit as usize,
            request_timeout_secs: c.request_timeout_secs,
            api_key: c.api_key,
        }
        .validated()
        .map_err(|e| BriefingError::InvalidArgument {
            message: format!("{:#}", e),
        })
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Account handle produced by the platform's Google Sign-In
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiIdentity {
    /// OAuth access token with the gmail.readonly scope
    pub access_token: String,
    pub account: Option<String>,
}

impl From<FfiIdentity> for Identity {
    fn from(i: FfiIdentity) -> Self {
        let identity = Identity::new(i.access_token);
        match i.account {
            Some(account) => identity.with_account(account),
            None => identity,
        }
    }
}

/// Outcome of the platform's interactive sign-in
#[derive(Debug, Clone, uniffi::Enum)]
pub enum FfiSignInResult {
    Success { identity: FfiIdentity },
    Cancelled,
    Failed { message: String },
}

// ============================================================================
// Foreign Implementations
// ============================================================================

/// Platform identity provider (e.g. Google Sign-In on Android)
///
/// Calls arrive on the flow's background thread; `sign_in` may block until
/// the user finishes the consent screen.
#[uniffi::export(with_foreign)]
pub trait IdentityBridge: Send + Sync {
    /// Whether an account was previously signed in
    fn is_signed_in(&self) -> bool;
    /// A usable identity without prompting, if one exists
    fn cached_identity(&self) -> Option<FfiIdentity>;
    /// Show the consent screen and wait for the user
    fn sign_in(&self) -> FfiSignInResult;
    fn sign_out(&self);
    /// Gmail rejected the cached token; clear it (e.g. `GoogleAuthUtil.clearToken`)
    fn invalidate(&self);
}

/// Platform media player holding one resource at a time
///
/// `load` must prepare asynchronously and report through `events`:
/// `prepared()` when ready, then `completed()` or `failed(reason)`.
#[uniffi::export(with_foreign)]
pub trait AudioPlayer: Send + Sync {
    fn load(&self, url: String, events: Arc<PlaybackEvents>);
    fn start(&self);
    fn release(&self);
}

// ============================================================================
// Callbacks
// ============================================================================

/// Callback interface receiving every flow state
#[uniffi::export(callback_interface)]
pub trait FlowStateObserver: Send + Sync {
    /// Called on the thread that changed the state; post to the UI thread
    fn on_state_changed(&self, state: FfiFlowState);
}

/// Log level for FFI callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<log::Level> for FfiLogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => FfiLogLevel::Error,
            log::Level::Warn => FfiLogLevel::Warn,
            log::Level::Info => FfiLogLevel::Info,
            log::Level::Debug => FfiLogLevel::Debug,
            log::Level::Trace => FfiLogLevel::Trace,
        }
    }
}

impl From<FfiLogLevel> for log::LevelFilter {
    fn from(level: FfiLogLevel) -> Self {
        match level {
            FfiLogLevel::Error => log::LevelFilter::Error,
            FfiLogLevel::Warn => log::LevelFilter::Warn,
            FfiLogLevel::Info => log::LevelFilter::Info,
            FfiLogLevel::Debug => log::LevelFilter::Debug,
            FfiLogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Callback interface for receiving log messages from Rust
///
/// Android should forward these to `android.util.Log`.
#[uniffi::export(callback_interface)]
pub trait LogCallback: Send + Sync {
    /// Called when a log message is emitted
    ///
    /// # Arguments
    /// * `level` - The log level (error, warn, info, debug, trace)
    /// * `target` - The logging target (typically module path, e.g., "briefing::flow")
    /// * `message` - The log message
    fn on_log(&self, level: FfiLogLevel, target: String, message: String);
}
