//! FFI bindings for UniFFI export
//!
//! This module provides Kotlin/Swift bindings for the briefing flow via
//! UniFFI. The platform supplies sign-in, the media player and a state
//! observer; Rust runs the stages.
//!
//! ## Usage from Kotlin
//!
//! ```kotlin
//! import uniffi.briefing_ffi.*
//!
//! initLogging(AndroidLogCallback(), FfiLogLevel.INFO)
//!
//! val service = BriefingService(
//!     defaultBriefingConfig().copy(apiBaseUrl = BuildConfig.SUMMARY_URL),
//!     GoogleSignInBridge(activity),
//!     MediaPlayerBridge(),
//!     object : FlowStateObserver {
//!         override fun onStateChanged(state: FfiFlowState) {
//!             mainHandler.post { render(state) }
//!         }
//!     }
//! )
//!
//! button.setOnClickListener { service.startBriefing() }
//! ```

mod logging;
mod service;
mod types;

pub use logging::{init_logging, set_log_level};
pub use service::*;
pub use types::*;
