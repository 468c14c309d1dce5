//! BriefingService facade for UniFFI export
//!
//! Wires the platform's identity provider, media player and state observer
//! into a [`FlowOrchestrator`]. Gmail and the summarization service are
//! reached from Rust.

use std::sync::Arc;

use crate::auth::{AuthGate, IdentityProvider};
use crate::config::BriefingConfig;
use crate::error::{FlowError, FlowResult};
use crate::ffi::types::*;
use crate::flow::{FlowObserver, FlowOrchestrator, FlowState};
use crate::gmail::GmailClient;
use crate::models::Identity;
use crate::playback::{
    AudioBackend, AudioHandle, AudioPlaybackController, PlaybackError, PlaybackListener,
};
use crate::summary::SummaryApiClient;

/// Main service object for the briefing flow
///
/// This is the primary entry point for Kotlin/Swift code. Hold one instance
/// for the lifetime of the screen; it owns the playing audio resource.
#[derive(uniffi::Object)]
pub struct BriefingService {
    orchestrator: Arc<FlowOrchestrator>,
}

#[uniffi::export]
impl BriefingService {
    /// Create a new BriefingService
    ///
    /// # Arguments
    /// * `config` - Summary service location and flow bounds
    /// * `identity` - Platform sign-in bridge
    /// * `player` - Platform media player
    /// * `observer` - Receives every state change
    #[uniffi::constructor]
    pub fn new(
        config: FfiBriefingConfig,
        identity: Arc<dyn IdentityBridge>,
        player: Arc<dyn AudioPlayer>,
        observer: Box<dyn FlowStateObserver>,
    ) -> Result<Arc<Self>, BriefingError> {
        let config = BriefingConfig::try_from(config)?;

        let auth = AuthGate::new(Arc::new(ForeignIdentity(identity)));
        let mail = Arc::new(GmailClient::new(config.request_timeout()));
        let summarizer = Arc::new(SummaryApiClient::new(&config));
        let audio = Arc::new(AudioPlaybackController::new(Arc::new(ForeignAudio(player))));

        let orchestrator = FlowOrchestrator::new(auth, mail, summarizer, audio)
            .with_unread_limit(config.unread_limit);
        orchestrator.subscribe(Arc::new(ForwardingObserver(observer)));

        Ok(Arc::new(Self {
            orchestrator: Arc::new(orchestrator),
        }))
    }

    /// Start a briefing in the background
    ///
    /// Returns `false` if one is already loading or playing.
    pub fn start_briefing(&self) -> bool {
        self.orchestrator.trigger()
    }

    /// Snapshot of the current state (for initial rendering)
    pub fn current_state(&self) -> FfiFlowState {
        self.orchestrator.state().into()
    }

    /// Stop the summary audio
    pub fn stop_playback(&self) -> bool {
        self.orchestrator.stop_playback()
    }

    /// Sign out and return to the signed-out state
    pub fn sign_out(&self) -> Result<(), BriefingError> {
        self.orchestrator.sign_out()?;
        Ok(())
    }
}

/// Playback progress sink handed to the platform player
#[derive(uniffi::Object)]
pub struct PlaybackEvents {
    listener: PlaybackListener,
}

#[uniffi::export]
impl PlaybackEvents {
    /// The resource is ready to play
    pub fn prepared(&self) {
        self.listener.prepared();
    }

    /// Playback reached the end
    pub fn completed(&self) {
        self.listener.completed();
    }

    /// Preparation or playback failed
    pub fn failed(&self, reason: String) {
        self.listener.failed(&reason);
    }
}

// ============================================================================
// Adapters
// ============================================================================

struct ForeignIdentity(Arc<dyn IdentityBridge>);

impl IdentityProvider for ForeignIdentity {
    fn is_signed_in(&self) -> bool {
        self.0.is_signed_in()
    }

    fn cached_identity(&self) -> FlowResult<Option<Identity>> {
        Ok(self.0.cached_identity().map(Identity::from))
    }

    fn sign_in(&self) -> FlowResult<Identity> {
        match self.0.sign_in() {
            FfiSignInResult::Success { identity } => Ok(identity.into()),
            FfiSignInResult::Cancelled => Err(FlowError::AuthCancelled),
            FfiSignInResult::Failed { message } => Err(FlowError::Auth(message)),
        }
    }

    fn sign_out(&self) -> FlowResult<()> {
        self.0.sign_out();
        Ok(())
    }

    fn invalidate(&self) -> FlowResult<()> {
        self.0.invalidate();
        Ok(())
    }
}

struct ForeignAudio(Arc<dyn AudioPlayer>);

impl AudioBackend for ForeignAudio {
    fn load(
        &self,
        url: &str,
        listener: PlaybackListener,
    ) -> Result<Box<dyn AudioHandle>, PlaybackError> {
        self.0
            .load(url.to_string(), Arc::new(PlaybackEvents { listener }));
        Ok(Box::new(ForeignAudioHandle(Arc::clone(&self.0))))
    }
}

struct ForeignAudioHandle(Arc<dyn AudioPlayer>);

impl AudioHandle for ForeignAudioHandle {
    fn start(&mut self) {
        self.0.start();
    }

    fn release(&mut self) {
        self.0.release();
    }
}

struct ForwardingObserver(Box<dyn FlowStateObserver>);

impl FlowObserver for ForwardingObserver {
    fn on_state(&self, state: &FlowState) {
        self.0.on_state_changed(state.clone().into());
    }
}

// ============================================================================
// Free Functions
// ============================================================================

/// Default settings, for the platform to override selectively
#[uniffi::export]
pub fn default_briefing_config() -> FfiBriefingConfig {
    BriefingConfig::default().into()
}
