//! End-to-end briefing flow
//!
//! Drives authenticate → fetch → summarize → play and owns the single
//! [`FlowState`]. At most one flow runs at a time: a trigger while loading or
//! playing is ignored. Every stage failure becomes `Error(message)`; nothing
//! is retried automatically.

use log::{debug, error, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::state::{FlowObserver, FlowState, StateCell, stages};
use crate::auth::AuthGate;
use crate::config::DEFAULT_UNREAD_LIMIT;
use crate::error::{FlowError, FlowResult};
use crate::fetch::MailFetcher;
use crate::models::Identity;
use crate::playback::AudioPlaybackController;
use crate::summary::Summarizer;

/// State machine coordinating the briefing stages
pub struct FlowOrchestrator {
    auth: AuthGate,
    mail: Arc<dyn MailFetcher>,
    summarizer: Arc<dyn Summarizer>,
    player: Arc<AudioPlaybackController>,
    state: Arc<StateCell>,
    unread_limit: usize,
}

impl FlowOrchestrator {
    /// Create an orchestrator; starts `Idle` if a sign-in is stored, else `SignedOut`
    pub fn new(
        auth: AuthGate,
        mail: Arc<dyn MailFetcher>,
        summarizer: Arc<dyn Summarizer>,
        player: Arc<AudioPlaybackController>,
    ) -> Self {
        let initial = if auth.is_signed_in() {
            FlowState::Idle
        } else {
            FlowState::SignedOut
        };

        Self {
            auth,
            mail,
            summarizer,
            player,
            state: Arc::new(StateCell::new(initial)),
            unread_limit: DEFAULT_UNREAD_LIMIT,
        }
    }

    /// Set the maximum number of unread messages per flow (at least 1)
    pub fn with_unread_limit(mut self, limit: usize) -> Self {
        self.unread_limit = limit.max(1);
        self
    }

    /// Current state
    pub fn state(&self) -> FlowState {
        self.state.get()
    }

    /// Register an observer for every subsequent state
    pub fn subscribe(&self, observer: Arc<dyn FlowObserver>) {
        self.state.subscribe(observer);
    }

    /// Start a flow on a background thread
    ///
    /// Returns `false` (and changes nothing) if a flow is already loading or
    /// playing.
    pub fn trigger(self: &Arc<Self>) -> bool {
        if !self.begin() {
            return false;
        }

        let this = Arc::clone(self);
        let spawned = std::thread::Builder::new()
            .name("briefing-flow".to_string())
            .spawn(move || this.execute());

        if let Err(e) = spawned {
            error!("Failed to spawn flow thread: {}", e);
            self.state.set(FlowState::Error {
                message: format!("Could not start briefing: {}", e),
            });
        }
        true
    }

    /// Run a flow on the calling thread, returning once playback has started
    /// or the flow failed
    ///
    /// Returns `false` (and changes nothing) if a flow is already loading or
    /// playing.
    pub fn run_blocking(&self) -> bool {
        if !self.begin() {
            return false;
        }
        self.execute();
        true
    }

    /// Stop the summary audio; moves `Playing` to `Finished`, otherwise a no-op
    pub fn stop_playback(&self) -> bool {
        let stopped = self
            .state
            .transition_if(|s| matches!(s, FlowState::Playing { .. }), FlowState::Finished);
        if stopped {
            info!("Playback stopped by user");
            self.player.stop();
        }
        stopped
    }

    /// Forget the stored identity and return to `SignedOut`
    ///
    /// Rejected while a stage is loading. If the provider cannot forget the
    /// identity the state is left as it was.
    pub fn sign_out(&self) -> FlowResult<()> {
        if matches!(self.state.get(), FlowState::Loading { .. }) {
            return Err(Self::busy_error());
        }

        self.auth.sign_out()?;

        let signed_out = self.state.transition_if(
            |s| !matches!(s, FlowState::Loading { .. }),
            FlowState::SignedOut,
        );
        if !signed_out {
            // A trigger won the race; that flow will have to sign in again
            return Err(Self::busy_error());
        }

        self.player.stop();
        info!("Signed out");
        Ok(())
    }

    fn busy_error() -> FlowError {
        FlowError::Other("Cannot sign out while a briefing is in progress".to_string())
    }

    /// Atomically enter the first loading stage if no flow is in progress
    fn begin(&self) -> bool {
        let started = self.state.transition_if(
            FlowState::accepts_trigger,
            FlowState::loading(stages::ACCESSING_MAIL),
        );
        if !started {
            debug!("Flow already in progress, ignoring trigger");
        }
        started
    }

    fn execute(&self) {
        let message = match panic::catch_unwind(AssertUnwindSafe(|| self.run_stages())) {
            Ok(Ok(())) => return,
            Ok(Err(e)) => {
                error!("Briefing flow failed: {}", e);
                e.to_string()
            }
            Err(payload) => {
                let reason = panic_reason(payload.as_ref());
                error!("Briefing flow panicked: {}", reason);
                self.player.stop();
                format!("Briefing stopped unexpectedly: {}", reason)
            }
        };
        self.state.set(FlowState::Error { message });
    }

    fn run_stages(&self) -> FlowResult<()> {
        let identity = self.resolve_identity()?;

        let records = match self.mail.fetch_unread(&identity, self.unread_limit) {
            Ok(records) => records,
            Err(e @ FlowError::Auth(_)) => {
                self.auth.invalidate();
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        info!("Summarizing {} unread messages", records.len());

        self.state.set(FlowState::loading(stages::ANALYZING_MAIL));
        let summary = self.summarizer.summarize(&records)?;

        self.state.set(FlowState::loading(stages::PREPARING_AUDIO));
        self.state.set(FlowState::Playing {
            summary_text: summary.summary_text,
        });

        // Playing is published first so a backend that completes synchronously
        // still ends in Finished
        let state = Arc::clone(&self.state);
        self.player.play(&summary.audio_url, move || {
            if state.transition_if(|s| matches!(s, FlowState::Playing { .. }), FlowState::Finished) {
                info!("Briefing finished");
            } else {
                warn!("Playback completed outside the Playing state");
            }
        });
        Ok(())
    }

    fn resolve_identity(&self) -> FlowResult<Identity> {
        if let Some(identity) = self.auth.cached_identity()? {
            return Ok(identity);
        }

        self.state.set(FlowState::loading(stages::WAITING_FOR_SIGN_IN));
        let identity = self.auth.sign_in()?;
        self.state.set(FlowState::loading(stages::ACCESSING_MAIL));
        Ok(identity)
    }
}

/// Best-effort text of a panic payload
fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(reason) = payload.downcast_ref::<&str>() {
        reason.to_string()
    } else if let Some(reason) = payload.downcast_ref::<String>() {
        reason.clone()
    } else {
        "unknown panic".to_string()
    }
}
