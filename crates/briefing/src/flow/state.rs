//! Flow state and its observable cell

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Progress messages shown while the flow is loading
pub mod stages {
    pub const ACCESSING_MAIL: &str = "Accessing mail";
    pub const WAITING_FOR_SIGN_IN: &str = "Waiting for sign-in";
    pub const ANALYZING_MAIL: &str = "Analyzing mail";
    pub const PREPARING_AUDIO: &str = "Preparing audio";
}

/// The single UI-observable state of the briefing flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// No identity stored yet
    SignedOut,
    /// Signed in, nothing running
    Idle,
    /// A stage is in progress
    Loading { message: String },
    /// The summary audio is playing
    Playing { summary_text: String },
    /// Playback ended
    Finished,
    /// A stage failed; the user may trigger again
    Error { message: String },
}

impl FlowState {
    pub fn loading(message: impl Into<String>) -> Self {
        FlowState::Loading {
            message: message.into(),
        }
    }

    /// Whether a flow is in progress (loading or playing)
    pub fn is_busy(&self) -> bool {
        matches!(self, FlowState::Loading { .. } | FlowState::Playing { .. })
    }

    /// Whether a user trigger may start a new flow from this state
    pub fn accepts_trigger(&self) -> bool {
        !self.is_busy()
    }
}

/// Receives every state the flow enters, in order
///
/// Called while the state lock is held: implementations must not call back
/// into the orchestrator and should hand the value off quickly (e.g. post it
/// to a UI thread or channel).
pub trait FlowObserver: Send + Sync {
    fn on_state(&self, state: &FlowState);
}

/// Mutex-guarded [`FlowState`] that notifies observers on every replacement
pub(crate) struct StateCell {
    state: Mutex<FlowState>,
    observers: RwLock<Vec<Arc<dyn FlowObserver>>>,
}

impl StateCell {
    pub fn new(initial: FlowState) -> Self {
        Self {
            state: Mutex::new(initial),
            observers: RwLock::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> FlowState {
        self.lock().clone()
    }

    pub fn subscribe(&self, observer: Arc<dyn FlowObserver>) {
        if let Ok(mut observers) = self.observers.write() {
            observers.push(observer);
        }
    }

    /// Replace the state unconditionally
    pub fn set(&self, next: FlowState) {
        let mut state = self.lock();
        *state = next;
        self.notify(&state);
    }

    /// Replace the state only if `allowed` holds for the current one
    ///
    /// The check and the replacement happen under one lock.
    pub fn transition_if(&self, allowed: impl FnOnce(&FlowState) -> bool, next: FlowState) -> bool {
        let mut state = self.lock();
        if !allowed(&state) {
            return false;
        }
        *state = next;
        self.notify(&state);
        true
    }

    fn notify(&self, state: &FlowState) {
        if let Ok(observers) = self.observers.read() {
            for observer in observers.iter() {
                observer.on_state(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Mutex<Vec<FlowState>>);

    impl FlowObserver for Recorder {
        fn on_state(&self, state: &FlowState) {
            self.0.lock().unwrap().push(state.clone());
        }
    }

    #[test]
    fn test_busy_states_reject_trigger() {
        assert!(!FlowState::loading(stages::ACCESSING_MAIL).accepts_trigger());
        assert!(!FlowState::Playing { summary_text: "x".into() }.accepts_trigger());
        assert!(FlowState::SignedOut.accepts_trigger());
        assert!(FlowState::Idle.accepts_trigger());
        assert!(FlowState::Finished.accepts_trigger());
        assert!(FlowState::Error { message: "boom".into() }.accepts_trigger());
    }

    #[test]
    fn test_transition_if_is_conditional() {
        let cell = StateCell::new(FlowState::Idle);
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        cell.subscribe(recorder.clone());

        assert!(cell.transition_if(FlowState::accepts_trigger, FlowState::loading("a")));
        assert!(!cell.transition_if(FlowState::accepts_trigger, FlowState::loading("b")));

        assert_eq!(cell.get(), FlowState::loading("a"));
        assert_eq!(*recorder.0.lock().unwrap(), vec![FlowState::loading("a")]);
    }
}
