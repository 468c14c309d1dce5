//! Briefing flow state machine
//!
//! Idle → Loading("Accessing mail") → Loading("Analyzing mail") →
//! Loading("Preparing audio") → Playing → Finished, with Error reachable
//! from every loading stage.

mod orchestrator;
mod state;

pub use orchestrator::FlowOrchestrator;
pub use state::{FlowObserver, FlowState, stages};
