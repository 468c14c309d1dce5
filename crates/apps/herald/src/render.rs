//! Terminal rendering of flow states

use briefing::FlowState;

/// Print one line for `state`
pub fn render(state: &FlowState) {
    match state {
        FlowState::SignedOut => println!("Not signed in. Run `herald` to sign in with Google."),
        FlowState::Idle => println!("Ready."),
        FlowState::Loading { message } => println!("{}...", message),
        FlowState::Playing { summary_text } => {
            println!("Playing your briefing.");
            if !summary_text.is_empty() {
                println!();
                println!("{}", summary_text);
                println!();
            }
        }
        FlowState::Finished => println!("Done."),
        FlowState::Error { message } => eprintln!("Error: {}", message),
    }
}

/// Whether the CLI has nothing more to wait for after `state`
pub fn is_final(state: &FlowState) -> bool {
    matches!(
        state,
        FlowState::Finished | FlowState::Error { .. } | FlowState::SignedOut
    )
}
