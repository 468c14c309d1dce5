mod player;
mod render;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use briefing::{
    AudioPlaybackController, AuthGate, BriefingConfig, FlowObserver, FlowOrchestrator, FlowState,
    GmailAuth, GmailClient, GmailCredentials, SummaryApiClient,
};
use log::{error, info, warn};
use tokio::sync::mpsc;

use player::SystemPlayer;

/// Forwards flow states to the render loop
struct ChannelObserver(mpsc::UnboundedSender<FlowState>);

impl FlowObserver for ChannelObserver {
    fn on_state(&self, state: &FlowState) {
        let _ = self.0.send(state.clone());
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let settings = BriefingConfig::load().context("Failed to load settings")?;
    let credentials = match GmailCredentials::load() {
        Ok(creds) => creds,
        Err(e) => {
            if let Some(path) = GmailCredentials::default_credentials_path() {
                warn!(
                    "To configure Gmail access, either:\n\
                     1. Place your Google OAuth credentials at: {}\n\
                     2. Or set environment variables: GMAIL_CLIENT_ID and GMAIL_CLIENT_SECRET",
                    path.display()
                );
            }
            return Err(e.context("Gmail credentials not found"));
        }
    };

    let auth = AuthGate::new(Arc::new(GmailAuth::new(&credentials)?));
    let orchestrator = Arc::new(
        FlowOrchestrator::new(
            auth,
            Arc::new(GmailClient::new(settings.request_timeout())),
            Arc::new(SummaryApiClient::new(&settings)),
            Arc::new(AudioPlaybackController::new(Arc::new(SystemPlayer))),
        )
        .with_unread_limit(settings.unread_limit),
    );

    info!("Summary service at {}", settings.api_base_url);

    match std::env::args().nth(1).as_deref() {
        None | Some("play") => play(orchestrator).await,
        Some("sign-out") => {
            orchestrator.sign_out()?;
            render::render(&orchestrator.state());
            Ok(ExitCode::SUCCESS)
        }
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Usage: herald [play | sign-out]");
            Ok(ExitCode::from(2))
        }
    }
}

/// Run one briefing, printing each state until it ends
async fn play(orchestrator: Arc<FlowOrchestrator>) -> Result<ExitCode> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    orchestrator.subscribe(Arc::new(ChannelObserver(tx)));

    let flow = Arc::clone(&orchestrator);
    let mut run = tokio::task::spawn_blocking(move || flow.run_blocking());
    let mut run_done = false;

    let mut outcome = ExitCode::SUCCESS;
    loop {
        tokio::select! {
            Some(state) = rx.recv() => {
                render::render(&state);
                if matches!(state, FlowState::Error { .. }) {
                    outcome = ExitCode::FAILURE;
                }
                if render::is_final(&state) {
                    break;
                }
            }
            started = &mut run, if !run_done => {
                run_done = true;
                if !started.context("Briefing task panicked")? {
                    warn!("A briefing was already in progress");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    if !run_done {
        run.await.context("Briefing task panicked")?;
    }
    Ok(outcome)
}
