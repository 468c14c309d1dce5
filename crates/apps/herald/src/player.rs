//! Audio backend that hands the summary to the system's default player

use briefing::{AudioBackend, AudioHandle, PlaybackError, PlaybackListener};
use log::{info, warn};

/// Opens the audio URL with whatever the desktop associates with it
///
/// Herald can't observe an external player, so playback counts as complete
/// once the player has been launched.
pub struct SystemPlayer;

impl AudioBackend for SystemPlayer {
    fn load(
        &self,
        url: &str,
        listener: PlaybackListener,
    ) -> Result<Box<dyn AudioHandle>, PlaybackError> {
        if url.trim().is_empty() {
            return Err(PlaybackError("empty audio URL".to_string()));
        }

        // Nothing to buffer locally
        listener.prepared();

        Ok(Box::new(SystemPlayback {
            url: url.to_string(),
            listener,
        }))
    }
}

struct SystemPlayback {
    url: String,
    listener: PlaybackListener,
}

impl AudioHandle for SystemPlayback {
    fn start(&mut self) {
        match open::that(&self.url) {
            Ok(()) => {
                info!("Opened summary audio in the system player");
                self.listener.completed();
            }
            Err(e) => {
                warn!("Failed to launch the system player: {}", e);
                self.listener.failed(&e.to_string());
            }
        }
    }

    fn release(&mut self) {}
}
