//! Audio playback of the generated summary
//!
//! The platform media primitive sits behind [`AudioBackend`]; the
//! [`AudioPlaybackController`] enforces at-most-one active resource and the
//! "signal completion exactly once" contract on top of it.

mod controller;

pub use controller::{AudioPlaybackController, PlaybackListener};

/// A failure to load an audio resource
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct PlaybackError(pub String);

/// Platform media primitive (MediaPlayer, AVPlayer, a system player, ...)
///
/// `load` starts asynchronous preparation of `url` and returns a handle to
/// the resource. Progress is reported through `listener`, from any thread,
/// possibly before `load` has returned.
pub trait AudioBackend: Send + Sync {
    fn load(
        &self,
        url: &str,
        listener: PlaybackListener,
    ) -> Result<Box<dyn AudioHandle>, PlaybackError>;
}

/// One loaded audio resource
pub trait AudioHandle: Send {
    /// Begin playback; called once the resource reported itself prepared
    fn start(&mut self);

    /// Free the underlying platform resource; called exactly once
    fn release(&mut self);
}
