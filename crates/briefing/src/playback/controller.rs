//! Single-resource playback controller

use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::{AudioBackend, AudioHandle};

type Completion = Box<dyn FnOnce() + Send>;

/// The resource currently owned by the controller
struct Playback {
    /// `None` until the backend's `load` returns, and while `start` runs
    handle: Option<Box<dyn AudioHandle>>,
    prepared: bool,
    on_complete: Option<Completion>,
}

/// Shared between the controller and the listeners it hands out
#[derive(Default)]
struct Slot {
    /// Bumped on every play/stop so events from older resources are ignored
    generation: u64,
    current: Option<Playback>,
}

#[derive(Default)]
struct Shared {
    slot: Mutex<Slot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand the freshly loaded handle to its playback, or release it if that playback has ended
    fn attach(&self, generation: u64, mut handle: Box<dyn AudioHandle>) {
        let start_now = {
            let mut slot = self.lock();
            let current = slot.generation == generation;
            match slot.current.as_mut() {
                Some(playback) if current && !playback.prepared => {
                    playback.handle = Some(handle);
                    return;
                }
                Some(_) if current => true,
                _ => false,
            }
        };

        if start_now {
            // Prepared before `load` returned
            handle.start();
            self.restore(generation, handle);
        } else {
            handle.release();
        }
    }

    /// Return a handle after `start`; releases it if playback ended meanwhile
    fn restore(&self, generation: u64, mut handle: Box<dyn AudioHandle>) {
        {
            let mut slot = self.lock();
            if slot.generation == generation
                && let Some(playback) = slot.current.as_mut()
            {
                playback.handle = Some(handle);
                return;
            }
        }
        handle.release();
    }

    fn prepared(&self, generation: u64) {
        let handle = {
            let mut slot = self.lock();
            if slot.generation != generation {
                return;
            }
            let Some(playback) = slot.current.as_mut() else {
                return;
            };
            if playback.prepared {
                return;
            }
            playback.prepared = true;
            playback.handle.take()
        };

        // No handle yet means `load` hasn't returned; `attach` will start it
        if let Some(mut handle) = handle {
            debug!("Audio prepared, starting playback");
            handle.start();
            self.restore(generation, handle);
        }
    }

    /// End the playback of `generation`: notify once, then release
    fn finish(&self, generation: u64) {
        let playback = {
            let mut slot = self.lock();
            if slot.generation != generation {
                return;
            }
            slot.current.take()
        };

        let Some(playback) = playback else {
            return;
        };
        if let Some(on_complete) = playback.on_complete {
            on_complete();
        }
        if let Some(mut handle) = playback.handle {
            handle.release();
        }
    }
}

/// Event sink handed to an [`AudioBackend`] for one resource
///
/// Cloneable and callable from any thread. Events for a resource that has
/// since been stopped or replaced are ignored.
#[derive(Clone)]
pub struct PlaybackListener {
    shared: Weak<Shared>,
    generation: u64,
}

impl PlaybackListener {
    /// The resource is ready; playback starts
    pub fn prepared(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.prepared(self.generation);
        }
    }

    /// Playback reached the end
    pub fn completed(&self) {
        if let Some(shared) = self.shared.upgrade() {
            info!("Playback completed");
            shared.finish(self.generation);
        }
    }

    /// Preparation or playback failed; reported to the caller as completion
    pub fn failed(&self, reason: &str) {
        if let Some(shared) = self.shared.upgrade() {
            warn!("Playback failed, treating as completed: {}", reason);
            shared.finish(self.generation);
        }
    }
}

/// Owns at most one playing audio resource
///
/// Starting a new playback always releases the previous one first.
/// Completion is signalled exactly once per `play`, whether the audio ended
/// naturally or failed; `stop` releases without signalling.
pub struct AudioPlaybackController {
    backend: Arc<dyn AudioBackend>,
    shared: Arc<Shared>,
}

impl AudioPlaybackController {
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self {
            backend,
            shared: Arc::new(Shared::default()),
        }
    }

    /// Play `url`, calling `on_complete` once when playback ends or fails
    pub fn play<F>(&self, url: &str, on_complete: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.stop();

        let generation = {
            let mut slot = self.shared.lock();
            slot.generation += 1;
            slot.current = Some(Playback {
                handle: None,
                prepared: false,
                on_complete: Some(Box::new(on_complete)),
            });
            slot.generation
        };

        let listener = PlaybackListener {
            shared: Arc::downgrade(&self.shared),
            generation,
        };

        debug!("Loading audio resource");
        match self.backend.load(url, listener) {
            Ok(handle) => self.shared.attach(generation, handle),
            Err(e) => {
                warn!("Audio could not be loaded, treating as completed: {}", e);
                self.shared.finish(generation);
            }
        }
    }

    /// Release the current resource, if any; safe to call repeatedly
    pub fn stop(&self) {
        let playback = {
            let mut slot = self.shared.lock();
            slot.generation += 1;
            slot.current.take()
        };

        if let Some(mut handle) = playback.and_then(|p| p.handle) {
            debug!("Releasing audio resource");
            handle.release();
        }
    }

    /// Whether a resource is currently held
    pub fn is_active(&self) -> bool {
        self.shared.lock().current.is_some()
    }
}

impl Drop for AudioPlaybackController {
    fn drop(&mut self) {
        self.stop();
    }
}
