//! Transport controller: user commands applied to the shared session from the control loop.

use std::ops::ControlFlow;
use std::sync::{MutexGuard, PoisonError};

use crate::progress::ProgressSnapshot;
use crate::session::{PlaybackSession, SharedSession};

/// Commands accepted by the transport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransportCommand {
    TogglePause,
    /// Relative seek in seconds (negative rewinds).
    Seek(f64),
    /// Relative volume change.
    AdjustVolume(f32),
    Quit,
}

pub struct Transport {
    session: SharedSession,
    quit: bool,
}

impl Transport {
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            quit: false,
        }
    }

    /// Apply `cmd`; breaks once quit has been requested.
    pub fn apply(&mut self, cmd: TransportCommand) -> ControlFlow<()> {
        match cmd {
            TransportCommand::TogglePause => {
                self.toggle_pause();
            }
            TransportCommand::Seek(delta) => {
                self.seek(delta);
            }
            TransportCommand::AdjustVolume(delta) => {
                self.set_volume(delta);
            }
            TransportCommand::Quit => self.quit(),
        }
        if self.quit {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Returns the new paused state. Takes effect on the next fill.
    pub fn toggle_pause(&self) -> bool {
        let paused = self.lock().toggle_pause();
        tracing::debug!(paused, "pause toggled");
        paused
    }

    /// Returns whether the seek was applied (it is not once the stream has ended).
    pub fn seek(&self, delta_secs: f64) -> bool {
        let mut session = self.lock();
        let applied = session.seek(delta_secs);
        tracing::debug!(delta_secs, applied, position_secs = session.elapsed(), "seek");
        applied
    }

    /// Add `delta` to the volume; returns the clamped result.
    pub fn set_volume(&self, delta: f32) -> f32 {
        let volume = self.lock().adjust_volume(delta);
        tracing::debug!(volume, "volume changed");
        volume
    }

    pub fn quit(&mut self) {
        self.quit = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.lock().snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
