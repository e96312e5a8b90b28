//! Playback session: one active backend plus the transport state shared with the output callback.
//!
//! The device thread and the control loop both mutate a session, so it lives behind a
//! mutex ([`SharedSession`]). [`fill_callback`] is the only place the device side takes that
//! lock; everything under it is plain `&mut self` state transition.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use crate::backend::{BYTES_PER_SAMPLE, Backend, StreamFormat};
use crate::config::PlaybackConfig;
use crate::error::Result;
use crate::format::SourceKind;
use crate::progress::ProgressSnapshot;

/// Session handle shared between the output callback and the control loop.
pub type SharedSession = Arc<Mutex<PlaybackSession>>;

/// Result of one fill request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillOutcome {
    /// Bytes of decoded audio written; the rest of the buffer is silence.
    pub produced: usize,
    /// The stream has ended; the device should stop pulling.
    pub finished: bool,
}

pub struct PlaybackSession {
    backend: Backend,
    paused: bool,
    volume: f32,
    total_duration: f64,
    end_of_stream: bool,
}

impl PlaybackSession {
    /// Classify `path`, open its backend, and start a session at the configured volume.
    ///
    /// Unsupported extensions fail here, before any device is touched.
    pub fn open(path: &Path, config: &PlaybackConfig) -> Result<Self> {
        let kind = SourceKind::from_path(path)?;
        let backend = Backend::open(path, kind)?;
        let session = Self::new(backend, config.initial_volume);
        let format = session.format();
        tracing::info!(
            path = %path.display(),
            kind = kind.label(),
            sample_rate = format.sample_rate,
            channels = format.channels,
            duration_secs = session.total_duration,
            "source opened"
        );
        Ok(session)
    }

    /// Wrap an opened backend. Duration is taken from the backend's own stream format.
    pub fn new(backend: Backend, volume: f32) -> Self {
        let total_duration = backend.total_duration();
        Self {
            backend,
            paused: false,
            volume: clamp_volume(volume),
            total_duration,
            end_of_stream: false,
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn kind(&self) -> SourceKind {
        self.backend.kind()
    }

    pub fn format(&self) -> StreamFormat {
        self.backend.format()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn is_finished(&self) -> bool {
        self.end_of_stream
    }

    /// Elapsed play position in seconds.
    pub fn elapsed(&self) -> f64 {
        self.backend.tell()
    }

    /// Produce exactly `out.len()` bytes: decoded audio scaled by the volume, then silence.
    ///
    /// While paused the buffer is silenced without touching the backend. Once the backend
    /// reports exhaustion the session stays finished.
    pub fn fill(&mut self, out: &mut [u8]) -> FillOutcome {
        if self.paused {
            out.fill(0);
            return FillOutcome {
                produced: 0,
                finished: false,
            };
        }
        if self.end_of_stream {
            out.fill(0);
            return FillOutcome {
                produced: 0,
                finished: true,
            };
        }

        let produced = self.backend.fill(out);
        out[produced..].fill(0);
        if produced == 0 {
            self.end_of_stream = true;
            tracing::debug!(elapsed_secs = self.elapsed(), "end of stream");
            return FillOutcome {
                produced,
                finished: true,
            };
        }

        apply_gain(&mut out[..produced], self.volume);
        FillOutcome {
            produced,
            finished: false,
        }
    }

    /// Flip the paused flag; returns the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Seek by `delta_secs`. Ignored once the stream has ended; returns whether it applied.
    pub fn seek(&mut self, delta_secs: f64) -> bool {
        if self.end_of_stream {
            return false;
        }
        self.backend.seek(delta_secs);
        true
    }

    /// Add `delta` to the volume, clamped to `[0.0, 1.0]`; returns the new volume.
    pub fn adjust_volume(&mut self, delta: f32) -> f32 {
        self.volume = clamp_volume(self.volume + delta);
        self.volume
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            elapsed_secs: self.elapsed(),
            total_secs: self.total_duration,
            paused: self.paused,
            volume: self.volume,
            finished: self.end_of_stream,
        }
    }
}

/// Device-side entry point: lock the session and fill `out`.
pub fn fill_callback(session: &SharedSession, out: &mut [u8]) -> FillOutcome {
    let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
    session.fill(out)
}

pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0)
}

/// Scale each native-endian 16-bit sample by `gain`, truncating toward zero.
fn apply_gain(bytes: &mut [u8], gain: f32) {
    for chunk in bytes.chunks_exact_mut(BYTES_PER_SAMPLE) {
        let sample = i16::from_ne_bytes([chunk[0], chunk[1]]);
        let scaled = (f32::from(sample) * gain) as i16;
        chunk.copy_from_slice(&scaled.to_ne_bytes());
    }
}
