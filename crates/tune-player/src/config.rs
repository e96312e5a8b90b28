//! Playback tunables with the defaults the player starts from.

use std::time::Duration;

/// Playback tuning parameters shared by the session, transport, and output stages.
#[derive(Clone, Debug)]
pub struct PlaybackConfig {
    /// Output callback size in frames requested from the device.
    pub buffer_frames: u32,
    /// Gain applied at session start, in `[0.0, 1.0]`.
    pub initial_volume: f32,
    /// Seconds moved by one seek command.
    pub seek_step_secs: f64,
    /// Gain change for one volume command.
    pub volume_step: f32,
    /// Minimum time between progress redraws.
    pub progress_interval: Duration,
    /// Sleep between iterations of the control loop.
    pub poll_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            buffer_frames: 4096,
            initial_volume: 0.5,
            seek_step_secs: 5.0,
            volume_step: 0.1,
            progress_interval: Duration::from_millis(200),
            poll_interval: Duration::from_millis(25),
        }
    }
}
