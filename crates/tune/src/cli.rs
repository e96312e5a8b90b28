//! Command-line interface definitions.
//!
//! Only the `clap` surface lives here; playback logic stays in `tune-player`.

use std::path::PathBuf;

use clap::Parser;
use tune_player::PlaybackConfig;

#[derive(Parser, Debug)]
#[command(
    name = "tune",
    version,
    about = "Play an MP3, MP2, Ogg Vorbis or WAV file in the terminal"
)]
pub struct Args {
    /// Path to the audio file (.mp3, .mp2, .ogg or .wav)
    #[arg(value_name = "audio_file", required_unless_present = "list_devices")]
    pub path: Option<PathBuf>,

    /// List output devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Use a specific output device by substring match
    #[arg(long)]
    pub device: Option<String>,

    /// Initial volume in [0.0, 1.0]
    #[arg(long, default_value_t = 0.5)]
    pub volume: f32,

    /// Seconds moved by the Left/Right keys
    #[arg(long, default_value_t = 5.0)]
    pub seek_step: f64,

    /// Output callback size in frames
    #[arg(long, default_value_t = 4096)]
    pub buffer_frames: u32,
}

impl Args {
    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            buffer_frames: self.buffer_frames.max(1),
            initial_volume: self.volume,
            seek_step_secs: self.seek_step.abs(),
            ..PlaybackConfig::default()
        }
    }
}
