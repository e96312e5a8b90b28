//! Error types for opening a playback session.
//!
//! Only start-up can fail. Once a session exists, decode faults degrade to end-of-stream
//! and out-of-range seeks are clamped, so nothing past `open` returns an error.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised while opening a source or the output device.
#[derive(Error, Debug)]
pub enum OpenError {
    /// The file extension does not map to a known backend.
    #[error("Unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The file could not be opened or read.
    #[error("Could not open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The container or codec header could not be parsed.
    #[error("Could not decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: symphonia::core::errors::Error,
    },

    /// The container holds no playable audio track.
    #[error("No default audio track in {}", .0.display())]
    NoTrack(PathBuf),

    /// A stream parameter needed to configure the output was not reported.
    #[error("Unknown {0}")]
    MissingFormat(&'static str),

    /// The output device could not be opened or configured.
    #[error("Audio output error: {0}")]
    Device(String),
}

impl OpenError {
    pub(crate) fn device(err: impl std::fmt::Display) -> Self {
        Self::Device(err.to_string())
    }
}

/// Convenience alias for start-up results.
pub type Result<T> = std::result::Result<T, OpenError>;
