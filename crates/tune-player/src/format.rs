//! Source format dispatch by file extension.

use std::path::Path;

use crate::error::{OpenError, Result};

/// Audio container kinds this player knows how to open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Mp3,
    Mp2,
    OggVorbis,
    Wav,
}

impl SourceKind {
    /// Classify `path` by its extension.
    ///
    /// Matching is exact and case-sensitive (`track.MP3` is rejected).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str());
        match ext {
            Some("mp3") => Ok(Self::Mp3),
            Some("mp2") => Ok(Self::Mp2),
            Some("ogg") => Ok(Self::OggVorbis),
            Some("wav") => Ok(Self::Wav),
            _ => Err(OpenError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Extension passed to the probe as a hint.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Mp2 => "mp2",
            Self::OggVorbis => "ogg",
            Self::Wav => "wav",
        }
    }

    /// User-facing name for the start-up banner.
    pub fn label(self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::Mp2 => "MP2",
            Self::OggVorbis => "Ogg Vorbis",
            Self::Wav => "WAV",
        }
    }
}
