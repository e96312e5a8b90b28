//! Decoder backends behind one pull-based fill contract.
//!
//! Exactly one [`Backend`] variant drives a session:
//! - [`FrameCodec`] for MPEG audio (layer II / III), decoded frame by frame
//! - [`SegmentCodec`] for Ogg Vorbis, whose reads may come back short
//! - [`BufferedPcm`] for WAV, fully decoded up front and played from a byte cursor
//!
//! All variants write signed 16-bit native-endian samples into caller-provided byte buffers.

mod buffered;
mod codec;
mod frame;
mod segment;

use std::path::Path;

pub use buffered::BufferedPcm;
pub use frame::{FrameCodec, MpegLayer};
pub use segment::SegmentCodec;

use crate::decode::{self, SymphoniaSource};
use crate::error::Result;
use crate::format::SourceKind;

/// Size of one output sample (signed 16-bit).
pub const BYTES_PER_SAMPLE: usize = 2;

/// Sample rate and channel count of a decoded stream.
///
/// Fixed once a backend is opened; the output device is configured to match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl StreamFormat {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn bytes_per_frame(&self) -> usize {
        usize::from(self.channels) * BYTES_PER_SAMPLE
    }

    pub fn bytes_per_second(&self) -> usize {
        self.sample_rate as usize * self.bytes_per_frame()
    }
}

/// The active decoder for a session.
pub enum Backend {
    Frame(FrameCodec),
    Segment(SegmentCodec),
    Buffered(BufferedPcm),
}

impl Backend {
    /// Open `path` with the backend that handles `kind`.
    ///
    /// WAV sources are decoded completely before this returns.
    pub fn open(path: &Path, kind: SourceKind) -> Result<Self> {
        match kind {
            SourceKind::Mp3 | SourceKind::Mp2 => {
                let layer = if kind == SourceKind::Mp3 {
                    MpegLayer::Layer3
                } else {
                    MpegLayer::Layer2
                };
                let source = SymphoniaSource::open(path, kind)?;
                Ok(Self::Frame(FrameCodec::new(Box::new(source), layer)))
            }
            SourceKind::OggVorbis => {
                let source = SymphoniaSource::open(path, kind)?;
                Ok(Self::Segment(SegmentCodec::new(Box::new(source))))
            }
            SourceKind::Wav => {
                let (format, data) = decode::decode_to_pcm(path, kind)?;
                Ok(Self::Buffered(BufferedPcm::new(format, data)))
            }
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Frame(codec) => match codec.layer() {
                MpegLayer::Layer3 => SourceKind::Mp3,
                MpegLayer::Layer2 => SourceKind::Mp2,
            },
            Self::Segment(_) => SourceKind::OggVorbis,
            Self::Buffered(_) => SourceKind::Wav,
        }
    }

    pub fn format(&self) -> StreamFormat {
        match self {
            Self::Frame(codec) => codec.format(),
            Self::Segment(codec) => codec.format(),
            Self::Buffered(pcm) => pcm.format(),
        }
    }

    /// Write up to `buf.len()` bytes of audio; `0` means the stream is exhausted.
    ///
    /// Bytes past the returned count are left untouched.
    pub fn fill(&mut self, buf: &mut [u8]) -> usize {
        match self {
            Self::Frame(codec) => codec.fill(buf),
            Self::Segment(codec) => codec.fill(buf),
            Self::Buffered(pcm) => pcm.fill(buf),
        }
    }

    /// Move the play position by `delta_secs` (negative rewinds).
    pub fn seek(&mut self, delta_secs: f64) {
        match self {
            Self::Frame(codec) => codec.seek(delta_secs),
            Self::Segment(codec) => codec.seek(delta_secs),
            Self::Buffered(pcm) => pcm.seek(delta_secs),
        }
    }

    /// Current play position in seconds.
    pub fn tell(&self) -> f64 {
        match self {
            Self::Frame(codec) => codec.tell(),
            Self::Segment(codec) => codec.tell(),
            Self::Buffered(pcm) => pcm.tell(),
        }
    }

    /// Total length in seconds, or `0.0` when the container does not report it.
    pub fn total_duration(&self) -> f64 {
        match self {
            Self::Frame(codec) => codec.total_duration(),
            Self::Segment(codec) => codec.total_duration(),
            Self::Buffered(pcm) => pcm.total_duration(),
        }
    }
}

/// Decoded samples not yet handed to the caller.
#[derive(Debug, Default)]
pub(crate) struct PendingSamples {
    samples: Vec<i16>,
    pos: usize,
}

impl PendingSamples {
    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.samples.len()
    }

    pub(crate) fn clear(&mut self) {
        self.samples.clear();
        self.pos = 0;
    }

    /// Replace the contents with the next decoded packet. Returns `false` at end of stream.
    pub(crate) fn refill(&mut self, source: &mut dyn decode::PacketSource) -> bool {
        self.clear();
        source.next_packet(&mut self.samples) && !self.samples.is_empty()
    }

    /// Copy as many whole samples as fit into `buf`; returns bytes written.
    pub(crate) fn drain_into(&mut self, buf: &mut [u8]) -> usize {
        let available = self.samples.len() - self.pos;
        let count = (buf.len() / BYTES_PER_SAMPLE).min(available);
        let src = &self.samples[self.pos..self.pos + count];
        for (dst, sample) in buf.chunks_exact_mut(BYTES_PER_SAMPLE).zip(src) {
            dst.copy_from_slice(&sample.to_ne_bytes());
        }
        self.pos += count;
        count * BYTES_PER_SAMPLE
    }
}

/// Encode interleaved samples as native-endian bytes.
pub(crate) fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * BYTES_PER_SAMPLE);
    for sample in samples {
        out.extend_from_slice(&sample.to_ne_bytes());
    }
    out
}
