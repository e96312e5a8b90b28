//! Packet decoding.
//!
//! Uses Symphonia to:
//! - probe the input container using the extension as a hint
//! - decode one packet at a time into interleaved signed 16-bit samples
//! - seek accurately by timestamp, trimming the frames between the landing point and the target

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, Decoder, DecoderOptions};
use symphonia::core::errors::{Error as SymphoniaError, SeekErrorKind};
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::Time;

use crate::backend::{StreamFormat, samples_to_bytes};
use crate::error::{OpenError, Result};
use crate::format::SourceKind;

/// A pull-based source of decoded packets.
///
/// This is the seam between the codec backends and the decoding library.
pub trait PacketSource: Send {
    fn format(&self) -> StreamFormat;

    /// Total length in frames, when the container reports it.
    fn total_frames(&self) -> Option<u64>;

    /// Append the next packet's interleaved samples to `out`.
    ///
    /// Returns `false` at end of stream and on any decode failure; the two are not distinguished.
    fn next_packet(&mut self, out: &mut Vec<i16>) -> bool;

    /// Reposition so the next packet starts at `frame`. Returns the frame reached.
    fn seek_to_frame(&mut self, frame: u64) -> std::result::Result<u64, SymphoniaError>;
}

/// Symphonia format reader + decoder for the default track of a file.
pub struct SymphoniaSource {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    stream: StreamFormat,
    total_frames: Option<u64>,
    skip_frames: u64,
    ended: bool,
    length_estimated: bool,
    lookahead: Option<Packet>,
}

impl SymphoniaSource {
    /// Probe `path` and prepare a decoder for its default track.
    pub fn open(path: &Path, kind: SourceKind) -> Result<Self> {
        let file = File::open(path).map_err(|source| OpenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_len = file.metadata().map(|m| m.len()).ok();
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        hint.with_extension(kind.extension());

        let decode_err = |source: SymphoniaError| OpenError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(decode_err)?;

        let format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| OpenError::NoTrack(path.to_path_buf()))?;
        let track_id = track.id;
        let codec_params: CodecParameters = track.codec_params.clone();

        let stream = stream_format_from_params(&codec_params)?;
        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(decode_err)?;

        let mut source = Self {
            format,
            decoder,
            track_id,
            stream,
            total_frames: codec_params.n_frames,
            skip_frames: 0,
            ended: false,
            length_estimated: false,
            lookahead: None,
        };
        if source.total_frames.is_none() && matches!(kind, SourceKind::Mp3 | SourceKind::Mp2) {
            source.estimate_length(file_len);
        }
        Ok(source)
    }

    /// Estimate the frame count of a stream without a length header from its first packet.
    ///
    /// The packet is kept and decoded by the next call to `next_packet`.
    fn estimate_length(&mut self, file_len: Option<u64>) {
        let Some(packet) = self.read_track_packet() else {
            return;
        };
        self.total_frames =
            file_len.and_then(|len| estimate_total_frames(len, packet.buf().len(), packet.dur()));
        self.length_estimated = self.total_frames.is_some();
        tracing::debug!(estimated_frames = ?self.total_frames, "no length header, estimated");
        self.lookahead = Some(packet);
    }

    /// Next packet of the selected track, or `None` once the reader is done.
    fn read_track_packet(&mut self) -> Option<Packet> {
        loop {
            match self.format.next_packet() {
                Ok(p) if p.track_id() == self.track_id => return Some(p),
                Ok(_) => continue,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return None;
                }
                Err(e) => {
                    tracing::warn!("read error, ending stream: {e}");
                    return None;
                }
            }
        }
    }
}

/// Scale the file size by the frames-per-byte ratio of one packet.
///
/// Close for constant bitrate streams; variable bitrate ones are approximate.
fn estimate_total_frames(file_len: u64, packet_bytes: usize, packet_frames: u64) -> Option<u64> {
    let packet_bytes = u64::try_from(packet_bytes).ok().filter(|b| *b > 0)?;
    if packet_frames == 0 {
        return None;
    }
    let frames = u128::from(file_len) * u128::from(packet_frames) / u128::from(packet_bytes);
    u64::try_from(frames).ok()
}

impl PacketSource for SymphoniaSource {
    fn format(&self) -> StreamFormat {
        self.stream
    }

    fn total_frames(&self) -> Option<u64> {
        self.total_frames
    }

    fn next_packet(&mut self, out: &mut Vec<i16>) -> bool {
        if self.ended {
            return false;
        }
        loop {
            let Some(packet) = self.lookahead.take().or_else(|| self.read_track_packet()) else {
                self.ended = true;
                return false;
            };

            let decoded = match self.decoder.decode(&packet) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!("decode error, ending stream: {e}");
                    self.ended = true;
                    return false;
                }
            };
            if decoded.frames() == 0 {
                continue;
            }

            let mut sample_buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, *decoded.spec());
            sample_buf.copy_interleaved_ref(decoded);
            let samples = sample_buf.samples();

            let channels = usize::from(self.stream.channels);
            let skip = usize::try_from(self.skip_frames)
                .unwrap_or(usize::MAX)
                .saturating_mul(channels)
                .min(samples.len());
            self.skip_frames -= (skip / channels) as u64;
            if skip == samples.len() {
                continue;
            }

            out.extend_from_slice(&samples[skip..]);
            return true;
        }
    }

    fn seek_to_frame(&mut self, frame: u64) -> std::result::Result<u64, SymphoniaError> {
        let rate = u64::from(self.stream.sample_rate);
        let out_of_range = match self.total_frames {
            Some(total) if !self.length_estimated => frame > total,
            _ => frame / rate > u64::from(u32::MAX),
        };
        if out_of_range {
            return Err(SymphoniaError::SeekError(SeekErrorKind::OutOfRange));
        }
        let time = Time::new(frame / rate, (frame % rate) as f64 / rate as f64);
        let seeked = self.format.seek(
            SeekMode::Accurate,
            SeekTo::Time {
                time,
                track_id: Some(self.track_id),
            },
        )?;
        self.decoder.reset();
        self.lookahead = None;
        self.skip_frames = seeked.required_ts.saturating_sub(seeked.actual_ts);
        self.ended = false;
        Ok(seeked.required_ts)
    }
}

/// Decode all of `path` into one native-endian byte buffer.
///
/// A decode fault part way through keeps what was decoded before it.
pub fn decode_to_pcm(path: &Path, kind: SourceKind) -> Result<(StreamFormat, Vec<u8>)> {
    let mut source = SymphoniaSource::open(path, kind)?;
    let format = source.format();
    let capacity = source
        .total_frames()
        .and_then(|f| usize::try_from(f).ok())
        .unwrap_or(0)
        .saturating_mul(usize::from(format.channels));

    let mut samples = Vec::with_capacity(capacity);
    while source.next_packet(&mut samples) {}

    tracing::debug!(
        frames = samples.len() / usize::from(format.channels),
        "decoded source into memory"
    );
    Ok((format, samples_to_bytes(&samples)))
}

/// Sample rate and channel count from codec metadata.
fn stream_format_from_params(params: &CodecParameters) -> Result<StreamFormat> {
    let channels = params
        .channels
        .ok_or(OpenError::MissingFormat("channels"))?
        .count();
    let channels = u16::try_from(channels)
        .ok()
        .filter(|c| *c > 0)
        .ok_or(OpenError::MissingFormat("channels"))?;
    let rate = params
        .sample_rate
        .filter(|r| *r > 0)
        .ok_or(OpenError::MissingFormat("sample rate"))?;
    Ok(StreamFormat::new(rate, channels))
}
