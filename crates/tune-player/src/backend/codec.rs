//! Decoder-driven stream state shared by the frame and segment backends.

use super::{BYTES_PER_SAMPLE, PendingSamples, StreamFormat};
use crate::decode::PacketSource;

/// A packet source plus the position bookkeeping both codec backends need.
///
/// Position is counted in samples handed to the caller, so it only moves on reads and seeks.
pub(crate) struct CodecStream {
    source: Box<dyn PacketSource>,
    format: StreamFormat,
    pending: PendingSamples,
    position_samples: u64,
    exhausted: bool,
}

impl CodecStream {
    pub(crate) fn new(source: Box<dyn PacketSource>) -> Self {
        let format = source.format();
        Self {
            source,
            format,
            pending: PendingSamples::default(),
            position_samples: 0,
            exhausted: false,
        }
    }

    pub(crate) fn format(&self) -> StreamFormat {
        self.format
    }

    /// Write bytes from at most one decoded packet into `buf`.
    ///
    /// May return fewer bytes than requested. `0` means the source is exhausted (or `buf`
    /// cannot hold a single sample); the stream then stays exhausted until the next seek.
    pub(crate) fn read_segment(&mut self, buf: &mut [u8]) -> usize {
        if self.exhausted || buf.len() < BYTES_PER_SAMPLE {
            return 0;
        }
        if self.pending.is_empty() && !self.pending.refill(self.source.as_mut()) {
            self.exhausted = true;
            return 0;
        }
        let written = self.pending.drain_into(buf);
        self.position_samples += (written / BYTES_PER_SAMPLE) as u64;
        written
    }

    /// Reposition to `tell() + delta_secs`, clamped at zero.
    ///
    /// There is no upper clamp: a target past the end surfaces as exhaustion on the next read.
    pub(crate) fn seek(&mut self, delta_secs: f64) {
        let target_secs = (self.tell() + delta_secs).max(0.0);
        let frame = (target_secs * f64::from(self.format.sample_rate)).round() as u64;
        let channels = u64::from(self.format.channels);
        self.pending.clear();
        match self.source.seek_to_frame(frame) {
            Ok(reached) => {
                self.position_samples = reached.saturating_mul(channels);
                self.exhausted = false;
            }
            Err(err) => {
                tracing::debug!(target_secs, "seek failed, ending stream: {err}");
                self.position_samples = frame.saturating_mul(channels);
                self.exhausted = true;
            }
        }
    }

    pub(crate) fn tell(&self) -> f64 {
        let channels = u64::from(self.format.channels.max(1));
        let frames = self.position_samples / channels;
        frames as f64 / f64::from(self.format.sample_rate.max(1))
    }

    pub(crate) fn total_duration(&self) -> f64 {
        match self.source.total_frames() {
            Some(frames) if self.format.sample_rate > 0 => {
                frames as f64 / f64::from(self.format.sample_rate)
            }
            _ => 0.0,
        }
    }
}

/// Fill `buf` by repeated bounded reads, stopping early when a read returns `0`.
///
/// Each read may come back short, so the destination offset advances by whatever was
/// produced. Bytes past the returned total are left untouched.
pub(crate) fn fill_by_reads(buf: &mut [u8], mut read: impl FnMut(&mut [u8]) -> usize) -> usize {
    let mut offset = 0;
    while offset < buf.len() {
        let n = read(&mut buf[offset..]);
        if n == 0 {
            break;
        }
        offset += n;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::ScriptedSource;

    fn stream(frames: usize, packet_sizes: Vec<usize>) -> CodecStream {
        let source = ScriptedSource::ramp(StreamFormat::new(1_000, 2), frames, packet_sizes);
        CodecStream::new(Box::new(source))
    }

    #[test]
    fn fill_by_reads_accumulates_short_reads() {
        let mut sizes = vec![3usize, 5, 8].into_iter();
        let mut buf = [0u8; 16];
        let written = fill_by_reads(&mut buf, |dst| {
            let n = sizes.next().unwrap_or(0).min(dst.len());
            dst[..n].fill(7);
            n
        });
        assert_eq!(written, 16);
        assert!(buf.iter().all(|b| *b == 7));
    }

    #[test]
    fn fill_by_reads_stops_on_zero_and_leaves_tail() {
        let mut sizes = vec![4usize, 0, 4].into_iter();
        let mut buf = [0xEEu8; 12];
        let written = fill_by_reads(&mut buf, |dst| {
            let n = sizes.next().unwrap_or(0).min(dst.len());
            dst[..n].fill(1);
            n
        });
        assert_eq!(written, 4);
        assert!(buf[4..].iter().all(|b| *b == 0xEE));
    }

    #[test]
    fn read_segment_returns_at_most_one_packet() {
        let mut s = stream(100, vec![6]);
        let mut buf = [0u8; 64];
        assert_eq!(s.read_segment(&mut buf), 12);
        assert_eq!(s.read_segment(&mut buf), 12);
        assert!((s.tell() - 0.006).abs() < 1e-9);
    }

    #[test]
    fn exhaustion_is_sticky_until_seek() {
        let mut s = stream(2, vec![4]);
        let mut buf = [0u8; 64];
        assert_eq!(s.read_segment(&mut buf), 8);
        assert_eq!(s.read_segment(&mut buf), 0);
        assert_eq!(s.read_segment(&mut buf), 0);

        s.seek(-1.0);
        assert_eq!(s.tell(), 0.0);
        assert_eq!(s.read_segment(&mut buf), 8);
    }

    #[test]
    fn seek_clamps_at_zero() {
        let mut s = stream(4_000, vec![200]);
        let mut buf = [0u8; 800];
        s.read_segment(&mut buf);
        assert!((s.tell() - 0.1).abs() < 1e-9);
        s.seek(-5.0);
        assert_eq!(s.tell(), 0.0);
    }

    #[test]
    fn seek_past_end_surfaces_as_exhaustion() {
        let mut s = stream(1_000, vec![200]);
        s.seek(30.0);
        let mut buf = [0u8; 64];
        assert_eq!(s.read_segment(&mut buf), 0);
    }

    #[test]
    fn huge_seek_step_saturates_instead_of_overflowing() {
        let mut s = stream(1_000, vec![200]);
        s.seek(1e300);
        let mut buf = [0u8; 64];
        assert_eq!(s.read_segment(&mut buf), 0);
        assert!(s.tell().is_finite());

        s.seek(-1e300);
        assert_eq!(s.tell(), 0.0);
        assert_eq!(s.read_segment(&mut buf), 64);
    }

    #[test]
    fn total_duration_is_zero_without_length() {
        let source = ScriptedSource::ramp(StreamFormat::new(1_000, 2), 1_000, vec![10]).without_length();
        let s = CodecStream::new(Box::new(source));
        assert_eq!(s.total_duration(), 0.0);
    }
}
