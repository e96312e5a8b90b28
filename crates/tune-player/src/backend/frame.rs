use super::StreamFormat;
use super::codec::{CodecStream, fill_by_reads};
use crate::decode::PacketSource;

/// MPEG audio layer handled by a [`FrameCodec`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MpegLayer {
    Layer2,
    Layer3,
}

/// Frame-based lossy decoder (MP2/MP3).
///
/// One `fill` decodes as many frames as it takes to satisfy the request, carrying any
/// partially consumed frame over to the next call.
pub struct FrameCodec {
    stream: CodecStream,
    layer: MpegLayer,
}

impl FrameCodec {
    pub fn new(source: Box<dyn PacketSource>, layer: MpegLayer) -> Self {
        Self {
            stream: CodecStream::new(source),
            layer,
        }
    }

    pub fn layer(&self) -> MpegLayer {
        self.layer
    }

    pub fn format(&self) -> StreamFormat {
        self.stream.format()
    }

    /// Decode up to `buf.len()` bytes. Returns `0` once the stream is exhausted or a frame
    /// fails to decode; further calls keep returning `0` until [`FrameCodec::seek`].
    pub fn fill(&mut self, buf: &mut [u8]) -> usize {
        let stream = &mut self.stream;
        fill_by_reads(buf, |dst| stream.read_segment(dst))
    }

    pub fn seek(&mut self, delta_secs: f64) {
        self.stream.seek(delta_secs);
    }

    pub fn tell(&self) -> f64 {
        self.stream.tell()
    }

    pub fn total_duration(&self) -> f64 {
        self.stream.total_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::ScriptedSource;

    fn codec(frames: usize) -> FrameCodec {
        // 1152-sample MPEG frames, stereo.
        let source = ScriptedSource::ramp(StreamFormat::new(44_100, 2), frames, vec![2304]);
        FrameCodec::new(Box::new(source), MpegLayer::Layer3)
    }

    #[test]
    fn fill_spans_frame_boundaries() {
        let mut c = codec(44_100);
        let mut buf = vec![0u8; 4096 * 4];
        assert_eq!(c.fill(&mut buf), buf.len());
        assert!((c.tell() - 4096.0 / 44_100.0).abs() < 1e-9);

        // Samples continue where the previous call stopped.
        assert_eq!(c.fill(&mut buf), buf.len());
        let first = i16::from_ne_bytes([buf[0], buf[1]]);
        assert_eq!(first, 4096 * 2 + 1);
    }

    #[test]
    fn fill_returns_partial_then_zero_at_end() {
        let mut c = codec(1_000);
        let mut buf = vec![0xFFu8; 8_000];
        assert_eq!(c.fill(&mut buf), 4_000);
        assert!(buf[4_000..].iter().all(|b| *b == 0xFF));
        assert_eq!(c.fill(&mut buf), 0);
        assert_eq!(c.fill(&mut buf), 0);
    }

    #[test]
    fn decode_failure_reads_as_exhaustion() {
        let source =
            ScriptedSource::ramp(StreamFormat::new(44_100, 2), 44_100, vec![2304]).failing_at(1);
        let mut c = FrameCodec::new(Box::new(source), MpegLayer::Layer2);
        let mut buf = vec![0u8; 16_384];
        assert_eq!(c.fill(&mut buf), 2304 * 2);
        assert_eq!(c.fill(&mut buf), 0);
    }

    #[test]
    fn seek_forward_and_back_returns_to_origin() {
        let mut c = codec(44_100 * 20);
        let mut buf = vec![0u8; 44_100 * 4 * 3];
        c.fill(&mut buf);
        let origin = c.tell();

        c.seek(5.0);
        assert!((c.tell() - (origin + 5.0)).abs() < 1.0 / 44_100.0);
        c.seek(-5.0);
        assert!((c.tell() - origin).abs() <= 1.0 / 44_100.0);
    }

    #[test]
    fn total_duration_from_frame_count() {
        let c = codec(88_200);
        assert!((c.total_duration() - 2.0).abs() < 1e-9);
    }
}
