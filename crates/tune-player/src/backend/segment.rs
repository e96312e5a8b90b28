use super::StreamFormat;
use super::codec::{CodecStream, fill_by_reads};
use crate::decode::PacketSource;

/// Bitstream-segmented lossy decoder (Ogg Vorbis).
///
/// [`SegmentCodec::read`] never returns more than the rest of the current segment, so a
/// single read routinely under-fills the request. [`SegmentCodec::fill`] loops reads until
/// the buffer is full or a read comes back empty.
pub struct SegmentCodec {
    stream: CodecStream,
}

impl SegmentCodec {
    pub fn new(source: Box<dyn PacketSource>) -> Self {
        Self {
            stream: CodecStream::new(source),
        }
    }

    pub fn format(&self) -> StreamFormat {
        self.stream.format()
    }

    /// One bounded read: at most the remainder of the current segment.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        self.stream.read_segment(buf)
    }

    /// Read segments until `buf` is full or the stream is exhausted.
    ///
    /// On early exhaustion the bytes after the returned count are not written; the caller
    /// silences them.
    pub fn fill(&mut self, buf: &mut [u8]) -> usize {
        fill_by_reads(buf, |dst| self.read(dst))
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
