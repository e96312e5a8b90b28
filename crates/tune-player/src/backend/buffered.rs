use super::StreamFormat;

/// Uncompressed audio held entirely in memory, played from a byte cursor.
pub struct BufferedPcm {
    format: StreamFormat,
    data: Vec<u8>,
    cursor: usize,
}

impl BufferedPcm {
    pub fn new(format: StreamFormat, data: Vec<u8>) -> Self {
        Self {
            format,
            data,
            cursor: 0,
        }
    }

    pub fn format(&self) -> StreamFormat {
        self.format
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.data.len()
    }

    #[cfg(test)]
    fn is_at_end(&self) -> bool {
        self.cursor >= self.data.len()
    }

    /// Copy `min(buf.len(), remaining)` bytes from the cursor and advance it.
    ///
    /// Bytes of `buf` beyond the copied range are not touched.
    pub fn fill(&mut self, buf: &mut [u8]) -> usize {
        let remaining = self.data.len() - self.cursor;
        let n = buf.len().min(remaining);
        buf[..n].copy_from_slice(&self.data[self.cursor..self.cursor + n]);
        self.cursor += n;
        n
    }

    /// Move the cursor by `delta_secs`, saturating at both ends of the buffer.
    ///
    /// The delta is rounded to whole frames so the cursor stays frame aligned.
    pub fn seek(&mut self, delta_secs: f64) {
        let frames = (delta_secs * f64::from(self.format.sample_rate)).round();
        let delta_bytes = frames * self.format.bytes_per_frame() as f64;
        let target = (self.cursor as f64 + delta_bytes).clamp(0.0, self.data.len() as f64);
        self.cursor = target as usize;
    }

    pub fn tell(&self) -> f64 {
        self.cursor as f64 / self.bytes_per_second()
    }

    pub fn total_duration(&self) -> f64 {
        self.data.len() as f64 / self.bytes_per_second()
    }

    fn bytes_per_second(&self) -> f64 {
        self.format.bytes_per_second().max(1) as f64
    }
}
