//! Output stage (CPAL output stream).
//!
//! Builds the CPAL output stream whose real-time callback pulls from the session via
//! [`fill_callback`] and converts the signed 16-bit result to the device sample type.
//! When the session reports end of stream the callback raises a finished flag; the control
//! loop sees it through [`OutputHandle::is_playing`] and stops the stream.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::{DeviceTrait, StreamTrait};

use crate::backend::BYTES_PER_SAMPLE;
use crate::error::{OpenError, Result};
use crate::session::{SharedSession, fill_callback};

/// A running (or stopped) output stream.
pub struct OutputHandle {
    stream: cpal::Stream,
    finished: Arc<AtomicBool>,
    stopped: AtomicBool,
}

impl OutputHandle {
    pub fn start(&self) -> Result<()> {
        self.stream.play().map_err(OpenError::device)?;
        self.stopped.store(false, Ordering::Relaxed);
        Ok(())
    }

    pub fn stop(&self) -> Result<()> {
        self.stopped.store(true, Ordering::Relaxed);
        self.stream.pause().map_err(OpenError::device)
    }

    /// False once the stream was stopped or the source ran out.
    pub fn is_playing(&self) -> bool {
        !self.stopped.load(Ordering::Relaxed) && !self.finished.load(Ordering::Relaxed)
    }
}

/// Build a CPAL output stream that plays `session`.
///
/// `config` must carry the session's sample rate and channel count.
pub fn build_output_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
    session: &SharedSession,
) -> Result<OutputHandle> {
    let finished = Arc::new(AtomicBool::new(false));
    let stream = match sample_format {
        cpal::SampleFormat::I16 => build_stream::<i16>(device, config, session, &finished),
        cpal::SampleFormat::F32 => build_stream::<f32>(device, config, session, &finished),
        cpal::SampleFormat::I32 => build_stream::<i32>(device, config, session, &finished),
        cpal::SampleFormat::U16 => build_stream::<u16>(device, config, session, &finished),
        other => Err(OpenError::Device(format!(
            "Unsupported sample format: {other:?}"
        ))),
    }?;
    Ok(OutputHandle {
        stream,
        finished,
        stopped: AtomicBool::new(true),
    })
}

/// Type-specialized stream builder for CPAL sample formats.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    session: &SharedSession,
    finished: &Arc<AtomicBool>,
) -> Result<cpal::Stream>
where
    T: cpal::Sample + cpal::SizedSample + cpal::FromSample<i16>,
{
    let session_cb = session.clone();
    let finished_cb = finished.clone();
    let mut scratch: Vec<u8> = Vec::new();

    let err_fn = |err: cpal::StreamError| tracing::warn!("stream error: {err}");

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                scratch.resize(data.len() * BYTES_PER_SAMPLE, 0);
                let outcome = fill_callback(&session_cb, &mut scratch);
                write_samples(data, &scratch);
                if outcome.finished && !finished_cb.swap(true, Ordering::Relaxed) {
                    tracing::debug!("source exhausted; output finishing");
                }
            },
            err_fn,
            None,
        )
        .map_err(OpenError::device)?;

    Ok(stream)
}

/// Convert native-endian signed 16-bit bytes into device samples.
fn write_samples<T>(data: &mut [T], bytes: &[u8])
where
    T: cpal::Sample + cpal::FromSample<i16>,
{
    for (dst, src) in data.iter_mut().zip(bytes.chunks_exact(BYTES_PER_SAMPLE)) {
        let sample = i16::from_ne_bytes([src[0], src[1]]);
        *dst = <T as cpal::Sample>::from_sample::<i16>(sample);
    }
}
