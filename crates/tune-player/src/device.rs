//! Output device discovery and configuration.
//!
//! Thin wrappers around CPAL for:
//! - listing available output devices
//! - selecting either the default device or a device by substring match
//! - finding a stream config that plays the source format without resampling

use cpal::traits::{DeviceTrait, HostTrait};

use crate::backend::StreamFormat;
use crate::error::{OpenError, Result};

/// Pick the first output device matching `needle` (case-insensitive), or the default device.
pub fn pick_device(host: &cpal::Host, needle: Option<&str>) -> Result<cpal::Device> {
    let mut devices: Vec<cpal::Device> = host
        .output_devices()
        .map_err(OpenError::device)?
        .collect();

    if let Some(needle) = needle {
        if let Some(d) = devices.drain(..).find(|d| {
            d.description()
                .ok()
                .map(|n| matches_device_name(&n.name(), needle))
                .unwrap_or(false)
        }) {
            return Ok(d);
        }
        return Err(OpenError::Device(format!("No output device matched: {needle}")));
    }

    host.default_output_device()
        .ok_or_else(|| OpenError::Device("No default output device".to_string()))
}

/// Print available output devices to stdout.
pub fn list_devices(host: &cpal::Host) -> Result<()> {
    let devices = host.output_devices().map_err(OpenError::device)?;
    for (i, d) in devices.enumerate() {
        let description = d.description().map_err(OpenError::device)?;
        println!("#{i}: {description}");
    }
    Ok(())
}

/// Choose a stream config that carries `format` unchanged.
///
/// The channel count must match and the sample rate must fall inside the supported range.
/// Among matches, signed 16-bit output is preferred so samples pass through unconverted.
/// The callback size is `buffer_frames`, clamped to what the device allows.
pub fn output_config_for(
    device: &cpal::Device,
    format: StreamFormat,
    buffer_frames: u32,
) -> Result<(cpal::StreamConfig, cpal::SampleFormat)> {
    let ranges: Vec<cpal::SupportedStreamConfigRange> = device
        .supported_output_configs()
        .map_err(OpenError::device)?
        .collect();
    if ranges.is_empty() {
        return Err(OpenError::Device("No supported output configs".to_string()));
    }

    let best = ranges
        .into_iter()
        .filter(|r| {
            r.channels() == format.channels
                && rate_in_range(r.min_sample_rate(), r.max_sample_rate(), format.sample_rate)
        })
        .filter_map(|r| sample_format_rank(r.sample_format()).map(|rank| (rank, r)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, r)| r)
        .ok_or_else(|| {
            OpenError::Device(format!(
                "No output config for {} ch @ {} Hz",
                format.channels, format.sample_rate
            ))
        })?;

    let buffer_size = pick_buffer_size(best.buffer_size(), buffer_frames);
    let supported = best.with_sample_rate(format.sample_rate);
    let sample_format = supported.sample_format();
    let mut config = supported.config();
    config.buffer_size = buffer_size;
    Ok((config, sample_format))
}

/// Use the requested callback size when the device reports a range; otherwise the default.
fn pick_buffer_size(supported: &cpal::SupportedBufferSize, wanted: u32) -> cpal::BufferSize {
    match supported {
        cpal::SupportedBufferSize::Range { min, max } if min <= max => {
            cpal::BufferSize::Fixed(wanted.clamp(*min, *max))
        }
        _ => cpal::BufferSize::Default,
    }
}

fn rate_in_range(min: u32, max: u32, rate: u32) -> bool {
    rate >= min && rate <= max
}

/// Lower is better; `None` for formats the output stage cannot write.
fn sample_format_rank(format: cpal::SampleFormat) -> Option<u8> {
    match format {
        cpal::SampleFormat::I16 => Some(0),
        cpal::SampleFormat::F32 => Some(1),
        cpal::SampleFormat::I32 => Some(2),
        cpal::SampleFormat::U16 => Some(3),
        _ => None,
    }
}

fn matches_device_name(name: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return false;
    }
    name.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_device_name_is_case_insensitive() {
        assert!(matches_device_name("USB DAC", "dac"));
        assert!(matches_device_name("usb dac", "USB"));
        assert!(!matches_device_name("USB DAC", "speaker"));
        assert!(!matches_device_name("USB DAC", "  "));
    }

    #[test]
    fn rate_in_range_is_inclusive() {
        assert!(rate_in_range(44_100, 48_000, 44_100));
        assert!(rate_in_range(44_100, 48_000, 48_000));
        assert!(!rate_in_range(44_100, 48_000, 22_050));
        assert!(!rate_in_range(44_100, 48_000, 96_000));
    }

    #[test]
    fn sample_format_rank_prefers_i16() {
        let i16_rank = sample_format_rank(cpal::SampleFormat::I16).unwrap();
        let f32_rank = sample_format_rank(cpal::SampleFormat::F32).unwrap();
        assert!(i16_rank < f32_rank);
        assert!(sample_format_rank(cpal::SampleFormat::U8).is_none());
    }

    #[test]
    fn pick_buffer_size_clamps_to_range() {
        let range = cpal::SupportedBufferSize::Range { min: 64, max: 2048 };
        assert_eq!(pick_buffer_size(&range, 4096), cpal::BufferSize::Fixed(2048));
        assert_eq!(pick_buffer_size(&range, 16), cpal::BufferSize::Fixed(64));
        assert_eq!(pick_buffer_size(&range, 1024), cpal::BufferSize::Fixed(1024));
    }

    #[test]
    fn pick_buffer_size_defaults_when_unknown() {
        let size = pick_buffer_size(&cpal::SupportedBufferSize::Unknown, 4096);
        assert_eq!(size, cpal::BufferSize::Default);
    }
}
