use std::path::Path;

use tune_player::{
    OpenError, PlaybackConfig, PlaybackSession, SourceKind, Transport, TransportCommand,
    fill_callback, render_progress,
};

const RATE: u32 = 8_000;
const CHANNELS: u16 = 2;
const CALLBACK_FRAMES: usize = 4096;

fn write_tone(path: &Path, secs: u32) {
    let spec = hound::WavSpec {
        channels: CHANNELS,
        sample_rate: RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..RATE * secs {
        let v = ((i % 200) as i16 - 100) * 100;
        for _ in 0..CHANNELS {
            writer.write_sample(v).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn callback_bytes() -> usize {
    CALLBACK_FRAMES * usize::from(CHANNELS) * 2
}

#[test]
fn buffered_wav_plays_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    write_tone(&path, 10);

    let session = PlaybackSession::open(&path, &PlaybackConfig::default()).unwrap();
    assert_eq!(session.kind(), SourceKind::Wav);
    assert_eq!(session.format().sample_rate, RATE);
    assert_eq!(session.format().channels, CHANNELS);
    assert!((session.total_duration() - 10.0).abs() < 1e-9);
    let shared = session.into_shared();

    // Drive the callback the way the device clock would.
    let mut buf = vec![0u8; callback_bytes()];
    let mut short_fill_at = None;
    let mut finished_at = None;
    for call in 0..1_000 {
        let outcome = fill_callback(&shared, &mut buf);
        if outcome.produced < buf.len() && short_fill_at.is_none() {
            short_fill_at = Some(call);
        }
        if outcome.finished {
            finished_at = Some(call);
            break;
        }
    }

    let short_fill_at = short_fill_at.expect("source never ran short");
    let finished_at = finished_at.expect("stream never finished");
    assert!(finished_at - short_fill_at <= 1);

    let snapshot = shared.lock().unwrap().snapshot();
    assert_eq!(render_progress(&snapshot), "\r0:10/0:10 (100%)");
}

#[test]
fn transport_controls_a_real_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    write_tone(&path, 12);

    let shared = PlaybackSession::open(&path, &PlaybackConfig::default())
        .unwrap()
        .into_shared();
    let mut transport = Transport::new(shared.clone());

    let mut buf = vec![0u8; usize::from(CHANNELS) * 2 * RATE as usize * 2];
    fill_callback(&shared, &mut buf);
    assert!((transport.snapshot().elapsed_secs - 2.0).abs() < 1e-9);

    transport.apply(TransportCommand::Seek(-5.0));
    assert_eq!(transport.snapshot().elapsed_secs, 0.0);

    transport.apply(TransportCommand::Seek(5.0));
    transport.apply(TransportCommand::TogglePause);
    let outcome = fill_callback(&shared, &mut buf);
    assert_eq!(outcome.produced, 0);
    assert!(buf.iter().all(|b| *b == 0));
    assert!((transport.snapshot().elapsed_secs - 5.0).abs() < 1e-9);
    assert_eq!(render_progress(&transport.snapshot()), "\r(Paused)");

    transport.apply(TransportCommand::TogglePause);
    assert_eq!(fill_callback(&shared, &mut buf).produced, buf.len());
    assert!((transport.snapshot().elapsed_secs - 7.0).abs() < 1e-9);
}

#[test]
fn unsupported_extension_fails_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.flac");
    let err = PlaybackSession::open(&path, &PlaybackConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, OpenError::UnsupportedFormat(_)));
}

#[test]
fn missing_file_is_an_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PlaybackSession::open(&dir.path().join("gone.wav"), &PlaybackConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, OpenError::Io { .. }));
}
