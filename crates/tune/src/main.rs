//! `tune` terminal player.
//!
//! Opens one audio file, streams it to an output device, and reads single-key commands
//! from the terminal while a progress line is redrawn in place:
//!
//! ```text
//! file -> Backend (decode) -> PlaybackSession <- Transport <- keyboard
//!                                   |
//!                             fill_callback -> CPAL output stream
//! ```

mod cli;
mod keys;
mod terminal;

use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use cpal::traits::DeviceTrait;
use crossterm::event::{self, Event};
use tracing_subscriber::EnvFilter;
use tune_player::device::{list_devices, output_config_for, pick_device};
use tune_player::playback::{OutputHandle, build_output_stream};
use tune_player::{PlaybackConfig, PlaybackSession, ProgressReporter, Transport};

use crate::cli::Args;
use crate::keys::{KeyBindings, command_for_key};
use crate::terminal::{RawModeGuard, draw_line};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            err.print().ok();
            return ExitCode::from(code);
        }
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,tune=info,tune_player=info")),
        )
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let host = cpal::default_host();

    if args.list_devices {
        list_devices(&host)?;
        return Ok(());
    }

    let Some(path) = args.path.as_deref() else {
        anyhow::bail!("missing <audio_file>");
    };
    let config = args.playback_config();

    let session = PlaybackSession::open(path, &config)?;
    print_banner(&session, path);

    let device = pick_device(&host, args.device.as_deref())?;
    if let Ok(description) = device.description() {
        tracing::info!(device = %description.name(), "output device");
    }

    let (stream_config, sample_format) =
        output_config_for(&device, session.format(), config.buffer_frames)?;
    tracing::info!(
        sample_rate = stream_config.sample_rate,
        channels = stream_config.channels,
        ?sample_format,
        buffer = ?stream_config.buffer_size,
        "output config"
    );

    let shared = session.into_shared();
    let output = build_output_stream(&device, &stream_config, sample_format, &shared)?;
    output.start().context("start output stream")?;

    let result = run_loop(Transport::new(shared), &output, &config);
    output.stop().context("stop output stream")?;
    result
}

fn print_banner(session: &PlaybackSession, path: &Path) {
    let format = session.format();
    println!("Playing {} file: {}", session.kind().label(), path.display());
    println!("Sample rate: {} Hz", format.sample_rate);
    println!("Channels: {}", format.channels);
}

/// Poll keys, redraw progress, and wait for quit or the end of the stream.
fn run_loop(mut transport: Transport, output: &OutputHandle, config: &PlaybackConfig) -> Result<()> {
    let _raw = RawModeGuard::enter()?;
    let bindings = KeyBindings {
        seek_step: config.seek_step_secs,
        volume_step: config.volume_step,
    };
    let mut reporter = ProgressReporter::new(config.progress_interval);
    let mut stdout = io::stdout();

    loop {
        while event::poll(Duration::ZERO).context("poll terminal events")? {
            if let Event::Key(key) = event::read().context("read terminal event")? {
                if let Some(cmd) = command_for_key(&key, &bindings) {
                    if transport.apply(cmd).is_break() {
                        break;
                    }
                }
            }
        }
        if transport.quit_requested() {
            tracing::debug!("quit requested");
            return Ok(());
        }

        let snapshot = transport.snapshot();
        if !output.is_playing() {
            draw_line(&mut stdout, &reporter.finish(&snapshot))?;
            return Ok(());
        }
        if let Some(line) = reporter.tick(&snapshot, Instant::now()) {
            draw_line(&mut stdout, &line)?;
        }
        thread::sleep(config.poll_interval);
    }
}
