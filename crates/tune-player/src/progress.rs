//! Progress line rendering for the terminal.
//!
//! Rendering is a pure function of a [`ProgressSnapshot`]; [`ProgressReporter`] only decides
//! when a new line is worth drawing.

use std::time::{Duration, Instant};

/// Read-only view of session state used for display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSnapshot {
    pub elapsed_secs: f64,
    pub total_secs: f64,
    pub paused: bool,
    /// Current gain in `[0.0, 1.0]`.
    pub volume: f32,
    /// The source has run out; no more audio will be produced.
    pub finished: bool,
}

/// Render `\rM:SS/M:SS (P%)`, or `\r(Paused)` while paused.
pub fn render_progress(snapshot: &ProgressSnapshot) -> String {
    if snapshot.paused {
        return "\r(Paused)".to_string();
    }
    format!(
        "\r{}/{} ({:.0}%)",
        format_clock(snapshot.elapsed_secs),
        format_clock(snapshot.total_secs),
        percentage(snapshot.elapsed_secs, snapshot.total_secs)
    )
}

/// `M:SS` with whole seconds truncated.
fn format_clock(secs: f64) -> String {
    let whole = if secs.is_finite() { secs.max(0.0) as u64 } else { 0 };
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Elapsed share of the total, `0` when the total is unknown.
fn percentage(elapsed: f64, total: f64) -> f64 {
    if !(total.is_finite() && total > 0.0) || !elapsed.is_finite() {
        return 0.0;
    }
    (elapsed / total * 100.0).clamp(0.0, 100.0)
}

/// Throttles progress redraws for the control loop.
#[derive(Debug)]
pub struct ProgressReporter {
    interval: Duration,
    last_draw: Option<Instant>,
    last_line: String,
}

impl ProgressReporter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_draw: None,
            last_line: String::new(),
        }
    }

    /// The line to draw now, if the interval has passed and the text changed.
    pub fn tick(&mut self, snapshot: &ProgressSnapshot, now: Instant) -> Option<String> {
        if let Some(last) = self.last_draw {
            if now.duration_since(last) < self.interval {
                return None;
            }
        }
        self.last_draw = Some(now);
        let line = render_progress(snapshot);
        if line == self.last_line {
            return None;
        }
        self.last_line.clone_from(&line);
        Some(line)
    }

    /// Render unconditionally; used for the final line when playback ends.
    pub fn finish(&mut self, snapshot: &ProgressSnapshot) -> String {
        let line = render_progress(snapshot);
        self.last_line.clone_from(&line);
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(elapsed_secs: f64, total_secs: f64) -> ProgressSnapshot {
        ProgressSnapshot {
            elapsed_secs,
            total_secs,
            paused: false,
            volume: 1.0,
            finished: false,
        }
    }

    #[test]
    fn renders_clock_and_percentage() {
        assert_eq!(render_progress(&snap(65.4, 130.0)), "\r1:05/2:10 (50%)");
        assert_eq!(render_progress(&snap(0.0, 9.0)), "\r0:00/0:09 (0%)");
        assert_eq!(render_progress(&snap(10.0, 10.0)), "\r0:10/0:10 (100%)");
    }

    #[test]
    fn renders_paused_indicator() {
        let mut s = snap(12.0, 60.0);
        s.paused = true;
        assert_eq!(render_progress(&s), "\r(Paused)");
    }

    #[test]
    fn zero_duration_shows_zero_percent() {
        assert_eq!(render_progress(&snap(3.0, 0.0)), "\r0:03/0:00 (0%)");
        assert_eq!(render_progress(&snap(3.0, f64::NAN)), "\r0:03/0:00 (0%)");
    }

    #[test]
    fn reporter_throttles_and_skips_unchanged_lines() {
        let mut reporter = ProgressReporter::new(Duration::from_millis(200));
        let t0 = Instant::now();
        assert!(reporter.tick(&snap(1.0, 10.0), t0).is_some());
        assert!(reporter.tick(&snap(2.0, 10.0), t0 + Duration::from_millis(50)).is_none());
        assert!(reporter.tick(&snap(1.04, 10.0), t0 + Duration::from_millis(250)).is_none());
        assert_eq!(
            reporter.tick(&snap(2.0, 10.0), t0 + Duration::from_millis(500)),
            Some("\r0:02/0:10 (20%)".to_string())
        );
    }

    #[test]
    fn finish_always_renders() {
        let mut reporter = ProgressReporter::new(Duration::from_secs(60));
        let t0 = Instant::now();
        reporter.tick(&snap(10.0, 10.0), t0);
        assert_eq!(reporter.finish(&snap(10.0, 10.0)), "\r0:10/0:10 (100%)");
    }
}
