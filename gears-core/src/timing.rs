/// Frame timing and frame-rate accounting
///
/// Both types take time as fractional seconds from a monotonic source
/// supplied by the host, so they can be driven deterministically.
use std::fmt;

/// Seconds between frame-rate reports.
pub const FPS_REPORT_INTERVAL: f64 = 5.0;

/// Measures the wall-clock delta between consecutive frames.
///
/// The first tick initializes the marker and reports a zero delta.
#[derive(Debug, Clone, Default)]
pub struct FrameTimer {
    last: Option<f64>,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds elapsed since the previous tick.
    pub fn tick(&mut self, now: f64) -> f32 {
        let previous = self.last.replace(now).unwrap_or(now);
        (now - previous) as f32
    }
}

/// Average frame rate over one reporting interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsReport {
    pub frames: u32,
    pub seconds: f32,
    pub fps: f32,
}

impl fmt::Display for FpsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames in {:3.1} seconds = {:6.3} FPS",
            self.frames, self.seconds, self.fps
        )
    }
}

/// Counts drawn frames and yields a report every `FPS_REPORT_INTERVAL` seconds.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frames: u32,
    since: Option<f64>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Record one drawn frame at time `now`.
    pub fn frame(&mut self, now: f64) -> Option<FpsReport> {
        self.frames += 1;
        let since = *self.since.get_or_insert(now);

        let seconds = now - since;
        if seconds < FPS_REPORT_INTERVAL {
            return None;
        }

        let report = FpsReport {
            frames: self.frames,
            seconds: seconds as f32,
            fps: (self.frames as f64 / seconds) as f32,
        };
        self.since = Some(now);
        self.frames = 0;
        Some(report)
    }
}
