// src/fps.rs
//! Throughput measurement for the frame loop.

use log::info;
use std::time::{Duration, Instant};

/// Totals for one run of the frame loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn average_fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

/// Counts presented frames and logs the frame rate once per interval.
pub struct FpsMeter {
    report_interval: Duration,
    started: Instant,
    window_start: Instant,
    window_frames: u64,
    total_frames: u64,
}

impl FpsMeter {
    pub fn new(report_interval: Duration) -> Self {
        Self::starting_at(report_interval, Instant::now())
    }

    fn starting_at(report_interval: Duration, now: Instant) -> Self {
        Self {
            report_interval,
            started: now,
            window_start: now,
            window_frames: 0,
            total_frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.total_frames
    }

    /// Records a frame. Returns the frame rate of the window that just closed,
    /// if the report interval has elapsed.
    pub fn tick(&mut self) -> Option<f64> {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> Option<f64> {
        self.total_frames += 1;
        self.window_frames += 1;

        let window = now.saturating_duration_since(self.window_start);
        if window < self.report_interval || window.is_zero() {
            return None;
        }
        let fps = self.window_frames as f64 / window.as_secs_f64();
        info!("{:4.0} fps", fps);
        self.window_start = now;
        self.window_frames = 0;
        Some(fps)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.total_frames,
            elapsed: self.started.elapsed(),
        }
    }
}
