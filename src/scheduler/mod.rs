// src/scheduler/mod.rs
//! Frame loop: splits each frame into horizontal bands, renders them on the
//! worker pool, and presents the frame once every band is done.
//!
//! ## Per-frame protocol
//!
//! ```text
//! poll_quit ──quit──▶ Shutdown
//!     │
//!     ▼
//! fill background ─▶ submit band 0..n ─▶ wait band 0..n ─▶ present ─▶ advance
//!                     (row ascending)      (barrier)
//! ```
//!
//! Bands are disjoint row ranges of the one frame buffer, so band jobs write
//! without a lock. The buffer is only read again after the barrier, and the
//! completion handles carry the happens-before edge from each worker's last
//! write to that read.
//!
//! Quit is only checked between frames. A frame that has started is always
//! finished, never cancelled.

mod band;

#[cfg(test)]
mod tests;

pub use band::{partition_rows, Band};

use crate::color::Rgb;
use crate::config::PerformanceConfig;
use crate::display::DisplaySink;
use crate::field::{PixelField, Scene};
use crate::fps::{FpsMeter, RunSummary};
use crate::frame::Frame;
use crate::pool::{CompletionHandle, PoolError, TaskError, WorkerPool};
use anyhow::{Context, Result};
use log::{debug, info, trace, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Whether the loop should keep going after a step.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FrameStatus {
    /// A frame was rendered and presented.
    Running,
    /// The sink asked to quit; no frame was started.
    Shutdown,
}

/// The two states of the scheduler.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SchedulerState {
    /// Barrier satisfied, nothing in flight.
    Idle,
    /// Bands dispatched, barrier pending.
    Computing,
}

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("failed to submit band job")]
    Submit(#[from] PoolError),
    #[error("band {band} failed")]
    Band {
        band: Band,
        #[source]
        source: TaskError,
    },
}

/// Raw view of the frame buffer handed to band jobs.
#[derive(Copy, Clone)]
struct BandTarget {
    base: *mut Rgb,
    width: usize,
    height: usize,
}

// SAFETY: every job gets a distinct band, and the scheduler waits for all of
// them before touching the frame again (see `PendingBands`).
unsafe impl Send for BandTarget {}

impl BandTarget {
    fn new(frame: &mut Frame) -> Self {
        Self {
            base: frame.as_mut_ptr(),
            width: frame.width(),
            height: frame.height(),
        }
    }

    /// # Safety
    /// No other live reference may overlap `band`'s rows, and the frame must
    /// outlive the returned slice.
    unsafe fn rows_mut<'a>(self, band: Band) -> &'a mut [Rgb] {
        debug_assert!(band.end_row <= self.height);
        std::slice::from_raw_parts_mut(
            self.base.add(band.start_row * self.width),
            band.len() * self.width,
        )
    }
}

/// Handles of one frame's band jobs, waited on in submission order.
///
/// Dropping it waits for whatever is still outstanding, so bands can never
/// outlive the frame borrow even if the controller unwinds mid-dispatch.
struct PendingBands {
    handles: Vec<(Band, CompletionHandle<()>)>,
}

impl PendingBands {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            handles: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, band: Band, handle: CompletionHandle<()>) {
        self.handles.push((band, handle));
    }

    /// Waits for every band and returns the first failure.
    fn wait_all(mut self) -> Result<(), FrameError> {
        let mut first_failure = None;
        for (band, handle) in self.handles.drain(..) {
            if let Err(source) = handle.wait() {
                if first_failure.is_none() {
                    first_failure = Some(FrameError::Band { band, source });
                } else {
                    warn!("FrameScheduler: {} also failed: {}", band, source);
                }
            }
        }
        first_failure.map_or(Ok(()), Err)
    }
}

impl Drop for PendingBands {
    fn drop(&mut self) {
        for (_, handle) in self.handles.drain(..) {
            let _ = handle.wait();
        }
    }
}

/// Colours every pixel of `band`; `pixels` holds exactly the band's rows.
fn shade_band<F: PixelField + ?Sized>(field: &F, band: Band, width: usize, pixels: &mut [Rgb]) {
    for (row, y) in pixels.chunks_exact_mut(width).zip(band.rows()) {
        for (x, pixel) in row.iter_mut().enumerate() {
            if let Some(color) = field.shade(x, y) {
                *pixel = color;
            }
        }
    }
}

/// Renders frames on a borrowed [`WorkerPool`] into one reusable buffer.
pub struct FrameScheduler<'p> {
    pool: &'p WorkerPool,
    frame: Frame,
    background: Rgb,
    bands: Vec<Band>,
    state: SchedulerState,
    frames_rendered: u64,
    started: Instant,
}

impl<'p> FrameScheduler<'p> {
    /// The band plan is fixed here from the pool's worker count; pools never
    /// resize.
    pub fn new(pool: &'p WorkerPool, width: usize, height: usize, background: Rgb) -> Self {
        let bands = partition_rows(height, pool.worker_count());
        debug!(
            "FrameScheduler: {}x{} frame in {} bands of up to {} rows",
            width,
            height,
            bands.len(),
            bands.first().map_or(0, Band::len)
        );
        Self {
            pool,
            frame: Frame::new(width, height, background),
            background,
            bands,
            state: SchedulerState::Idle,
            frames_rendered: 0,
            started: Instant::now(),
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Renders one frame: background fill, one job per band, barrier.
    ///
    /// Every submitted band is waited on before this returns, whether or not
    /// any of them failed. On error the frame contents are unspecified.
    pub fn render<F: PixelField>(&mut self, field: F) -> Result<(), FrameError> {
        self.frame.fill(self.background);
        if self.frame.width() == 0 || self.bands.is_empty() {
            self.frames_rendered += 1;
            return Ok(());
        }

        self.state = SchedulerState::Computing;
        let field = Arc::new(field);
        let width = self.frame.width();
        let target = BandTarget::new(&mut self.frame);

        let mut pending = PendingBands::with_capacity(self.bands.len());
        let mut submit_error = None;
        for &band in &self.bands {
            let field = Arc::clone(&field);
            let job = move || {
                // SAFETY: bands are disjoint and `pending` keeps the frame
                // borrowed until this job has finished.
                let pixels = unsafe { target.rows_mut(band) };
                shade_band(&*field, band, width, pixels);
            };
            match self.pool.submit(job) {
                Ok(handle) => pending.push(band, handle),
                Err(e) => {
                    submit_error = Some(e);
                    break;
                }
            }
        }
        trace!("FrameScheduler: dispatched {} bands", pending.handles.len());

        let outcome = pending.wait_all();
        self.state = SchedulerState::Idle;

        if let Some(e) = submit_error {
            return Err(FrameError::Submit(e));
        }
        outcome?;
        self.frames_rendered += 1;
        Ok(())
    }

    /// One iteration of the loop: quit check, render, present, advance.
    pub fn step<S: Scene>(
        &mut self,
        sink: &mut dyn DisplaySink,
        scene: &mut S,
    ) -> Result<FrameStatus> {
        if sink.poll_quit() {
            info!("FrameScheduler: quit requested by display sink");
            return Ok(FrameStatus::Shutdown);
        }

        self.render(scene.field())
            .with_context(|| format!("Failed to render frame {}", self.frames_rendered))?;
        sink.present(&self.frame)
            .context("Display sink failed to present frame")?;
        scene.advance(self.started.elapsed());
        Ok(FrameStatus::Running)
    }

    /// Steps until the sink quits or `performance.max_frames` frames have been
    /// presented, reporting throughput along the way.
    pub fn run<S: Scene>(
        &mut self,
        sink: &mut dyn DisplaySink,
        scene: &mut S,
        performance: &PerformanceConfig,
    ) -> Result<RunSummary> {
        let mut meter = FpsMeter::new(Duration::from_millis(
            performance.fps_report_interval_ms,
        ));
        info!(
            "FrameScheduler: starting loop on {} workers",
            self.pool.worker_count()
        );

        loop {
            if let Some(limit) = performance.max_frames {
                if meter.frames() >= limit {
                    info!("FrameScheduler: reached frame limit of {}", limit);
                    break;
                }
            }
            match self.step(sink, scene)? {
                FrameStatus::Running => {
                    meter.tick();
                }
                FrameStatus::Shutdown => break,
            }
        }

        Ok(meter.summary())
    }
}
