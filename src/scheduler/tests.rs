// src/scheduler/tests.rs

use super::*;
use crate::display::HeadlessSink;
use anyhow::anyhow;
use test_log::test;

const BACKGROUND: Rgb = Rgb(0x5555AA);

fn position_color(x: usize, y: usize) -> Option<Rgb> {
    Some(Rgb::from((y * 1000 + x) as u32))
}

/// Scene whose field encodes pixel positions and which counts advances.
#[derive(Default)]
struct CountingScene {
    advances: usize,
}

impl Scene for CountingScene {
    type Field = fn(usize, usize) -> Option<Rgb>;

    fn field(&self) -> Self::Field {
        position_color
    }

    fn advance(&mut self, _elapsed: Duration) {
        self.advances += 1;
    }
}

struct FailingSink;

impl DisplaySink for FailingSink {
    fn present(&mut self, _frame: &Frame) -> Result<()> {
        Err(anyhow!("display went away"))
    }

    fn poll_quit(&mut self) -> bool {
        false
    }
}

fn band(start_row: usize, end_row: usize) -> Band {
    Band { start_row, end_row }
}

// --- Partitioning ---

#[test]
fn it_should_clamp_the_last_band_of_a_160x90_frame_on_4_workers() {
    assert_eq!(
        partition_rows(90, 4),
        vec![band(0, 23), band(23, 46), band(46, 69), band(69, 90)]
    );
}

#[test]
fn it_should_partition_rows_exactly_for_every_size_and_worker_count() {
    for rows in 0..=64 {
        for workers in 1..=10 {
            let bands = partition_rows(rows, workers);
            let height = if rows == 0 { 0 } else { rows.div_ceil(workers) };

            let mut next = 0;
            for b in &bands {
                assert_eq!(b.start_row, next, "gap or overlap at R={} N={}", rows, workers);
                assert!(!b.is_empty(), "empty band at R={} N={}", rows, workers);
                assert!(b.len() <= height);
                next = b.end_row;
            }
            assert_eq!(next, rows, "R={} N={} not fully covered", rows, workers);
            assert!(bands.len() <= workers);
            if rows >= workers {
                // Only the last band may be short.
                assert!(bands[..bands.len() - 1].iter().all(|b| b.len() == height));
            }
        }
    }
}

#[test]
fn it_should_use_one_row_per_band_when_rows_are_fewer_than_workers() {
    assert_eq!(partition_rows(3, 8), vec![band(0, 1), band(1, 2), band(2, 3)]);
}

#[test]
fn it_should_treat_zero_workers_as_one() {
    assert_eq!(partition_rows(5, 0), vec![band(0, 5)]);
    assert!(partition_rows(0, 4).is_empty());
}

#[test]
fn it_should_format_bands_as_row_ranges() {
    assert_eq!(band(23, 46).to_string(), "rows [23, 46)");
}

// --- Rendering ---

#[test]
fn it_should_plan_bands_from_the_pool_size() -> anyhow::Result<()> {
    let pool = WorkerPool::new(4)?;
    let scheduler = FrameScheduler::new(&pool, 160, 90, BACKGROUND);
    assert_eq!(scheduler.bands(), partition_rows(90, 4).as_slice());
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    Ok(())
}

#[test]
fn it_should_render_identical_frames_for_any_worker_count() -> anyhow::Result<()> {
    let mut frames = Vec::new();
    for workers in [1, 2, 8] {
        let pool = WorkerPool::new(workers)?;
        let mut scheduler = FrameScheduler::new(&pool, 160, 90, BACKGROUND);
        scheduler.render(position_color)?;
        frames.push(scheduler.frame().clone());
    }

    for y in 0..90 {
        for x in 0..160 {
            assert_eq!(frames[0].pixel(x, y), position_color(x, y));
        }
    }
    assert_eq!(frames[0], frames[1]);
    assert_eq!(frames[0], frames[2]);
    Ok(())
}

#[test]
fn it_should_shade_bands_on_pool_workers_only() -> anyhow::Result<()> {
    let pool = WorkerPool::new(4)?;
    let mut scheduler = FrameScheduler::new(&pool, 16, 40, BACKGROUND);
    let shaders = Arc::new(std::sync::Mutex::new(Vec::new()));

    let seen = Arc::clone(&shaders);
    scheduler.render(move |x: usize, y: usize| {
        if x == 0 {
            let name = std::thread::current().name().unwrap_or("<unnamed>").to_owned();
            seen.lock().unwrap().push(name);
        }
        position_color(x, y)
    })?;

    let shaders = shaders.lock().unwrap();
    assert_eq!(shaders.len(), 40);
    assert!(
        shaders.iter().all(|name| name.starts_with("pool-worker-")),
        "rows shaded on {:?}",
        *shaders
    );
    Ok(())
}

#[test]
fn it_should_keep_the_background_where_the_field_declines() -> anyhow::Result<()> {
    let pool = WorkerPool::new(3)?;
    let mut scheduler = FrameScheduler::new(&pool, 8, 7, BACKGROUND);

    scheduler.render(|x: usize, y: usize| (x == y).then_some(Rgb::WHITE))?;

    for y in 0..7 {
        for x in 0..8 {
            let expected = if x == y { Rgb::WHITE } else { BACKGROUND };
            assert_eq!(scheduler.frame().pixel(x, y), Some(expected));
        }
    }
    Ok(())
}

#[test]
fn it_should_reset_the_buffer_between_frames() -> anyhow::Result<()> {
    let pool = WorkerPool::new(2)?;
    let mut scheduler = FrameScheduler::new(&pool, 4, 4, BACKGROUND);

    scheduler.render(|_x: usize, _y: usize| Some(Rgb::WHITE))?;
    scheduler.render(|_x: usize, y: usize| (y == 0).then_some(Rgb::BLACK))?;

    assert_eq!(scheduler.frame().row(0), &[Rgb::BLACK; 4]);
    assert_eq!(scheduler.frame().row(3), &[BACKGROUND; 4]);
    assert_eq!(scheduler.frames_rendered(), 2);
    Ok(())
}

#[test]
fn it_should_report_a_failed_band_after_the_others_finish() -> anyhow::Result<()> {
    let pool = WorkerPool::new(4)?;
    let mut scheduler = FrameScheduler::new(&pool, 160, 90, BACKGROUND);

    let result = scheduler.render(|x: usize, y: usize| {
        if (23..46).contains(&y) {
            panic!("field undefined at row {}", y);
        }
        position_color(x, y)
    });

    match result {
        Err(FrameError::Band { band: failed, source }) => {
            assert_eq!(failed, band(23, 46));
            assert_eq!(source, TaskError::Panicked("field undefined at row 23".to_string()));
        }
        other => panic!("expected a band failure, got {:?}", other),
    }
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    // The healthy bands finished their rows.
    for y in (0..23).chain(46..90) {
        assert_eq!(scheduler.frame().pixel(159, y), position_color(159, y));
    }

    // And the pool carries on with the next frame.
    scheduler.render(position_color)?;
    assert_eq!(scheduler.frame().pixel(5, 30), position_color(5, 30));
    Ok(())
}

#[test]
fn it_should_surface_submission_failures_once_the_pool_is_shut_down() -> anyhow::Result<()> {
    let pool = WorkerPool::new(2)?;
    let mut scheduler = FrameScheduler::new(&pool, 4, 4, BACKGROUND);
    pool.shutdown();

    let result = scheduler.render(position_color);
    assert!(matches!(result, Err(FrameError::Submit(PoolError::ShutDown))));
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    Ok(())
}

#[test]
fn it_should_render_an_empty_frame_without_dispatching() -> anyhow::Result<()> {
    let pool = WorkerPool::new(2)?;
    let mut scheduler = FrameScheduler::new(&pool, 0, 0, BACKGROUND);
    assert!(scheduler.bands().is_empty());
    scheduler.render(position_color)?;
    assert_eq!(pool.queued(), 0);
    Ok(())
}

// --- Frame loop ---

#[test]
fn it_should_stop_before_rendering_when_the_sink_quits() -> anyhow::Result<()> {
    let pool = WorkerPool::new(2)?;
    let mut scheduler = FrameScheduler::new(&pool, 16, 9, BACKGROUND);
    let mut sink = HeadlessSink::new("test", Some(0));
    let mut scene = CountingScene::default();

    let status = scheduler.step(&mut sink, &mut scene)?;

    assert_eq!(status, FrameStatus::Shutdown);
    assert_eq!(scheduler.frames_rendered(), 0);
    assert_eq!(sink.frames_presented(), 0);
    assert_eq!(scene.advances, 0);
    Ok(())
}

#[test]
fn it_should_present_then_advance_on_each_step() -> anyhow::Result<()> {
    let pool = WorkerPool::new(3)?;
    let mut scheduler = FrameScheduler::new(&pool, 16, 9, BACKGROUND);
    let mut sink = HeadlessSink::new("test", None).retaining_last_frame();
    let mut scene = CountingScene::default();

    assert_eq!(scheduler.step(&mut sink, &mut scene)?, FrameStatus::Running);

    assert_eq!(sink.frames_presented(), 1);
    assert_eq!(scene.advances, 1);
    assert_eq!(sink.last_frame(), Some(scheduler.frame()));
    assert_eq!(sink.last_frame().and_then(|f| f.pixel(15, 8)), position_color(15, 8));
    Ok(())
}

#[test]
fn it_should_run_until_the_sink_asks_to_quit() -> anyhow::Result<()> {
    let pool = WorkerPool::new(4)?;
    let mut scheduler = FrameScheduler::new(&pool, 32, 18, BACKGROUND);
    let mut sink = HeadlessSink::new("test", Some(5));
    let mut scene = CountingScene::default();

    let summary = scheduler.run(&mut sink, &mut scene, &PerformanceConfig::default())?;

    assert_eq!(summary.frames, 5);
    assert_eq!(sink.frames_presented(), 5);
    assert_eq!(scene.advances, 5);
    Ok(())
}

#[test]
fn it_should_stop_at_the_configured_frame_limit() -> anyhow::Result<()> {
    let pool = WorkerPool::new(2)?;
    let mut scheduler = FrameScheduler::new(&pool, 8, 8, BACKGROUND);
    let mut sink = HeadlessSink::new("test", None);
    let mut scene = CountingScene::default();
    let performance = PerformanceConfig {
        max_frames: Some(3),
        ..PerformanceConfig::default()
    };

    let summary = scheduler.run(&mut sink, &mut scene, &performance)?;

    assert_eq!(summary.frames, 3);
    assert_eq!(sink.frames_presented(), 3);
    Ok(())
}

#[test]
fn it_should_propagate_sink_failures_and_leave_the_pool_joinable() -> anyhow::Result<()> {
    let pool = WorkerPool::new(2)?;
    {
        let mut scheduler = FrameScheduler::new(&pool, 8, 8, BACKGROUND);
        let mut scene = CountingScene::default();
        let err = scheduler
            .run(&mut FailingSink, &mut scene, &PerformanceConfig::default())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("display went away"));
        assert_eq!(scene.advances, 0);
    }
    pool.shutdown();
    Ok(())
}
