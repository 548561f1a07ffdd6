// src/main.rs

use metaballs::{
    config::Config,
    display,
    field::MetaballScene,
    pool::WorkerPool,
    scheduler::FrameScheduler,
};

use anyhow::Context;
use log::{error, info};

/// Main entry point for `metaballs`.
fn main() -> anyhow::Result<()> {
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting metaballs...");

    let config = Config::load_or_default();
    let (width, height) = (config.window.width, config.window.height);

    // --- Display ---
    // A sink that cannot be opened ends the process before any frame is rendered.
    let mut sink = display::open_sink(&config).context("Failed to open display sink")?;

    // --- Worker Pool ---
    let workers = config.resolved_workers();
    let pool = WorkerPool::new(workers).context("Failed to start worker pool")?;
    info!("Rendering {}x{} on {} workers", width, height, workers);

    // --- Main Loop ---
    let mut scene = MetaballScene::new(width, height, &config.scene);
    let outcome = {
        let mut scheduler = FrameScheduler::new(&pool, width, height, config.scene.background);
        scheduler.run(sink.as_mut(), &mut scene, &config.performance)
    };

    // --- Cleanup ---
    // Restore the terminal before the final log lines.
    drop(sink);
    pool.shutdown();

    match outcome {
        Ok(summary) => {
            info!(
                "Rendered {} frames in {:.2?} ({:.1} fps average)",
                summary.frames,
                summary.elapsed,
                summary.average_fps()
            );
            Ok(())
        }
        Err(e) => {
            error!(
                "Frame loop failed: {:#}. Root cause: {:?}",
                e,
                e.root_cause()
            );
            Err(e)
        }
    }
}
