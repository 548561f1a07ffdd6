// src/display/manager.rs
//! Picks and opens the display sink named in the configuration.

use crate::config::{Config, DisplayDriverKind};
use crate::display::drivers::{ConsoleSink, HeadlessSink};
use crate::display::sink::DisplaySink;
use anyhow::{Context, Result};
use log::info;

/// Opens the configured sink. Any failure here is a startup failure: the
/// caller must not enter the frame loop.
pub fn open_sink(config: &Config) -> Result<Box<dyn DisplaySink>> {
    let title = &config.window.title;
    match config.display.driver {
        DisplayDriverKind::Headless => {
            info!("Opening headless display sink");
            Ok(Box::new(HeadlessSink::new(title, config.display.frame_limit)))
        }
        DisplayDriverKind::Console => {
            info!("Opening console display sink");
            let sink = ConsoleSink::new(title, config.display.columns, config.display.rows)
                .context("Failed to open console display")?;
            Ok(Box::new(sink))
        }
    }
}
