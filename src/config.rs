// src/config.rs

//! Configuration for the metaballs renderer.
//!
//! Settings are grouped by concern (window, pool, scene, display,
//! performance) and deserialized from JSON. Every struct carries
//! `#[serde(default)]`, so a config file only needs the fields it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::Rgb;
use crate::field::Ball;
use anyhow::{Context, Result};
use log::{info, warn};

/// Environment variable naming a JSON config file.
pub const CONFIG_PATH_ENV: &str = "METABALLS_CONFIG";

// --- Top-Level Configuration Structure ---

/// Root of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub pool: PoolConfig,
    pub scene: SceneConfig,
    pub display: DisplayConfig,
    pub performance: PerformanceConfig,
}

impl Config {
    /// Reads a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config at {}", path.display()))
    }

    /// Loads the file named by `METABALLS_CONFIG`, or the defaults if it is
    /// unset or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = std::env::var_os(CONFIG_PATH_ENV) else {
            info!("{} not set, using default configuration", CONFIG_PATH_ENV);
            return Self::default();
        };
        match Self::load(Path::new(&path)) {
            Ok(config) => {
                info!("Configuration loaded from {:?}", path);
                config
            }
            Err(e) => {
                warn!("{:#}. Falling back to default configuration.", e);
                Self::default()
            }
        }
    }

    /// Number of pool workers: the configured count, or the machine's
    /// available parallelism when set to 0.
    pub fn resolved_workers(&self) -> usize {
        if self.pool.workers > 0 {
            return self.pool.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

// --- Window Configuration ---

/// Title and pixel dimensions of the rendered frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Frame width in pixels.
    pub width: usize,
    /// Frame height in pixels.
    pub height: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            title: "Meta-Balls".to_string(),
            width: 16 * 100,
            height: 9 * 100,
        }
    }
}

// --- Pool Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PoolConfig {
    /// Worker threads. 0 means one per available hardware thread.
    pub workers: usize,
}

// --- Scene Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Colour of pixels the field leaves untouched.
    pub background: Rgb,
    /// Minimum summed strength for a pixel to take the balls' colour.
    pub threshold: f32,
    pub balls: Vec<Ball>,
    /// Index of the ball that orbits the frame centre, if any.
    pub orbiting: Option<usize>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let window = WindowConfig::default();
        SceneConfig {
            background: Rgb(0x5555AA),
            threshold: 0.005,
            balls: vec![
                Ball {
                    x: 200,
                    y: 200,
                    r: 100,
                    color: Rgb(0xEEEE22),
                },
                Ball {
                    x: (window.width / 2) as i32,
                    y: (window.height / 2) as i32,
                    r: 100,
                    color: Rgb(0xEE22EE),
                },
            ],
            orbiting: Some(1),
        }
    }
}

// --- Display Configuration ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayDriverKind {
    /// Draws into the terminal.
    Console,
    /// Presents nowhere; useful for benchmarking and tests.
    Headless,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub driver: DisplayDriverKind,
    /// Console sink width in character cells.
    pub columns: usize,
    /// Console sink height in character cells (two pixel rows each).
    pub rows: usize,
    /// Headless sink requests quit after this many frames.
    pub frame_limit: Option<u64>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            driver: DisplayDriverKind::Console,
            columns: 80,
            rows: 24,
            frame_limit: None,
        }
    }
}

// --- Performance Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// How often the frame rate is logged.
    pub fps_report_interval_ms: u64,
    /// Stop after this many presented frames.
    pub max_frames: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        PerformanceConfig {
            fps_report_interval_ms: 500,
            max_frames: None,
        }
    }
}
