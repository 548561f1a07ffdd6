// src/display/mod.rs
//! Display sinks for finished frames.
//!
//! - DisplaySink: the two operations the frame loop relies on
//! - drivers: headless and console implementations
//! - manager: opens the sink chosen by the configuration

pub mod drivers;
pub mod manager;
pub mod signal;
pub mod sink;

pub use drivers::{ConsoleSink, HeadlessSink};
pub use manager::open_sink;
pub use sink::DisplaySink;
