// src/display/drivers/mod.rs
//! Concrete display sinks.

pub mod console;
pub mod headless;

pub use console::ConsoleSink;
pub use headless::HeadlessSink;
