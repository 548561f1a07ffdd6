// src/lib.rs

//! Real-time metaball renderer built on a fixed-size worker pool.
//!
//! - `pool`: worker threads, FIFO job queue, completion handles
//! - `scheduler`: band partitioning and the per-frame dispatch/barrier loop
//! - `field`: per-pixel field functions and the scenes that animate them
//! - `display`: sinks that receive finished frames

pub mod color;
pub mod config;
pub mod display;
pub mod field;
pub mod fps;
pub mod frame;
pub mod pool;
pub mod scheduler;
