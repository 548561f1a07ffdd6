// src/display/sink.rs
//! DisplaySink trait - the two operations the frame loop needs from an output.
//!
//! ## Lifecycle
//! 1. Construction - acquire the output (terminal, window, ...). Failure here
//!    is fatal and happens before the first frame.
//! 2. `poll_quit` / `present` - called alternately by the frame loop on the
//!    controller thread.
//! 3. `Drop` - release the output (no explicit shutdown call).

use crate::frame::Frame;
use anyhow::Result;

/// Destination for finished frames.
pub trait DisplaySink {
    /// Shows a fully rendered frame. Called only after every band of the frame
    /// has completed.
    fn present(&mut self, frame: &Frame) -> Result<()>;

    /// Returns `true` once the user (or the sink itself) wants the loop to stop.
    fn poll_quit(&mut self) -> bool;
}
