// src/display/signal.rs
//! SIGINT as a quit request.
//!
//! The handler only flips an atomic flag; the frame loop observes it through
//! `DisplaySink::poll_quit` between frames.

use anyhow::{Context, Result};
use log::debug;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::ffi::c_int;
use std::sync::atomic::{AtomicBool, Ordering};

static SIGINT_RECEIVED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_signal: c_int) {
    SIGINT_RECEIVED.store(true, Ordering::SeqCst);
}

/// Routes SIGINT to the quit flag instead of terminating the process.
pub fn install_sigint_handler() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_sigint),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: the handler only performs an atomic store.
    unsafe { sigaction(Signal::SIGINT, &action) }.context("Failed to install SIGINT handler")?;
    debug!("SIGINT handler installed");
    Ok(())
}

pub fn sigint_received() -> bool {
    SIGINT_RECEIVED.load(Ordering::SeqCst)
}
