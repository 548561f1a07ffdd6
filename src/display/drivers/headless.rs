//! Headless display sink: no output, optional frame limit.

use crate::display::sink::DisplaySink;
use crate::frame::Frame;
use anyhow::Result;
use log::{info, trace};

pub struct HeadlessSink {
    frames_presented: u64,
    frame_limit: Option<u64>,
    keep_last_frame: bool,
    last_frame: Option<Frame>,
}

impl HeadlessSink {
    /// `frame_limit` makes the sink request quit after that many frames.
    pub fn new(title: &str, frame_limit: Option<u64>) -> Self {
        info!(
            "HeadlessSink: '{}' (frame limit: {:?})",
            title, frame_limit
        );
        Self {
            frames_presented: 0,
            frame_limit,
            keep_last_frame: false,
            last_frame: None,
        }
    }

    /// Keep a copy of the most recently presented frame.
    pub fn retaining_last_frame(mut self) -> Self {
        self.keep_last_frame = true;
        self
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }
}

impl DisplaySink for HeadlessSink {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.frames_presented += 1;
        trace!("HeadlessSink: Present #{}", self.frames_presented);

        if self.keep_last_frame {
            match &mut self.last_frame {
                Some(last) if last.width() == frame.width() && last.height() == frame.height() => {
                    last.as_mut_slice().copy_from_slice(frame.as_slice());
                }
                slot => *slot = Some(frame.clone()),
            }
        }
        Ok(())
    }

    fn poll_quit(&mut self) -> bool {
        self.frame_limit
            .is_some_and(|limit| self.frames_presented >= limit)
    }
}
