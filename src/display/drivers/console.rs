//! Console display sink.
//!
//! Draws a down-sampled frame with 24-bit ANSI colours. Each character cell
//! is an upper half block (`▀`): the foreground colour paints the upper
//! pixel row and the background colour the lower one, so `rows` text rows
//! show `2 * rows` pixel rows.

use crate::color::Rgb;
use crate::display::signal;
use crate::display::sink::DisplaySink;
use crate::frame::Frame;
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::io::{self, IsTerminal, Stdout, Write};

const UPPER_HALF_BLOCK: char = '\u{2580}';

const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const CLEAR_SCREEN: &str = "\x1b[2J";
const CURSOR_HOME: &str = "\x1b[H";
const RESET_ATTRS: &str = "\x1b[0m";

pub struct ConsoleSink<W: Write = Stdout> {
    out: W,
    columns: usize,
    rows: usize,
    quit_requested: fn() -> bool,
    scratch: Vec<u8>,
}

impl ConsoleSink<Stdout> {
    /// Takes over the terminal on stdout and routes Ctrl-C to quit.
    ///
    /// Fails if stdout is not a terminal.
    pub fn new(title: &str, columns: usize, rows: usize) -> Result<Self> {
        let stdout = io::stdout();
        if !stdout.is_terminal() {
            bail!("ConsoleSink requires stdout to be a terminal");
        }
        signal::install_sigint_handler()?;
        info!("ConsoleSink: {}x{} cells", columns, rows);
        Self::with_writer(stdout, title, columns, rows, signal::sigint_received)
    }
}

impl<W: Write> ConsoleSink<W> {
    /// Builds a sink over any writer; `quit_requested` backs `poll_quit`.
    pub fn with_writer(
        mut out: W,
        title: &str,
        columns: usize,
        rows: usize,
        quit_requested: fn() -> bool,
    ) -> Result<Self> {
        if columns == 0 || rows == 0 {
            bail!("ConsoleSink needs at least one column and one row");
        }
        write!(out, "\x1b]0;{}\x07{}{}", title, HIDE_CURSOR, CLEAR_SCREEN)
            .and_then(|_| out.flush())
            .context("Failed to initialise console output")?;
        Ok(Self {
            out,
            columns,
            rows,
            quit_requested,
            scratch: Vec::new(),
        })
    }

    /// Output written so far (used by tests with an in-memory writer).
    pub fn writer(&self) -> &W {
        &self.out
    }

    fn sample(frame: &Frame, column: usize, columns: usize, pixel_row: usize, pixel_rows: usize) -> Rgb {
        let x = column * frame.width() / columns;
        let y = pixel_row * frame.height() / pixel_rows;
        frame.pixel(x, y).unwrap_or(Rgb::BLACK)
    }

    fn encode(&mut self, frame: &Frame) {
        let buf = &mut self.scratch;
        buf.clear();
        buf.extend_from_slice(CURSOR_HOME.as_bytes());

        let pixel_rows = self.rows * 2;
        let mut block = [0u8; 4];
        let block = UPPER_HALF_BLOCK.encode_utf8(&mut block).as_bytes();

        for row in 0..self.rows {
            let mut current: Option<(Rgb, Rgb)> = None;
            for column in 0..self.columns {
                let upper = Self::sample(frame, column, self.columns, row * 2, pixel_rows);
                let lower = Self::sample(frame, column, self.columns, row * 2 + 1, pixel_rows);
                if current != Some((upper, lower)) {
                    // Writing to a Vec cannot fail.
                    let _ = write!(
                        buf,
                        "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m",
                        upper.r(),
                        upper.g(),
                        upper.b(),
                        lower.r(),
                        lower.g(),
                        lower.b()
                    );
                    current = Some((upper, lower));
                }
                buf.extend_from_slice(block);
            }
            buf.extend_from_slice(RESET_ATTRS.as_bytes());
            if row + 1 < self.rows {
                buf.extend_from_slice(b"\r\n");
            }
        }
    }
}

impl<W: Write> DisplaySink for ConsoleSink<W> {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.encode(frame);
        self.out
            .write_all(&self.scratch)
            .and_then(|_| self.out.flush())
            .context("Failed to write frame to console")
    }

    fn poll_quit(&mut self) -> bool {
        (self.quit_requested)()
    }
}

impl<W: Write> Drop for ConsoleSink<W> {
    fn drop(&mut self) {
        let restored = write!(self.out, "{}{}\r\n", RESET_ATTRS, SHOW_CURSOR)
            .and_then(|_| self.out.flush());
        match restored {
            Ok(()) => debug!("ConsoleSink: terminal restored"),
            Err(e) => warn!("ConsoleSink: failed to restore terminal: {}", e),
        }
    }
}
