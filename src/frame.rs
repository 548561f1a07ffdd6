// src/frame.rs
//! Frame buffer shared by the scheduler and the display sinks.

use crate::color::Rgb;

/// A row-major grid of packed colours.
///
/// One frame is allocated per scheduler and overwritten every iteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<Rgb>,
}

impl Frame {
    /// Creates a frame filled with `fill`.
    #[must_use]
    pub fn new(width: usize, height: usize, fill: Rgb) -> Self {
        Self {
            width,
            height,
            data: vec![fill; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Overwrites every pixel with `color`.
    pub fn fill(&mut self, color: Rgb) {
        self.data.fill(color);
    }

    /// Pixel at column `x`, row `y`, or `None` outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// One row of pixels.
    ///
    /// # Panics
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &[Rgb] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    pub fn as_slice(&self) -> &[Rgb] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [Rgb] {
        &mut self.data
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut Rgb {
        self.data.as_mut_ptr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_start_filled_with_the_given_color() {
        let frame = Frame::new(4, 3, Rgb(0x5555AA));
        assert_eq!(frame.as_slice().len(), 12);
        assert!(frame.as_slice().iter().all(|&p| p == Rgb(0x5555AA)));
    }

    #[test]
    fn it_should_index_pixels_row_major() {
        let mut frame = Frame::new(4, 3, Rgb::BLACK);
        frame.as_mut_slice()[4 + 2] = Rgb::WHITE;
        assert_eq!(frame.pixel(2, 1), Some(Rgb::WHITE));
        assert_eq!(frame.row(1)[2], Rgb::WHITE);
        assert_eq!(frame.pixel(4, 0), None);
        assert_eq!(frame.pixel(0, 3), None);
    }
}
