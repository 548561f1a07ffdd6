// src/scheduler/band.rs

use std::fmt;
use std::ops::Range;

/// A half-open range of frame rows, `[start_row, end_row)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Band {
    pub start_row: usize,
    pub end_row: usize,
}

impl Band {
    pub fn rows(&self) -> Range<usize> {
        self.start_row..self.end_row
    }

    pub fn len(&self) -> usize {
        self.end_row - self.start_row
    }

    pub fn is_empty(&self) -> bool {
        self.start_row == self.end_row
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rows [{}, {})", self.start_row, self.end_row)
    }
}

/// Splits `total_rows` into bands of `ceil(total_rows / workers)` rows.
///
/// The last band is clamped to `total_rows`, so it may be shorter. The bands
/// cover every row exactly once, in ascending order, and none is empty. A
/// `workers` of 0 is treated as 1.
pub fn partition_rows(total_rows: usize, workers: usize) -> Vec<Band> {
    if total_rows == 0 {
        return Vec::new();
    }
    let band_height = total_rows.div_ceil(workers.max(1));
    (0..total_rows)
        .step_by(band_height)
        .map(|start_row| Band {
            start_row,
            end_row: (start_row + band_height).min(total_rows),
        })
        .collect()
}
