// src/field/mod.rs
//! Per-pixel field functions and the scenes that produce them.
//!
//! A [`Scene`] owns mutable simulation state. Once per frame the scheduler
//! asks it for a [`PixelField`] snapshot, which is shared read-only by every
//! band of that frame, then calls [`Scene::advance`] after the frame has been
//! presented. Mutating the scene can therefore never race with bands still
//! reading the previous snapshot.

pub mod metaballs;

pub use metaballs::{Ball, MetaballField, MetaballScene};

use crate::color::Rgb;
use std::time::Duration;

/// A pure colour function over pixel coordinates.
///
/// `None` leaves the pixel at the frame's background colour.
pub trait PixelField: Send + Sync + 'static {
    fn shade(&self, x: usize, y: usize) -> Option<Rgb>;
}

impl<F> PixelField for F
where
    F: Fn(usize, usize) -> Option<Rgb> + Send + Sync + 'static,
{
    fn shade(&self, x: usize, y: usize) -> Option<Rgb> {
        self(x, y)
    }
}

/// Time-dependent state feeding the field function.
pub trait Scene {
    type Field: PixelField;

    /// Captures the parameters for the next frame by value.
    fn field(&self) -> Self::Field;

    /// Moves the simulation forward; `elapsed` is the time since the loop started.
    fn advance(&mut self, elapsed: Duration);
}
