// src/color.rs

//! Packed RGB colour used by frame buffers and field functions.

use serde::{Deserialize, Serialize};

/// A colour packed as `0x00RRGGBB`.
///
/// This is the layout frame buffers hold and display sinks consume, so a
/// `Frame` can be handed to a sink without conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Rgb(pub u32);

// Channel shifts within the packed value.
const RED_SHIFT: u32 = 16;
const GREEN_SHIFT: u32 = 8;
const BLUE_SHIFT: u32 = 0;
const CHANNEL_MASK: u32 = 0xFF;

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x000000);
    pub const WHITE: Rgb = Rgb(0xFFFFFF);

    /// Builds a colour from its three channels.
    pub const fn from_channels(r: u8, g: u8, b: u8) -> Self {
        Rgb(((r as u32) << RED_SHIFT) | ((g as u32) << GREEN_SHIFT) | ((b as u32) << BLUE_SHIFT))
    }

    pub const fn r(self) -> u8 {
        ((self.0 >> RED_SHIFT) & CHANNEL_MASK) as u8
    }

    pub const fn g(self) -> u8 {
        ((self.0 >> GREEN_SHIFT) & CHANNEL_MASK) as u8
    }

    pub const fn b(self) -> u8 {
        ((self.0 >> BLUE_SHIFT) & CHANNEL_MASK) as u8
    }

    /// Linear interpolation per channel: `t = 0` yields `self`, `t = 1`
    /// yields `other`. `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let a = a as f32;
            let b = b as f32;
            (a + (b - a) * t) as u8
        };
        Rgb::from_channels(
            mix(self.r(), other.r()),
            mix(self.g(), other.g()),
            mix(self.b(), other.b()),
        )
    }
}

impl From<u32> for Rgb {
    /// Drops anything above the low 24 bits.
    fn from(value: u32) -> Self {
        Rgb(value & 0x00FF_FFFF)
    }
}

impl From<Rgb> for u32 {
    fn from(color: Rgb) -> Self {
        color.0
    }
}
