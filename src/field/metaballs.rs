// src/field/metaballs.rs

//! Metaball field: every ball contributes `1 / distance` to a pixel's
//! strength, and pixels whose summed strength reaches a threshold take a blend
//! of the ball colours.
//!
//! With two balls the blend is `first.lerp(second, s_first / total)`: the
//! closer a pixel is to the first ball, the more it shows the second ball's
//! colour. More balls generalise this by weighting each colour with the
//! strength of all the other balls, `(total - s_i) / ((n - 1) * total)`,
//! which reduces to the two-ball lerp.

use super::{PixelField, Scene};
use crate::color::Rgb;
use crate::config::SceneConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A ball in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub x: i32,
    pub y: i32,
    /// Radius; only used to size the orbit.
    pub r: i32,
    pub color: Rgb,
}

/// Approximate `1 / sqrt(number)` with one Newton step.
///
/// At `number == 0` this returns a large finite value rather than infinity,
/// which keeps the colour weights well defined at a ball's centre.
#[inline]
pub fn fast_rsqrt(number: f32) -> f32 {
    const MAGIC: u32 = 0x5f37_59df;
    let y = f32::from_bits(MAGIC.wrapping_sub(number.to_bits() >> 1));
    y * (1.5 - number * 0.5 * y * y)
}

/// Snapshot of the balls for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaballField {
    balls: Vec<Ball>,
    threshold: f32,
}

impl MetaballField {
    pub fn new(balls: Vec<Ball>, threshold: f32) -> Self {
        Self { balls, threshold }
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }
}

fn strength(ball: &Ball, px: f32, py: f32) -> f32 {
    let dx = px - ball.x as f32;
    let dy = py - ball.y as f32;
    fast_rsqrt(dx * dx + dy * dy)
}

impl PixelField for MetaballField {
    fn shade(&self, x: usize, y: usize) -> Option<Rgb> {
        let (px, py) = (x as f32, y as f32);
        let total: f32 = self.balls.iter().map(|ball| strength(ball, px, py)).sum();
        if self.balls.is_empty() || total < self.threshold {
            return None;
        }

        match self.balls.as_slice() {
            [only] => Some(only.color),
            [first, second] => Some(first.color.lerp(second.color, strength(first, px, py) / total)),
            balls => {
                let others = (balls.len() - 1) as f32 * total;
                let (mut r, mut g, mut b) = (0.0f32, 0.0f32, 0.0f32);
                for ball in balls {
                    let weight = (total - strength(ball, px, py)) / others;
                    r += weight * ball.color.r() as f32;
                    g += weight * ball.color.g() as f32;
                    b += weight * ball.color.b() as f32;
                }
                Some(Rgb::from_channels(
                    r.round() as u8,
                    g.round() as u8,
                    b.round() as u8,
                ))
            }
        }
    }
}

/// Balls plus the orbit animation of one of them.
#[derive(Debug, Clone)]
pub struct MetaballScene {
    balls: Vec<Ball>,
    threshold: f32,
    orbiting: Option<usize>,
    width: usize,
    height: usize,
}

impl MetaballScene {
    pub fn new(width: usize, height: usize, config: &SceneConfig) -> Self {
        let orbiting = config.orbiting.filter(|&i| i < config.balls.len());
        Self {
            balls: config.balls.clone(),
            threshold: config.threshold,
            orbiting,
            width,
            height,
        }
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }
}

impl Scene for MetaballScene {
    type Field = MetaballField;

    fn field(&self) -> MetaballField {
        MetaballField::new(self.balls.clone(), self.threshold)
    }

    /// Puts the orbiting ball on an ellipse around the frame centre, twice as
    /// wide as it is tall, one revolution every 2π seconds.
    fn advance(&mut self, elapsed: Duration) {
        let Some(index) = self.orbiting else {
            return;
        };
        let t = elapsed.as_secs_f32();
        let (cx, cy) = ((self.width / 2) as f32, (self.height / 2) as f32);
        let ball = &mut self.balls[index];
        let r = ball.r as f32;
        ball.x = (cx + t.sin() * r * 2.0).round() as i32;
        ball.y = (cy + t.cos() * r).round() as i32;
    }
}
