//! Data model for thread art generation.
//!
//! - [`Nail`]: a pin on the circular frame, addressed by its index in the nail list
//! - [`Pixel`]: a raster coordinate on the working canvas
//! - [`Edge`]: one thread segment between two nails

use serde::{Deserialize, Serialize};
use std::fmt;

/// A nail position in canvas pixel coordinates.
///
/// A nail's identity is its index in the ordered nail list; the position is
/// only used for rasterizing lines and for physical scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nail {
    /// Column, 0 at the left edge of the canvas
    pub x: i32,
    /// Row, 0 at the top edge of the canvas
    pub y: i32,
}

impl Nail {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Nail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A pixel on the working canvas.
///
/// Stored as `u16` pairs to keep the line cache compact; canvases are limited
/// to [`Pixel::MAX_CANVAS_SIZE`] pixels per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pixel {
    pub x: u16,
    pub y: u16,
}

impl Pixel {
    /// Largest canvas side length addressable by a `Pixel`.
    pub const MAX_CANVAS_SIZE: u32 = u16::MAX as u32 + 1;

    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// A thread segment chosen by the optimizer, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Nail the thread leaves from
    pub starting_nail: usize,
    /// Nail the thread is wrapped around next
    pub ending_nail: usize,
}

impl Edge {
    pub fn new(starting_nail: usize, ending_nail: usize) -> Self {
        Self {
            starting_nail,
            ending_nail,
        }
    }

    /// Unordered identity of the edge as `(min, max)`.
    pub fn canonical(&self) -> (usize, usize) {
        if self.starting_nail <= self.ending_nail {
            (self.starting_nail, self.ending_nail)
        } else {
            (self.ending_nail, self.starting_nail)
        }
    }

    /// Circular index gap between the two nails on a frame of `nails_quantity` nails.
    pub fn circular_gap(&self, nails_quantity: usize) -> usize {
        circular_distance(self.starting_nail, self.ending_nail, nails_quantity)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.starting_nail, self.ending_nail)
    }
}

/// Shortest distance between two nail indices going either way round the frame.
pub fn circular_distance(a: usize, b: usize, nails_quantity: usize) -> usize {
    let diff = a.abs_diff(b);
    diff.min(nails_quantity.saturating_sub(diff))
}
