//! Line Geometry Cache
//!
//! Rasterizes the straight line between every unordered pair of nails once,
//! before optimization starts. Scoring then only reads slices out of one
//! flat pixel arena, which keeps the N*(N-1)/2 lines compact and lets the
//! cache be shared by reference across scoring workers.

use crate::error::{ThreadArtError, ThreadArtResult};
use rayon::prelude::*;
use threadkit_core::{Nail, Pixel};
use tracing::debug;

/// Precomputed Bresenham lines for every nail pair
#[derive(Debug, Clone)]
pub struct LineGeometryCache {
    nails_quantity: usize,
    canvas_size: u32,
    /// `offsets[k]..offsets[k + 1]` is the pixel range of pair `k`
    offsets: Vec<usize>,
    pixels: Vec<Pixel>,
}

impl LineGeometryCache {
    /// Rasterize all pair lines for `nails` on a `canvas_size` canvas.
    ///
    /// Rows are computed in parallel and concatenated in nail order, so the
    /// result does not depend on scheduling.
    pub fn build(nails: &[Nail], canvas_size: u32) -> ThreadArtResult<Self> {
        if let Some(nail) = nails.iter().find(|n| !Self::in_bounds(n, canvas_size)) {
            return Err(ThreadArtError::InvalidParameters(format!(
                "nail {} lies outside the {}x{} canvas",
                nail, canvas_size, canvas_size
            )));
        }

        let nails_quantity = nails.len();
        let rows: Vec<(Vec<usize>, Vec<Pixel>)> = (0..nails_quantity)
            .into_par_iter()
            .map(|i| {
                let mut lengths = Vec::with_capacity(nails_quantity - i - 1);
                let mut row = Vec::new();
                for j in (i + 1)..nails_quantity {
                    let before = row.len();
                    bresenham_into(nails[i], nails[j], &mut row);
                    lengths.push(row.len() - before);
                }
                (lengths, row)
            })
            .collect();

        let pair_count = pair_count(nails_quantity);
        let pixel_total: usize = rows.iter().map(|(_, row)| row.len()).sum();
        let mut offsets = Vec::with_capacity(pair_count + 1);
        let mut pixels = Vec::with_capacity(pixel_total);
        offsets.push(0);
        let mut end = 0;
        for (lengths, row) in rows {
            for len in lengths {
                end += len;
                offsets.push(end);
            }
            pixels.extend(row);
        }

        debug!(
            nails = nails_quantity,
            pairs = pair_count,
            pixels = pixels.len(),
            "Built line geometry cache"
        );

        Ok(Self {
            nails_quantity,
            canvas_size,
            offsets,
            pixels,
        })
    }

    fn in_bounds(nail: &Nail, canvas_size: u32) -> bool {
        let size = i64::from(canvas_size);
        (0..size).contains(&i64::from(nail.x)) && (0..size).contains(&i64::from(nail.y))
    }

    /// Canonical unordered key for a nail pair
    pub fn canonical_pair(a: usize, b: usize) -> (usize, usize) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Pixels on the line between nails `a` and `b`, in either order.
    ///
    /// Always traversed from the lower index to the higher one. Returns
    /// `None` for `a == b` or an index out of range.
    pub fn line_between(&self, a: usize, b: usize) -> Option<&[Pixel]> {
        let slot = self.slot(a, b)?;
        Some(&self.pixels[self.offsets[slot]..self.offsets[slot + 1]])
    }

    fn slot(&self, a: usize, b: usize) -> Option<usize> {
        let (i, j) = Self::canonical_pair(a, b);
        if i == j || j >= self.nails_quantity {
            return None;
        }
        let n = self.nails_quantity;
        Some(i * (2 * n - i - 1) / 2 + (j - i - 1))
    }

    pub fn nails_quantity(&self) -> usize {
        self.nails_quantity
    }

    pub fn pair_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Side length of the canvas the lines were rasterized for
    pub fn canvas_size(&self) -> u32 {
        self.canvas_size
    }

    /// Total pixels stored across all lines
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }
}

/// Number of unordered pairs among `nails_quantity` nails
pub fn pair_count(nails_quantity: usize) -> usize {
    nails_quantity * nails_quantity.saturating_sub(1) / 2
}

/// Bresenham's line algorithm, endpoints included.
///
/// Both endpoints must already be validated against the canvas, so every
/// visited point fits a `Pixel`.
fn bresenham_into(start: Nail, end: Nail, out: &mut Vec<Pixel>) {
    let dx = (end.x - start.x).abs();
    let dy = -(end.y - start.y).abs();
    let sx = if start.x < end.x { 1 } else { -1 };
    let sy = if start.y < end.y { 1 } else { -1 };

    let mut err = dx + dy;
    let (mut x, mut y) = (start.x, start.y);
    loop {
        out.push(Pixel::new(x as u16, y as u16));
        if x == end.x && y == end.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
