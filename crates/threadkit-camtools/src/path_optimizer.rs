//! Greedy Path Optimizer
//!
//! Chooses the thread sequence one nail at a time. Every iteration scores
//! all eligible candidate lines from the current nail in parallel against the
//! working canvas, joins, then commits the darkest line single-threaded:
//! the line is recorded and its pixels brightened so later iterations see
//! less remaining darkness along it.
//!
//! Scoring borrows the canvas and the line cache immutably; only the commit
//! step borrows the canvas mutably, so no write can overlap a read.

use crate::error::{ThreadArtError, ThreadArtResult};
use crate::line_cache::LineGeometryCache;
use image::GrayImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use threadkit_core::{circular_distance, Edge, Pixel, PixelScale};
use tracing::{debug, trace};

/// Optimizer tuning
#[derive(Debug, Clone, Copy)]
pub struct OptimizerConfig {
    /// Upper bound on committed edges
    pub max_paths: usize,
    /// Nail the thread starts from
    pub starting_nail: usize,
    /// Minimum circular index gap between consecutive nails
    pub minimum_difference: usize,
    /// Brightness added to every pixel of a committed line
    pub brightness_increment: u8,
    /// Pixel to millimetre conversion for thread length
    pub scale: PixelScale,
}

/// Why the optimizer stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// No candidate line had darkness left to consume
    Converged,
    /// The configured path budget was used up
    MaxPathsReached,
}

/// Snapshot handed to the progress callback at each iteration boundary
#[derive(Debug, Clone, Copy)]
pub struct OptimizerProgress {
    /// Edges committed so far
    pub iteration: usize,
    pub max_paths: usize,
    pub current_nail: usize,
    pub thread_length_mm: f64,
}

impl OptimizerProgress {
    /// Fraction of the path budget used, in [0.0, 1.0]
    pub fn fraction(&self) -> f32 {
        if self.max_paths == 0 {
            return 1.0;
        }
        self.iteration as f32 / self.max_paths as f32
    }
}

/// Result of an optimizer run
#[derive(Debug, Clone)]
pub struct OptimizationOutcome {
    pub paths: Vec<Edge>,
    pub thread_length_mm: f64,
    pub termination: Termination,
}

impl OptimizationOutcome {
    pub fn iterations(&self) -> usize {
        self.paths.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    nail: usize,
    weight: i64,
}

impl Candidate {
    /// Heavier line wins; equal weights go to the lower nail index
    fn better(a: Option<Candidate>, b: Option<Candidate>) -> Option<Candidate> {
        match (a, b) {
            (Some(x), Some(y)) => {
                if y.weight > x.weight || (y.weight == x.weight && y.nail < x.nail) {
                    Some(y)
                } else {
                    Some(x)
                }
            }
            (x, None) => x,
            (None, y) => y,
        }
    }
}

/// Greedy nail-to-nail path optimizer
pub struct GreedyPathOptimizer<'a> {
    cache: &'a LineGeometryCache,
    config: OptimizerConfig,
}

impl<'a> GreedyPathOptimizer<'a> {
    pub fn new(cache: &'a LineGeometryCache, config: OptimizerConfig) -> ThreadArtResult<Self> {
        let nails_quantity = cache.nails_quantity();
        if config.starting_nail >= nails_quantity {
            return Err(ThreadArtError::InvalidParameters(format!(
                "starting nail {} is out of range for {} nails",
                config.starting_nail, nails_quantity
            )));
        }
        if config.minimum_difference > nails_quantity / 2 {
            return Err(ThreadArtError::InvalidParameters(format!(
                "minimum difference {} leaves no eligible pair among {} nails",
                config.minimum_difference, nails_quantity
            )));
        }
        Ok(Self { cache, config })
    }

    /// Run to completion
    pub fn run(&self, canvas: &mut GrayImage) -> ThreadArtResult<OptimizationOutcome> {
        self.run_with_progress(canvas, |_| true)
    }

    /// Run with a progress callback.
    ///
    /// The callback is invoked before every iteration. If it returns `false`
    /// the run stops with [`ThreadArtError::Cancelled`].
    pub fn run_with_progress<F>(
        &self,
        canvas: &mut GrayImage,
        mut on_progress: F,
    ) -> ThreadArtResult<OptimizationOutcome>
    where
        F: FnMut(&OptimizerProgress) -> bool,
    {
        let size = self.cache.canvas_size();
        if canvas.dimensions() != (size, size) {
            let (width, height) = canvas.dimensions();
            return Err(ThreadArtError::InvalidParameters(format!(
                "canvas is {}x{} but the line cache was built for {}x{}",
                width, height, size, size
            )));
        }

        let mut current = self.config.starting_nail;
        let mut used: HashSet<(usize, usize)> = HashSet::new();
        let mut paths = Vec::new();
        let mut thread_length_mm = 0.0;
        let mut termination = Termination::MaxPathsReached;

        for iteration in 0..self.config.max_paths {
            let progress = OptimizerProgress {
                iteration,
                max_paths: self.config.max_paths,
                current_nail: current,
                thread_length_mm,
            };
            if !on_progress(&progress) {
                return Err(ThreadArtError::Cancelled { iteration });
            }

            let Some(best) = self.best_candidate(canvas, current, &used)? else {
                termination = Termination::Converged;
                break;
            };

            let line = self.line(current, best.nail)?;
            Self::brighten(canvas, line, self.config.brightness_increment);

            let edge = Edge::new(current, best.nail);
            used.insert(edge.canonical());
            thread_length_mm += self.config.scale.line_length_mm(line.len());
            trace!(iteration, edge = %edge, weight = best.weight, "Committed edge");

            paths.push(edge);
            current = best.nail;
        }

        debug!(
            edges = paths.len(),
            thread_length_mm,
            termination = ?termination,
            "Optimizer finished"
        );

        Ok(OptimizationOutcome {
            paths,
            thread_length_mm,
            termination,
        })
    }

    /// Score every eligible candidate from `current` and pick the best one
    fn best_candidate(
        &self,
        canvas: &GrayImage,
        current: usize,
        used: &HashSet<(usize, usize)>,
    ) -> ThreadArtResult<Option<Candidate>> {
        let nails_quantity = self.cache.nails_quantity();
        (0..nails_quantity)
            .into_par_iter()
            .filter(|&next| {
                is_eligible(current, next, nails_quantity, self.config.minimum_difference)
                    && !used.contains(&LineGeometryCache::canonical_pair(current, next))
            })
            .map(|next| -> ThreadArtResult<Option<Candidate>> {
                let weight = line_weight(canvas, self.line(current, next)?);
                Ok((weight > 0).then_some(Candidate { nail: next, weight }))
            })
            .try_reduce(|| None, |a, b| Ok(Candidate::better(a, b)))
    }

    fn line(&self, a: usize, b: usize) -> ThreadArtResult<&'a [Pixel]> {
        self.cache.line_between(a, b).ok_or_else(|| {
            ThreadArtError::InternalInconsistency(format!("no cached line for nails {}:{}", a, b))
        })
    }

    fn brighten(canvas: &mut GrayImage, line: &[Pixel], increment: u8) {
        for p in line {
            let pixel = canvas.get_pixel_mut(u32::from(p.x), u32::from(p.y));
            pixel.0[0] = pixel.0[0].saturating_add(increment);
        }
    }
}

/// Average darkness left along `line`: `(len * 255 - sum) / len`, integer division
pub fn line_weight(canvas: &GrayImage, line: &[Pixel]) -> i64 {
    if line.is_empty() {
        return 0;
    }
    let len = line.len() as i64;
    let sum: i64 = line
        .iter()
        .map(|p| i64::from(canvas.get_pixel(u32::from(p.x), u32::from(p.y)).0[0]))
        .sum();
    (len * 255 - sum) / len
}

/// Whether the thread may run directly between nails `a` and `b`
pub fn is_eligible(a: usize, b: usize, nails_quantity: usize, minimum_difference: usize) -> bool {
    a != b && circular_distance(a, b, nails_quantity) >= minimum_difference
}

/// Every unordered pair the minimum difference rule admits, in `(low, high)` order
pub fn eligible_pairs(nails_quantity: usize, minimum_difference: usize) -> Vec<(usize, usize)> {
    (0..nails_quantity)
        .flat_map(|i| ((i + 1)..nails_quantity).map(move |j| (i, j)))
        .filter(|&(i, j)| is_eligible(i, j, nails_quantity, minimum_difference))
        .collect()
}
