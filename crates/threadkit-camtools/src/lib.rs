//! # ThreadKit CAM Tools
//!
//! Turns a raster image into a thread art winding: an ordered list of
//! straight thread segments strung between nails on a circular frame, plus
//! the G-code that winds it.
//!
//! ## Pipeline
//!
//! - **Image Preprocessor**: grayscale, contrast, square crop, circular mask, resize
//! - **Nail Layout**: equally spaced nails on the canvas's inscribed circle
//! - **Line Cache**: Bresenham lines for every nail pair, built once per run
//! - **Path Optimizer**: greedy darkest-line selection with parallel scoring
//!
//! ## Outputs
//!
//! - **Preview**: simulated finished piece as a grayscale raster
//! - **Thread G-code**: winding program for the rotary frame machine
//! - **Hole Drilling**: frame drilling program, one hole per nail
//! - **Statistics**: line count, thread length and run time

pub mod error;
pub mod hole_drilling;
pub mod image_preprocessor;
pub mod line_cache;
pub mod nail_layout;
pub mod path_optimizer;
pub mod preview;
pub mod stats;
pub mod thread_art;
pub mod thread_gcode;

// Re-export commonly used items
pub use error::{ParameterError, ParameterResult, ThreadArtError, ThreadArtResult};
pub use hole_drilling::HoleDrillingGenerator;
pub use image_preprocessor::ImagePreprocessor;
pub use line_cache::LineGeometryCache;
pub use nail_layout::NailLayout;
pub use path_optimizer::{
    eligible_pairs, GreedyPathOptimizer, OptimizationOutcome, OptimizerConfig, OptimizerProgress,
    Termination,
};
pub use preview::{PathsImagePreview, PREVIEW_LINE_DECREMENT};
pub use stats::{OutputStats, StatsCalculator};
pub use thread_art::{GenerationParameters, GenerationResult, ThreadArtGenerator};
pub use thread_gcode::GCodeGenerator;
