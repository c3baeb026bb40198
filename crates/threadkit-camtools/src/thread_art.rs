//! Thread Art Generator
//!
//! Runs one generation end to end: preprocess the source image, lay out the
//! nails, build the line cache, optimize the path, then encode the outputs.
//! Every piece of state is created here and dropped when the call returns.

use crate::error::{ParameterError, ThreadArtError, ThreadArtResult};
use crate::image_preprocessor::ImagePreprocessor;
use crate::line_cache::LineGeometryCache;
use crate::nail_layout::NailLayout;
use crate::path_optimizer::{
    GreedyPathOptimizer, OptimizerConfig, OptimizerProgress, Termination,
};
use crate::preview::PathsImagePreview;
use crate::stats::{OutputStats, StatsCalculator};
use crate::thread_gcode::GCodeGenerator;
use image::GrayImage;
use std::time::{Duration, Instant};
use threadkit_core::{Edge, Nail, Pixel, PixelScale};
use threadkit_settings::{GenerationSettings, MachineSettings, CONTRAST_LIMIT};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// Everything a single generation call needs
#[derive(Debug, Clone)]
pub struct GenerationParameters {
    /// Number of nails around the frame
    pub nails_quantity: usize,
    /// Working canvas side length in pixels
    pub canvas_size_px: u32,
    /// Upper bound on generated edges
    pub max_paths: usize,
    pub starting_nail: usize,
    /// Minimum circular index gap between consecutive nails
    pub minimum_difference: usize,
    /// Brightness each committed line adds to the working canvas
    pub brightness_increment: u8,
    pub image_contrast: f32,
    /// Physical frame radius in millimeters
    pub physical_radius_mm: f64,
    /// Encoded source image (PNG, JPEG, ...)
    pub source_image: Vec<u8>,
    /// Abort with `Cancelled` once this much wall-clock time has passed
    pub timeout: Option<Duration>,
    pub render_preview: bool,
    pub emit_gcode: bool,
    /// Machine description for the G-code encoder
    pub machine: MachineSettings,
}

impl GenerationParameters {
    /// Default parameters for `source_image`
    pub fn new(source_image: Vec<u8>) -> Self {
        let settings = GenerationSettings::default();
        Self::from_parts(&settings, MachineSettings::default(), source_image)
    }

    /// Build parameters from persisted settings
    pub fn from_settings(
        settings: &GenerationSettings,
        machine: &MachineSettings,
        source_image: Vec<u8>,
    ) -> ThreadArtResult<Self> {
        settings.validate()?;
        machine.validate()?;
        Ok(Self::from_parts(settings, machine.clone(), source_image))
    }

    fn from_parts(
        settings: &GenerationSettings,
        machine: MachineSettings,
        source_image: Vec<u8>,
    ) -> Self {
        Self {
            nails_quantity: settings.nails_quantity as usize,
            canvas_size_px: settings.canvas_size_px,
            max_paths: settings.max_paths as usize,
            starting_nail: settings.starting_nail as usize,
            minimum_difference: settings.minimum_difference as usize,
            brightness_increment: settings.brightness_increment,
            image_contrast: settings.image_contrast,
            physical_radius_mm: settings.physical_radius_mm,
            source_image,
            timeout: settings.timeout_secs.map(Duration::from_secs),
            render_preview: settings.render_preview,
            emit_gcode: settings.emit_gcode,
            machine,
        }
    }

    /// Validate before any work starts
    pub fn validate(&self) -> ThreadArtResult<()> {
        if self.nails_quantity < 2 {
            return Err(ThreadArtError::InvalidParameters(format!(
                "at least 2 nails are required, got {}",
                self.nails_quantity
            )));
        }
        if self.canvas_size_px == 0 {
            return Err(ThreadArtError::InvalidParameters(
                "canvas size must be > 0".to_string(),
            ));
        }
        if self.canvas_size_px > Pixel::MAX_CANVAS_SIZE {
            return Err(ParameterError::OutOfRange {
                name: "canvas_size_px".to_string(),
                value: f64::from(self.canvas_size_px),
                min: 1.0,
                max: f64::from(Pixel::MAX_CANVAS_SIZE),
            }
            .into());
        }
        if self.max_paths == 0 {
            return Err(ThreadArtError::InvalidParameters(
                "max paths must be > 0".to_string(),
            ));
        }
        if self.starting_nail >= self.nails_quantity {
            return Err(ParameterError::OutOfRange {
                name: "starting_nail".to_string(),
                value: self.starting_nail as f64,
                min: 0.0,
                max: (self.nails_quantity - 1) as f64,
            }
            .into());
        }
        if self.minimum_difference > self.nails_quantity / 2 {
            return Err(ThreadArtError::InvalidParameters(format!(
                "minimum difference {} leaves no eligible pair among {} nails",
                self.minimum_difference, self.nails_quantity
            )));
        }
        if self.brightness_increment == 0 {
            return Err(ParameterError::InvalidValue {
                name: "brightness_increment".to_string(),
                reason: "must be > 0".to_string(),
            }
            .into());
        }
        if !(-CONTRAST_LIMIT..=CONTRAST_LIMIT).contains(&self.image_contrast) {
            return Err(ParameterError::OutOfRange {
                name: "image_contrast".to_string(),
                value: f64::from(self.image_contrast),
                min: f64::from(-CONTRAST_LIMIT),
                max: f64::from(CONTRAST_LIMIT),
            }
            .into());
        }
        if !self.physical_radius_mm.is_finite() || self.physical_radius_mm <= 0.0 {
            return Err(ParameterError::InvalidValue {
                name: "physical_radius_mm".to_string(),
                reason: "must be > 0".to_string(),
            }
            .into());
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ParameterError::InvalidValue {
                name: "timeout".to_string(),
                reason: "must be > 0 when set".to_string(),
            }
            .into());
        }
        if self.source_image.is_empty() {
            return Err(ThreadArtError::InvalidImage("source image is empty".to_string()));
        }
        if self.emit_gcode {
            self.machine.validate()?;
        }
        Ok(())
    }

    fn pixel_scale(&self) -> ThreadArtResult<PixelScale> {
        PixelScale::from_radius(self.physical_radius_mm, self.canvas_size_px).ok_or_else(|| {
            ParameterError::Incompatible(format!(
                "radius {} mm cannot be spread over a {} px canvas",
                self.physical_radius_mm, self.canvas_size_px
            ))
            .into()
        })
    }
}

/// Output of one generation call
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Identifier of this run, also attached to its log span
    pub run_id: Uuid,
    /// Edges in winding order
    pub paths: Vec<Edge>,
    pub nails: Vec<Nail>,
    pub thread_length_mm: f64,
    pub total_lines: usize,
    pub elapsed: Duration,
    pub termination: Termination,
    pub stats: OutputStats,
    pub preview: Option<GrayImage>,
    pub gcode: Option<Vec<String>>,
}

impl GenerationResult {
    /// Preview encoded as PNG, if one was rendered
    pub fn preview_png(&self) -> ThreadArtResult<Option<Vec<u8>>> {
        self.preview
            .as_ref()
            .map(PathsImagePreview::encode_png)
            .transpose()
    }

    /// G-code as one newline-terminated text, if it was emitted
    pub fn gcode_text(&self) -> Option<String> {
        self.gcode.as_ref().map(|lines| {
            let mut text = lines.join("\n");
            text.push('\n');
            text
        })
    }
}

/// Thread art generation entry point
pub struct ThreadArtGenerator {
    params: GenerationParameters,
    scale: PixelScale,
}

impl ThreadArtGenerator {
    pub fn new(params: GenerationParameters) -> ThreadArtResult<Self> {
        params.validate()?;
        let scale = params.pixel_scale()?;
        Ok(Self { params, scale })
    }

    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    /// Generate synchronously, honouring the configured timeout only
    pub fn generate(&self) -> ThreadArtResult<GenerationResult> {
        self.generate_with_progress(|_| true)
    }

    /// Generate with a progress callback.
    ///
    /// `on_progress` runs at every optimizer iteration boundary; returning
    /// `false` cancels the run. The configured timeout is checked at the same
    /// boundaries.
    pub fn generate_with_progress<F>(&self, mut on_progress: F) -> ThreadArtResult<GenerationResult>
    where
        F: FnMut(&OptimizerProgress) -> bool,
    {
        let p = &self.params;
        let run_id = Uuid::new_v4();
        let span = info_span!("thread_art", %run_id);
        let _guard = span.enter();

        let started = Instant::now();
        let deadline = p.timeout.map(|timeout| started + timeout);
        info!(
            nails = p.nails_quantity,
            canvas_size = p.canvas_size_px,
            max_paths = p.max_paths,
            "Starting thread art generation"
        );

        let preprocessor = ImagePreprocessor::new(p.image_contrast, p.canvas_size_px)?;
        let mut canvas = preprocessor.process_bytes(&p.source_image)?;

        let layout = NailLayout::generate(p.nails_quantity, p.canvas_size_px)?;
        let cache = LineGeometryCache::build(layout.nails(), p.canvas_size_px)?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            pairs = cache.pair_count(),
            "Geometry ready"
        );

        let optimizer = GreedyPathOptimizer::new(
            &cache,
            OptimizerConfig {
                max_paths: p.max_paths,
                starting_nail: p.starting_nail,
                minimum_difference: p.minimum_difference,
                brightness_increment: p.brightness_increment,
                scale: self.scale,
            },
        )?;

        let outcome = optimizer.run_with_progress(&mut canvas, |progress| {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(
                    iteration = progress.iteration,
                    "Generation timed out, cancelling"
                );
                return false;
            }
            on_progress(progress)
        })?;

        if outcome.termination == Termination::Converged {
            info!(
                edges = outcome.iterations(),
                "No candidate line left to draw, stopping early"
            );
        }

        let preview = if p.render_preview {
            Some(PathsImagePreview::render(
                &cache,
                &outcome.paths,
                p.canvas_size_px,
            )?)
        } else {
            None
        };

        let gcode = if p.emit_gcode {
            let generator =
                GCodeGenerator::new(p.machine.clone(), layout.nails().to_vec(), self.scale);
            Some(generator.generate_lines(&outcome.paths, &cache)?)
        } else {
            None
        };

        let elapsed = started.elapsed();
        let stats = StatsCalculator::calculate(&outcome.paths, outcome.thread_length_mm, elapsed);
        info!(
            edges = stats.total_lines,
            thread_length_m = stats.thread_length_m,
            termination = ?outcome.termination,
            elapsed_ms = elapsed.as_millis() as u64,
            "Thread art generation finished"
        );

        Ok(GenerationResult {
            run_id,
            total_lines: outcome.paths.len(),
            paths: outcome.paths,
            nails: layout.nails().to_vec(),
            thread_length_mm: outcome.thread_length_mm,
            elapsed,
            termination: outcome.termination,
            stats,
            preview,
            gcode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Luma};
    use std::io::Cursor;

    fn png(size: u32, value: u8) -> Vec<u8> {
        let img = GrayImage::from_pixel(size, size, Luma([value]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn small_params(value: u8) -> GenerationParameters {
        GenerationParameters {
            nails_quantity: 40,
            canvas_size_px: 100,
            max_paths: 20,
            minimum_difference: 5,
            ..GenerationParameters::new(png(64, value))
        }
    }

    #[test]
    fn test_defaults_follow_settings() {
        let params = GenerationParameters::new(vec![1]);
        assert_eq!(params.nails_quantity, 300);
        assert_eq!(params.canvas_size_px, 800);
        assert_eq!(params.max_paths, 10_000);
        assert_eq!(params.minimum_difference, 10);
        assert_eq!(params.brightness_increment, 50);
        assert!(params.timeout.is_none());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let base = small_params(0);

        let mut p = base.clone();
        p.nails_quantity = 1;
        assert!(p.validate().unwrap_err().is_invalid_parameters());

        let mut p = base.clone();
        p.canvas_size_px = 0;
        assert!(p.validate().unwrap_err().is_invalid_parameters());

        let mut p = base.clone();
        p.max_paths = 0;
        assert!(p.validate().unwrap_err().is_invalid_parameters());

        let mut p = base.clone();
        p.starting_nail = 40;
        assert!(p.validate().unwrap_err().is_invalid_parameters());

        let mut p = base.clone();
        p.minimum_difference = 21;
        assert!(p.validate().unwrap_err().is_invalid_parameters());

        let mut p = base.clone();
        p.image_contrast = -300.0;
        assert!(p.validate().unwrap_err().is_invalid_parameters());

        let mut p = base.clone();
        p.timeout = Some(Duration::ZERO);
        assert!(p.validate().unwrap_err().is_invalid_parameters());

        let mut p = base;
        p.source_image.clear();
        assert!(matches!(
            p.validate().unwrap_err(),
            ThreadArtError::InvalidImage(_)
        ));
    }

    #[test]
    fn test_machine_checked_only_when_emitting_gcode() {
        let mut p = small_params(0);
        p.machine.rotation_axis = "a1".to_string();
        assert!(matches!(
            p.validate().unwrap_err(),
            ThreadArtError::Settings(_)
        ));

        p.emit_gcode = false;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_undecodable_image_fails_before_optimizing() {
        let mut p = small_params(0);
        p.source_image = b"not an image".to_vec();
        let generator = ThreadArtGenerator::new(p).unwrap();

        let mut called = false;
        let err = generator
            .generate_with_progress(|_| {
                called = true;
                true
            })
            .unwrap_err();
        assert!(matches!(err, ThreadArtError::InvalidImage(_)));
        assert!(!called);
    }

    #[test]
    fn test_generate_fills_result() {
        let generator = ThreadArtGenerator::new(small_params(0)).unwrap();
        let result = generator.generate().unwrap();

        assert_eq!(result.total_lines, 20);
        assert_eq!(result.paths.len(), 20);
        assert_eq!(result.nails.len(), 40);
        assert_eq!(result.termination, Termination::MaxPathsReached);
        assert_eq!(result.stats.total_lines, 20);
        assert!(result.thread_length_mm > 0.0);
        assert_eq!(result.preview.as_ref().map(|p| p.width()), Some(100));

        let gcode = result.gcode.as_ref().unwrap();
        assert_eq!(gcode[0], "G28 X5 Y0 A0");
        assert!(result.gcode_text().unwrap().ends_with("Engage needle\n"));
        assert!(!result.preview_png().unwrap().unwrap().is_empty());
    }

    #[test]
    fn test_optional_outputs_skipped() {
        let mut p = small_params(0);
        p.render_preview = false;
        p.emit_gcode = false;
        let result = ThreadArtGenerator::new(p).unwrap().generate().unwrap();

        assert!(result.preview.is_none());
        assert!(result.gcode.is_none());
        assert!(result.preview_png().unwrap().is_none());
        assert!(result.gcode_text().is_none());
    }

    #[test]
    fn test_caller_cancellation() {
        let generator = ThreadArtGenerator::new(small_params(0)).unwrap();
        let err = generator
            .generate_with_progress(|p| p.iteration < 3)
            .unwrap_err();
        assert!(matches!(err, ThreadArtError::Cancelled { iteration: 3 }));
    }

    #[test]
    fn test_run_ids_are_unique() {
        let generator = ThreadArtGenerator::new(small_params(255)).unwrap();
        let a = generator.generate().unwrap();
        let b = generator.generate().unwrap();
        assert_ne!(a.run_id, b.run_id);
        assert_eq!(a.termination, Termination::Converged);
    }
}
