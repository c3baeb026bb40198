//! Source Image Preprocessing
//!
//! Turns an arbitrary raster into the square, circularly masked grayscale
//! canvas the path optimizer works on. Steps run in a fixed order:
//! grayscale -> contrast -> center crop -> circular mask -> Lanczos resize.
//! Identical input and parameters always produce identical output.

use crate::error::{ThreadArtError, ThreadArtResult};
use image::{DynamicImage, GrayImage, Luma};
use std::path::Path;
use threadkit_core::Pixel;
use threadkit_settings::CONTRAST_LIMIT;
use tracing::{debug, warn};

/// Intensity written outside the inscribed circle
const MASK_VALUE: u8 = 255;

/// Converts source images into working canvases
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    contrast: f32,
    canvas_size: u32,
}

impl ImagePreprocessor {
    /// Create a preprocessor producing `canvas_size` x `canvas_size` canvases
    pub fn new(contrast: f32, canvas_size: u32) -> ThreadArtResult<Self> {
        if canvas_size == 0 {
            return Err(ThreadArtError::InvalidParameters(
                "canvas size must be > 0".to_string(),
            ));
        }
        if canvas_size > Pixel::MAX_CANVAS_SIZE {
            return Err(ThreadArtError::InvalidParameters(format!(
                "canvas size {} exceeds the supported maximum of {}",
                canvas_size,
                Pixel::MAX_CANVAS_SIZE
            )));
        }
        if !(-CONTRAST_LIMIT..=CONTRAST_LIMIT).contains(&contrast) {
            return Err(ThreadArtError::InvalidParameters(format!(
                "contrast {} is outside [-{1}, {1}]",
                contrast, CONTRAST_LIMIT
            )));
        }
        Ok(Self {
            contrast,
            canvas_size,
        })
    }

    pub fn canvas_size(&self) -> u32 {
        self.canvas_size
    }

    /// Load and preprocess an image file
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> ThreadArtResult<GrayImage> {
        let bytes = std::fs::read(path.as_ref())?;
        self.process_bytes(&bytes)
    }

    /// Decode and preprocess encoded image bytes (PNG, JPEG, ...)
    pub fn process_bytes(&self, bytes: &[u8]) -> ThreadArtResult<GrayImage> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| ThreadArtError::InvalidImage(e.to_string()))?;
        Ok(self.process_image(&img))
    }

    /// Preprocess an already decoded image
    pub fn process_image(&self, img: &DynamicImage) -> GrayImage {
        let gray = img.to_luma8();
        let contrasted = image::imageops::contrast(&gray, self.contrast);

        let mut square = Self::crop_to_square(contrasted);
        Self::mask_outside_circle(&mut square);

        // Lanczos3 for continuous tone images, same as the engraver pipeline
        let canvas = image::imageops::resize(
            &square,
            self.canvas_size,
            self.canvas_size,
            image::imageops::FilterType::Lanczos3,
        );

        debug!(
            source_width = img.width(),
            source_height = img.height(),
            canvas_size = self.canvas_size,
            "Preprocessed source image"
        );
        canvas
    }

    /// Center-crop to the largest square
    fn crop_to_square(image: GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        if width == height {
            return image;
        }

        warn!(width, height, "Source image is not square, cropping to center");
        let side = width.min(height);
        let x = (width - side) / 2;
        let y = (height - side) / 2;
        image::imageops::crop_imm(&image, x, y, side, side).to_image()
    }

    /// Paint everything outside the inscribed circle white
    fn mask_outside_circle(image: &mut GrayImage) {
        let mid = i64::from(image.width() / 2);
        let radius_sq = mid * mid;

        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let dx = i64::from(x) - mid;
            let dy = i64::from(y) - mid;
            if dx * dx + dy * dy > radius_sq {
                *pixel = Luma([MASK_VALUE]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value])))
    }

    #[test]
    fn test_rejects_zero_canvas() {
        let err = ImagePreprocessor::new(40.0, 0).unwrap_err();
        assert!(matches!(err, ThreadArtError::InvalidParameters(_)));
    }

    #[test]
    fn test_rejects_oversized_canvas() {
        assert!(ImagePreprocessor::new(40.0, Pixel::MAX_CANVAS_SIZE + 1).is_err());
        assert!(ImagePreprocessor::new(f32::NAN, 100).is_err());
    }

    #[test]
    fn test_contrast_range() {
        assert!(ImagePreprocessor::new(-100.0, 32).is_ok());
        assert!(ImagePreprocessor::new(100.0, 32).is_ok());

        let err = ImagePreprocessor::new(-300.0, 32).unwrap_err();
        assert!(matches!(err, ThreadArtError::InvalidParameters(_)));
        assert!(ImagePreprocessor::new(150.0, 32).is_err());
    }

    #[test]
    fn test_output_is_square_canvas() {
        let pre = ImagePreprocessor::new(40.0, 64).unwrap();
        let canvas = pre.process_image(&solid(200, 120, 0));
        assert_eq!(canvas.dimensions(), (64, 64));
    }

    #[test]
    fn test_corners_are_masked_white() {
        let pre = ImagePreprocessor::new(0.0, 100).unwrap();
        let canvas = pre.process_image(&solid(100, 100, 0));

        assert_eq!(canvas.get_pixel(0, 0).0[0], 255);
        assert_eq!(canvas.get_pixel(99, 99).0[0], 255);
        assert_eq!(canvas.get_pixel(50, 50).0[0], 0);
    }

    #[test]
    fn test_crop_to_square_keeps_center() {
        let mut wide = GrayImage::from_pixel(30, 10, Luma([255]));
        wide.put_pixel(15, 5, Luma([0]));

        let square = ImagePreprocessor::crop_to_square(wide);
        assert_eq!(square.dimensions(), (10, 10));
        assert_eq!(square.get_pixel(5, 5).0[0], 0);
    }

    #[test]
    fn test_mask_boundary() {
        let mut img = GrayImage::from_pixel(10, 10, Luma([0]));
        ImagePreprocessor::mask_outside_circle(&mut img);

        // mid = 5, radius^2 = 25
        assert_eq!(img.get_pixel(5, 0).0[0], 0);
        assert_eq!(img.get_pixel(0, 5).0[0], 0);
        assert_eq!(img.get_pixel(1, 1).0[0], 255);
        assert_eq!(img.get_pixel(9, 9).0[0], 255);
    }

    #[test]
    fn test_invalid_bytes() {
        let pre = ImagePreprocessor::new(40.0, 32).unwrap();
        let err = pre.process_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ThreadArtError::InvalidImage(_)));
    }

    #[test]
    fn test_deterministic_output() {
        let mut source = GrayImage::new(90, 70);
        for (x, y, pixel) in source.enumerate_pixels_mut() {
            *pixel = Luma([((x * 7 + y * 3) % 256) as u8]);
        }
        let source = DynamicImage::ImageLuma8(source);

        let pre = ImagePreprocessor::new(25.0, 48).unwrap();
        let a = pre.process_image(&source);
        let b = pre.process_image(&source);
        assert_eq!(a.as_raw(), b.as_raw());
    }
}
