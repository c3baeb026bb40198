//! Preview rendering for generated thread paths.

use crate::error::{ThreadArtError, ThreadArtResult};
use crate::line_cache::LineGeometryCache;
use image::{GrayImage, ImageFormat, Luma};
use std::io::Cursor;
use threadkit_core::Edge;

/// Darkness each thread pass adds to the preview
pub const PREVIEW_LINE_DECREMENT: u8 = 20;

/// Renders an approximation of the finished piece
pub struct PathsImagePreview;

impl PathsImagePreview {
    /// Draw `paths` onto a white `canvas_size` raster
    pub fn render(
        cache: &LineGeometryCache,
        paths: &[Edge],
        canvas_size: u32,
    ) -> ThreadArtResult<GrayImage> {
        let mut preview = GrayImage::from_pixel(canvas_size, canvas_size, Luma([255]));

        for edge in paths {
            let line = cache
                .line_between(edge.starting_nail, edge.ending_nail)
                .ok_or_else(|| {
                    ThreadArtError::InternalInconsistency(format!(
                        "no cached line for edge {}",
                        edge
                    ))
                })?;
            for p in line {
                let (x, y) = (u32::from(p.x), u32::from(p.y));
                if x >= canvas_size || y >= canvas_size {
                    return Err(ThreadArtError::InvalidParameters(format!(
                        "preview canvas {} is smaller than the cached geometry",
                        canvas_size
                    )));
                }
                let pixel = preview.get_pixel_mut(x, y);
                pixel.0[0] = pixel.0[0].saturating_sub(PREVIEW_LINE_DECREMENT);
            }
        }

        Ok(preview)
    }

    /// Encode a preview as PNG bytes
    pub fn encode_png(image: &GrayImage) -> ThreadArtResult<Vec<u8>> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| ThreadArtError::ImageEncoding(e.to_string()))?;
        Ok(bytes)
    }
}
