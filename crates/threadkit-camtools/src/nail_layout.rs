//! Nail layout on the circular frame.
//!
//! Nail `i` sits at angle `2*pi*i/N`, measured from the +X axis toward +Y
//! (clockwise on screen, since canvas rows grow downward).

use crate::error::{ThreadArtError, ThreadArtResult};
use std::f64::consts::TAU;
use threadkit_core::Nail;

/// Ordered nails on the canvas's inscribed circle
#[derive(Debug, Clone)]
pub struct NailLayout {
    nails: Vec<Nail>,
    canvas_size: u32,
}

impl NailLayout {
    /// Place `nails_quantity` equally spaced nails on a `canvas_size` canvas.
    ///
    /// The circle is centred on the middle pixel with radius `(size - 1) / 2`
    /// so every nail, after rounding, lands on a valid pixel.
    pub fn generate(nails_quantity: usize, canvas_size: u32) -> ThreadArtResult<Self> {
        if nails_quantity < 2 {
            return Err(ThreadArtError::InvalidParameters(format!(
                "at least 2 nails are required, got {}",
                nails_quantity
            )));
        }
        if canvas_size == 0 {
            return Err(ThreadArtError::InvalidParameters(
                "canvas size must be > 0".to_string(),
            ));
        }

        let center = Self::center_for(canvas_size);
        let radius = center;
        let nails = (0..nails_quantity)
            .map(|i| {
                let alpha = Self::angle_for(i, nails_quantity);
                Nail::new(
                    (center + radius * alpha.cos()).round() as i32,
                    (center + radius * alpha.sin()).round() as i32,
                )
            })
            .collect();

        Ok(Self { nails, canvas_size })
    }

    /// Angle of nail `index` in radians
    pub fn angle_for(index: usize, nails_quantity: usize) -> f64 {
        index as f64 * TAU / nails_quantity as f64
    }

    fn center_for(canvas_size: u32) -> f64 {
        (f64::from(canvas_size) - 1.0) / 2.0
    }

    pub fn angle(&self, index: usize) -> f64 {
        Self::angle_for(index, self.nails.len())
    }

    pub fn nails(&self) -> &[Nail] {
        &self.nails
    }

    pub fn get(&self, index: usize) -> Option<Nail> {
        self.nails.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.nails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nails.is_empty()
    }

    pub fn canvas_size(&self) -> u32 {
        self.canvas_size
    }

    /// Circle center in pixel coordinates
    pub fn center(&self) -> (f64, f64) {
        let c = Self::center_for(self.canvas_size);
        (c, c)
    }

    /// Circle radius in pixels
    pub fn radius(&self) -> f64 {
        Self::center_for(self.canvas_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consecutive_angles() {
        for n in [2usize, 3, 7, 150, 300, 1024] {
            let layout = NailLayout::generate(n, 400).unwrap();
            let step = TAU / n as f64;
            for i in 1..n {
                let diff = layout.angle(i) - layout.angle(i - 1);
                assert!((diff - step).abs() < 1e-9, "n={} i={}", n, i);
            }
        }
    }

    #[test]
    fn test_nails_inside_canvas() {
        for size in [1u32, 2, 51, 800] {
            let layout = NailLayout::generate(300, size).unwrap();
            for nail in layout.nails() {
                assert!(nail.x >= 0 && nail.x < size as i32, "{} on {}", nail, size);
                assert!(nail.y >= 0 && nail.y < size as i32, "{} on {}", nail, size);
            }
        }
    }

    #[test]
    fn test_cardinal_positions() {
        let layout = NailLayout::generate(4, 101).unwrap();
        assert_eq!(layout.get(0), Some(Nail::new(100, 50)));
        assert_eq!(layout.get(1), Some(Nail::new(50, 100)));
        assert_eq!(layout.get(2), Some(Nail::new(0, 50)));
        assert_eq!(layout.get(3), Some(Nail::new(50, 0)));
        assert_eq!(layout.get(4), None);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(NailLayout::generate(1, 100).is_err());
        assert!(NailLayout::generate(10, 0).is_err());
    }
}
