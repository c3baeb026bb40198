//! Unit conversion utilities
//!
//! Converts canvas pixel measurements into physical frame dimensions and
//! formats lengths for Metric (mm) and Imperial (inch) display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MM_PER_INCH: f64 = 25.4;
const MM_PER_METER: f64 = 1000.0;

/// Measurement system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Metric system (mm)
    #[default]
    Metric,
    /// Imperial system (inches)
    Imperial,
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "mm" => Ok(Self::Metric),
            "imperial" | "inch" | "in" => Ok(Self::Imperial),
            _ => Err(format!("Unknown measurement system: {}", s)),
        }
    }
}

impl MeasurementSystem {
    /// Unit label for the system ("mm" or "in")
    pub fn unit_label(&self) -> &'static str {
        match self {
            Self::Metric => "mm",
            Self::Imperial => "in",
        }
    }
}

/// Format length value for display
///
/// * `value_mm` - Value in millimeters
/// * `system` - Target measurement system
pub fn format_length(value_mm: f64, system: MeasurementSystem) -> String {
    match system {
        MeasurementSystem::Metric => format!("{:.3}", value_mm),
        MeasurementSystem::Imperial => format!("{:.3}", value_mm / MM_PER_INCH),
    }
}

/// Convert millimeters to whole meters, truncating toward zero.
pub fn mm_to_whole_meters(value_mm: f64) -> u64 {
    if value_mm <= 0.0 {
        return 0;
    }
    (value_mm / MM_PER_METER).floor() as u64
}

/// Physical size of one canvas pixel.
///
/// The frame's physical radius is spread over the canvas side length, so
/// `mm_per_pixel = physical_radius_mm / canvas_size_px`. Thread length
/// accounting and G-code coordinates must both go through this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale {
    mm_per_pixel: f64,
}

impl PixelScale {
    /// Build the scale for a frame of `physical_radius_mm` drawn on a
    /// `canvas_size_px` square canvas. Returns `None` for a zero canvas or a
    /// non-positive radius.
    pub fn from_radius(physical_radius_mm: f64, canvas_size_px: u32) -> Option<Self> {
        if canvas_size_px == 0 || !physical_radius_mm.is_finite() || physical_radius_mm <= 0.0 {
            return None;
        }
        Some(Self {
            mm_per_pixel: physical_radius_mm / canvas_size_px as f64,
        })
    }

    pub fn mm_per_pixel(&self) -> f64 {
        self.mm_per_pixel
    }

    /// Physical length of a rasterized line made of `pixel_count` pixels.
    pub fn line_length_mm(&self, pixel_count: usize) -> f64 {
        pixel_count as f64 * self.mm_per_pixel
    }

    /// Physical offset of a pixel coordinate from the canvas origin.
    pub fn to_mm(&self, pixels: f64) -> f64 {
        pixels * self.mm_per_pixel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_formatting() {
        assert_eq!(format_length(10.5, MeasurementSystem::Metric), "10.500");
    }

    #[test]
    fn test_imperial_formatting() {
        assert_eq!(format_length(25.4, MeasurementSystem::Imperial), "1.000");
        assert_eq!(format_length(12.7, MeasurementSystem::Imperial), "0.500");
    }

    #[test]
    fn test_system_parsing() {
        assert_eq!("mm".parse::<MeasurementSystem>(), Ok(MeasurementSystem::Metric));
        assert_eq!("Inch".parse::<MeasurementSystem>(), Ok(MeasurementSystem::Imperial));
        assert!("furlong".parse::<MeasurementSystem>().is_err());
        assert_eq!(MeasurementSystem::Imperial.unit_label(), "in");
    }

    #[test]
    fn test_whole_meters() {
        assert_eq!(mm_to_whole_meters(0.0), 0);
        assert_eq!(mm_to_whole_meters(999.9), 0);
        assert_eq!(mm_to_whole_meters(1000.0), 1);
        assert_eq!(mm_to_whole_meters(12_345.0), 12);
        assert_eq!(mm_to_whole_meters(-5.0), 0);
    }

    #[test]
    fn test_pixel_scale() {
        let scale = PixelScale::from_radius(609.6, 800).unwrap();
        assert!((scale.mm_per_pixel() - 0.762).abs() < 1e-12);
        assert!((scale.line_length_mm(100) - 76.2).abs() < 1e-9);
        assert!((scale.to_mm(10.0) - 7.62).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_scale_rejects_degenerate_input() {
        assert!(PixelScale::from_radius(609.6, 0).is_none());
        assert!(PixelScale::from_radius(0.0, 800).is_none());
        assert!(PixelScale::from_radius(f64::NAN, 800).is_none());
    }
}
