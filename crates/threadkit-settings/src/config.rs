//! Configuration for thread art generation
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats, selected by file extension.
//!
//! Configuration is organized into logical sections:
//! - Generation settings (nail count, canvas size, optimizer tuning)
//! - Machine settings (axis names, feed rates, needle positions)
//! - Hole drilling settings (frame preparation program)

pub use threadkit_core::units::MeasurementSystem;

use crate::error::{ConfigError, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name used inside the platform config directory
pub const CONFIG_FILE_NAME: &str = "threadkit.toml";

/// Largest contrast adjustment magnitude, in percent either way
pub const CONTRAST_LIMIT: f32 = 100.0;

/// Optimizer and canvas settings for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Number of nails around the circle
    pub nails_quantity: u32,
    /// Side length of the working canvas in pixels
    pub canvas_size_px: u32,
    /// Maximum number of thread segments to generate
    pub max_paths: u32,
    /// Nail the thread starts from
    pub starting_nail: u32,
    /// Minimum circular index gap between consecutive nails
    pub minimum_difference: u32,
    /// Amount each drawn line brightens the working canvas
    pub brightness_increment: u8,
    /// Contrast adjustment applied before masking (image crate scale)
    pub image_contrast: f32,
    /// Physical radius of the frame in millimeters
    pub physical_radius_mm: f64,
    /// Abort the run once this many seconds have elapsed
    pub timeout_secs: Option<u64>,
    /// Render the preview raster
    pub render_preview: bool,
    /// Emit the thread winding G-code
    pub emit_gcode: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            nails_quantity: 300,
            canvas_size_px: 800,
            max_paths: 10_000,
            starting_nail: 0,
            minimum_difference: 10,
            brightness_increment: 50,
            image_contrast: 40.0,
            // 24 inches
            physical_radius_mm: 609.6,
            timeout_secs: None,
            render_preview: true,
            emit_gcode: true,
        }
    }
}

impl GenerationSettings {
    /// Validate generation settings
    pub fn validate(&self) -> SettingsResult<()> {
        if self.nails_quantity < 2 {
            return Err(SettingsError::invalid(
                "nails_quantity",
                "at least 2 nails are required",
            ));
        }
        if self.canvas_size_px == 0 {
            return Err(SettingsError::invalid("canvas_size_px", "must be > 0"));
        }
        if self.starting_nail >= self.nails_quantity {
            return Err(SettingsError::invalid(
                "starting_nail",
                format!("must be below nails_quantity ({})", self.nails_quantity),
            ));
        }
        if self.minimum_difference > self.nails_quantity / 2 {
            return Err(SettingsError::invalid(
                "minimum_difference",
                format!(
                    "must be at most half of nails_quantity ({})",
                    self.nails_quantity / 2
                ),
            ));
        }
        if !(-CONTRAST_LIMIT..=CONTRAST_LIMIT).contains(&self.image_contrast) {
            return Err(SettingsError::invalid(
                "image_contrast",
                format!("must be within [-{0}, {0}]", CONTRAST_LIMIT),
            ));
        }
        if !self.physical_radius_mm.is_finite() || self.physical_radius_mm <= 0.0 {
            return Err(SettingsError::invalid("physical_radius_mm", "must be > 0"));
        }
        if self.timeout_secs == Some(0) {
            return Err(SettingsError::invalid("timeout_secs", "must be > 0 when set"));
        }
        Ok(())
    }

    /// Merge caller overrides into these settings.
    ///
    /// Only positive values are taken from `overrides`; zero means "keep the
    /// current value". This makes a zero-initialized request fall back to the
    /// defaults field by field.
    pub fn merge(&mut self, overrides: &GenerationSettings) {
        if overrides.nails_quantity > 0 {
            self.nails_quantity = overrides.nails_quantity;
        }
        if overrides.canvas_size_px > 0 {
            self.canvas_size_px = overrides.canvas_size_px;
        }
        if overrides.max_paths > 0 {
            self.max_paths = overrides.max_paths;
        }
        if overrides.starting_nail > 0 {
            self.starting_nail = overrides.starting_nail;
        }
        if overrides.minimum_difference > 0 {
            self.minimum_difference = overrides.minimum_difference;
        }
        if overrides.brightness_increment > 0 {
            self.brightness_increment = overrides.brightness_increment;
        }
        if overrides.image_contrast > 0.0 {
            self.image_contrast = overrides.image_contrast;
        }
        if overrides.physical_radius_mm > 0.0 {
            self.physical_radius_mm = overrides.physical_radius_mm;
        }
        if overrides.timeout_secs.is_some() {
            self.timeout_secs = overrides.timeout_secs;
        }
        self.render_preview = overrides.render_preview;
        self.emit_gcode = overrides.emit_gcode;
    }
}

/// Thread winding machine settings used by the G-code encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Axis turning the frame, in nail units
    pub rotation_axis: String,
    /// Axis moving the thread needle in and out
    pub needle_axis: String,
    /// Axis driving the drill spindle
    pub spindle_axis: String,
    /// Feed rate for frame rotation between nails
    pub feed_rate: u32,
    /// Feed rate while wrapping the thread around a nail
    pub wrap_feed_rate: u32,
    /// Feed rate for needle moves
    pub needle_feed_rate: u32,
    /// Rotation past the nail center used to hook the thread (nail units)
    pub nail_offset: f64,
    /// Needle position while wrapping
    pub needle_retract: f64,
    /// Needle position while rotating between nails
    pub needle_engage: f64,
    /// Needle position after homing
    pub needle_home: f64,
    /// Units used for lengths in G-code comments
    pub display_units: MeasurementSystem,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            rotation_axis: "A".to_string(),
            needle_axis: "X".to_string(),
            spindle_axis: "Y".to_string(),
            feed_rate: 3000,
            wrap_feed_rate: 200,
            needle_feed_rate: 2000,
            nail_offset: 0.5,
            needle_retract: -10.0,
            needle_engage: 0.0,
            needle_home: 5.0,
            display_units: MeasurementSystem::Metric,
        }
    }
}

impl MachineSettings {
    /// Validate machine settings
    pub fn validate(&self) -> SettingsResult<()> {
        for (key, axis) in [
            ("rotation_axis", &self.rotation_axis),
            ("needle_axis", &self.needle_axis),
            ("spindle_axis", &self.spindle_axis),
        ] {
            if axis.len() != 1 || !axis.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(SettingsError::invalid(
                    key,
                    format!("'{}' is not a single axis letter", axis),
                ));
            }
        }
        if self.rotation_axis == self.needle_axis {
            return Err(SettingsError::invalid(
                "needle_axis",
                "must differ from rotation_axis",
            ));
        }
        if self.feed_rate == 0 || self.wrap_feed_rate == 0 || self.needle_feed_rate == 0 {
            return Err(SettingsError::invalid("feed_rate", "feed rates must be > 0"));
        }
        if !(0.0..1.0).contains(&self.nail_offset) {
            return Err(SettingsError::invalid(
                "nail_offset",
                "must be within [0, 1) nail units",
            ));
        }
        Ok(())
    }
}

/// Frame drilling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoleDrillingSettings {
    /// Feed rate for rotating to the next nail
    pub rotation_feed_rate: u32,
    /// Feed rate while drilling
    pub plunge_feed_rate: u32,
    /// Feed rate while retracting the drill
    pub retract_feed_rate: u32,
    /// Spindle axis position at full depth
    pub drill_depth: f64,
    /// Spindle axis position once retracted
    pub retract_position: f64,
}

impl Default for HoleDrillingSettings {
    fn default() -> Self {
        Self {
            rotation_feed_rate: 200,
            plunge_feed_rate: 170,
            retract_feed_rate: 1000,
            drill_depth: -3.20,
            retract_position: -0.5,
        }
    }
}

impl HoleDrillingSettings {
    /// Validate drilling settings
    pub fn validate(&self) -> SettingsResult<()> {
        if self.rotation_feed_rate == 0 || self.plunge_feed_rate == 0 || self.retract_feed_rate == 0
        {
            return Err(SettingsError::invalid(
                "drilling",
                "feed rates must be > 0",
            ));
        }
        if self.drill_depth >= self.retract_position {
            return Err(SettingsError::invalid(
                "drill_depth",
                "must be below retract_position",
            ));
        }
        Ok(())
    }
}

/// Complete thread art configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadArtConfig {
    /// Generation settings
    pub generation: GenerationSettings,
    /// Machine settings
    pub machine: MachineSettings,
    /// Frame drilling settings
    pub drilling: HoleDrillingSettings,
}

impl ThreadArtConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!(path = %path.display(), "Loaded thread art config");
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Saved thread art config");
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.generation.validate()?;
        self.machine.validate()?;
        self.drilling.validate()?;
        Ok(())
    }
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )
            .into()),
        }
    }
}

/// Default location of the config file in the platform config directory
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("threadkit").join(CONFIG_FILE_NAME))
        .ok_or_else(|| {
            ConfigError::UnsupportedPlatform("no config directory available".to_string()).into()
        })
}
