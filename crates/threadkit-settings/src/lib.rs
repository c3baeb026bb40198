//! ThreadKit Settings Crate
//!
//! Handles generation and machine configuration, with JSON/TOML persistence.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, GenerationSettings, HoleDrillingSettings, MachineSettings,
    MeasurementSystem, ThreadArtConfig, CONFIG_FILE_NAME, CONTRAST_LIMIT,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
