//! # ThreadKit
//!
//! Thread art path generation: converts a raster image into an ordered
//! sequence of straight thread segments strung between nails on a circular
//! frame, plus the G-code that winds it.
//!
//! ## Architecture
//!
//! ThreadKit is organized as a workspace with multiple crates:
//!
//! 1. **threadkit-core** - Nail, pixel and edge types, unit conversions
//! 2. **threadkit-settings** - Generation and machine configuration, JSON/TOML persistence
//! 3. **threadkit-camtools** - Preprocessing, nail layout, line cache, optimizer, encoders
//! 4. **threadkit** - This facade crate
//!
//! ## Usage
//!
//! ```no_run
//! use threadkit::{GenerationParameters, ThreadArtGenerator};
//!
//! let image = std::fs::read("portrait.png")?;
//! let result = ThreadArtGenerator::new(GenerationParameters::new(image))?.generate()?;
//! println!("{} lines, {} m of thread", result.total_lines, result.stats.thread_length_m);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use threadkit_core::{
    circular_distance, format_length, mm_to_whole_meters, Edge, MeasurementSystem, Nail, Pixel,
    PixelScale,
};

pub use threadkit_settings::{
    default_config_path, GenerationSettings, HoleDrillingSettings, MachineSettings,
    SettingsError, SettingsResult, ThreadArtConfig,
};

pub use threadkit_camtools::{
    eligible_pairs, GCodeGenerator, GenerationParameters, GenerationResult, GreedyPathOptimizer,
    HoleDrillingGenerator, ImagePreprocessor, LineGeometryCache, NailLayout, OptimizerConfig,
    OptimizerProgress, OutputStats, ParameterError, PathsImagePreview, StatsCalculator,
    Termination, ThreadArtError, ThreadArtGenerator, ThreadArtResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, multi-line
    #[default]
    Pretty,
    /// One JSON object per event, for log collectors
    Json,
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with(LogFormat::Pretty)
}

/// Initialize logging in the given format.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging_with(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_line_number(true)
                .pretty();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .json()
                .with_current_span(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert!(!VERSION.is_empty());
        assert!(BUILD_DATE.ends_with("UTC"));
    }

    #[test]
    fn test_second_init_fails() {
        let first = init_logging_with(LogFormat::Json);
        let second = init_logging();
        assert!(first.is_ok());
        assert!(second.is_err());
    }
}
