//! Configuration for the boids simulation: typed settings, file loading and validation.

use log::debug;
use std::fs;
use std::path::Path;
use thiserror::Error;

// Re-export types
pub use self::types::{
    Config, FileSenderConfig, FlockSettings, SenderConfig, SerializerConfig, SimulationConfig,
    SpatialIndexSettings, TransportConfig, WorldSettings,
};
mod types;

// Config error handling
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Unsupported config format: {0} (expected .json or .toml)")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation(message.into())
}

// Config loader implementation
pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads and parses a config file, picking the format from its extension.
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let config: Config = match extension.as_str() {
            "json" => serde_json::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        debug!("Parsed configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.framerate == 0 {
            return Err(invalid("Framerate must be greater than 0"));
        }

        if config.transport.output_frequency == 0 {
            return Err(invalid("Output frequency must be greater than 0"));
        }

        config.simulation.validate()
    }
}

/// Loads a config file and validates it.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = ConfigLoader::from_file(path)?;
    ConfigLoader::validate(&config)?;
    Ok(config)
}

impl SimulationConfig {
    /// Rejects degenerate settings before any flock is built from them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_parameters()?;
        self.validate_layout()
    }

    /// Checks everything except the initial grid layout: world extent, agent
    /// shape, update rule and spatial index tuning.
    pub fn validate_parameters(&self) -> Result<(), ConfigError> {
        let WorldSettings { width, height } = self.world;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(invalid(format!(
                "World dimensions must be positive, got {width} x {height}"
            )));
        }

        let flock = &self.flock;
        if !(flock.agent_radius.is_finite() && flock.agent_radius > 0.0) {
            return Err(invalid("Agent radius must be positive"));
        }
        if !(flock.initial_speed.is_finite() && flock.initial_speed >= 0.0) {
            return Err(invalid("Initial speed must be zero or positive"));
        }
        if !(flock.neighbor_distance.is_finite() && flock.neighbor_distance > 0.0) {
            return Err(invalid("Neighbor distance must be positive"));
        }
        if !(0.0..=1.0).contains(&flock.alignment_factor) {
            return Err(invalid("Alignment factor must lie in [0, 1]"));
        }

        if self.spatial_index.capacity == 0 {
            return Err(invalid("Spatial index capacity must be greater than 0"));
        }

        // Each level halves its parent; the deepest cells must keep a positive size.
        let max_depth = self.spatial_index.max_depth;
        let mut finest = width.min(height);
        for _ in 0..max_depth {
            finest /= 2.0;
            if finest <= 0.0 {
                return Err(invalid(format!(
                    "Spatial index depth {max_depth} is too deep for a {width} x {height} world"
                )));
            }
        }

        Ok(())
    }

    /// Checks that `agent_count` agents fit the initial grid.
    pub fn validate_layout(&self) -> Result<(), ConfigError> {
        let flock = &self.flock;
        if flock.agent_count == 0 {
            return Err(invalid("Agent count must be greater than 0"));
        }
        if u32::try_from(flock.agent_count).is_err() {
            return Err(invalid(format!(
                "Agent count must be at most {}, got {}",
                u32::MAX,
                flock.agent_count
            )));
        }
        if !(flock.grid_spacing.is_finite() && flock.grid_spacing > 0.0) {
            return Err(invalid("Grid spacing must be positive"));
        }

        let (columns, rows) = self.grid_dimensions();
        let slots = columns.checked_mul(rows).ok_or_else(|| {
            invalid(format!(
                "Layout grid of {columns} x {rows} points is too large (spacing {})",
                flock.grid_spacing
            ))
        })?;
        if flock.agent_count > slots {
            return Err(invalid(format!(
                "{} agents do not fit a {columns} x {rows} grid with spacing {}",
                flock.agent_count, flock.grid_spacing
            )));
        }

        Ok(())
    }

    /// Columns and rows of the initial layout grid. Grid points start at the
    /// origin and stay strictly inside the world.
    pub fn grid_dimensions(&self) -> (usize, usize) {
        let spacing = self.flock.grid_spacing;
        let columns = (self.world.width / spacing).ceil() as usize;
        let rows = (self.world.height / spacing).ceil() as usize;
        (columns, rows)
    }
}
