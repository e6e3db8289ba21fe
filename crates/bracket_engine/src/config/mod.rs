//! # Configuration System
//!
//! Serializable configuration for the loop clocks, the physics world, asset
//! resolution and logging. Any type implementing [`Config`] can be loaded from
//! and saved to TOML or RON files.

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Slowest clock rate accepted for either loop clock
pub const MIN_RATE_HZ: f32 = 1.0;

/// Engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Loop clock rates
    #[serde(rename = "loop")]
    pub loop_rates: LoopConfig,

    /// Physics world settings
    pub physics: PhysicsConfig,

    /// Asset resolution settings
    pub assets: AssetConfig,

    /// Logging settings
    pub logging: LogConfig,
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fixed_hz = self.loop_rates.fixed_hz;
        if !(fixed_hz.is_finite() && fixed_hz >= MIN_RATE_HZ) {
            return Err(ConfigError::Invalid(format!(
                "fixed_hz must be at least {MIN_RATE_HZ}, got {fixed_hz}"
            )));
        }
        let target_fps = self.loop_rates.target_fps;
        if !(target_fps.is_finite() && (target_fps == 0.0 || target_fps >= MIN_RATE_HZ)) {
            return Err(ConfigError::Invalid(format!(
                "target_fps must be 0 or at least {MIN_RATE_HZ}, got {target_fps}"
            )));
        }
        if self.physics.solver_iterations == 0 {
            return Err(ConfigError::Invalid("solver_iterations must be at least 1".to_string()));
        }
        if self.assets.fallback_texture.is_empty() {
            return Err(ConfigError::Invalid("fallback_texture cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Rates of the two loop clocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Fixed-rate clock frequency in Hz
    pub fixed_hz: f32,

    /// Presentation refresh rate in Hz (0 = as fast as possible)
    pub target_fps: f32,
}

impl LoopConfig {
    /// Length of one fixed step in seconds
    pub fn fixed_timestep(&self) -> f32 {
        1.0 / self.fixed_hz
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            fixed_hz: 60.0,
            target_fps: 60.0,
        }
    }
}

/// Physics world settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// World gravity in m/s^2
    pub gravity: [f32; 3],

    /// Contact solver iterations per step
    pub solver_iterations: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.82, 0.0],
            solver_iterations: 8,
        }
    }
}

/// Asset system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Asset search paths, tried in order before the path as given
    pub search_paths: Vec<String>,

    /// Texture loaded when a requested texture fails
    pub fallback_texture: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            search_paths: vec!["resources".to_string()],
            fallback_texture: "Textures/Required/None.png".to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
