//! Renderer configuration
//!
//! Stored as RON (Rusty Object Notation) so it stays hand-editable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::rasterizer::{aspect_ratio, Scalar, DEFAULT_CLEAR_COLOR};

/// Largest accepted render target side in pixels
pub const MAX_DIMENSION: usize = 16384;

/// Error type for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Resolution, camera projection and presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Render target size in pixels
    pub width: usize,
    pub height: usize,
    /// Vertical field of view
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Background colour (0xAARRGGBB)
    pub clear_color: u32,
    /// Window size as a multiple of the render target
    pub window_scale: u32,
    pub fullscreen: bool,
}

/// Projection settings after conversion to fixed point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionParams {
    pub fov_y: Scalar,
    pub aspect: Scalar,
    pub near: Scalar,
    pub far: Scalar,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            fov_y_degrees: 90.0,
            near: 0.1,
            far: 100.0,
            clear_color: DEFAULT_CLEAR_COLOR,
            window_scale: 2,
            fullscreen: false,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(ConfigError::Invalid(format!(
                "resolution must be at most {}x{}, got {}x{}",
                MAX_DIMENSION, MAX_DIMENSION, self.width, self.height
            )));
        }
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "fov_y_degrees must be in (0, 180), got {}",
                self.fov_y_degrees
            )));
        }
        if !(self.near > 0.0) {
            return Err(ConfigError::Invalid(format!("near must be positive, got {}", self.near)));
        }
        if !(self.far > self.near) {
            return Err(ConfigError::Invalid(format!(
                "far ({}) must be greater than near ({})",
                self.far, self.near
            )));
        }
        if self.window_scale == 0 {
            return Err(ConfigError::Invalid("window_scale must be at least 1".to_string()));
        }

        // The projection divides by these after conversion, so check them
        // as the renderer will see them
        let params = self.projection_params();
        let half = params.fov_y / Scalar::from_int(2);
        if half.sin().is_zero() || half.cos().is_zero() {
            return Err(ConfigError::Invalid(format!(
                "fov_y_degrees {} is degenerate in fixed point",
                self.fov_y_degrees
            )));
        }
        if params.aspect.is_zero() {
            return Err(ConfigError::Invalid(format!(
                "aspect ratio of {}x{} rounds to zero",
                self.width, self.height
            )));
        }
        if params.near <= Scalar::ZERO {
            return Err(ConfigError::Invalid(format!("near {} rounds to zero", self.near)));
        }
        if params.far <= params.near {
            return Err(ConfigError::Invalid(format!(
                "near ({}) and far ({}) collapse to the same fixed-point value",
                self.near, self.far
            )));
        }
        Ok(())
    }

    /// Vertical field of view in radians
    pub fn fov_y_radians(&self) -> f32 {
        self.fov_y_degrees.to_radians()
    }

    pub fn projection_params(&self) -> ProjectionParams {
        ProjectionParams {
            fov_y: Scalar::from_f32(self.fov_y_radians()),
            aspect: aspect_ratio(self.width, self.height),
            near: Scalar::from_f32(self.near),
            far: Scalar::from_f32(self.far),
        }
    }
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    config_from_str(&contents)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &RenderConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(2)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Parse a config from a RON string. Missing fields take their defaults.
pub fn config_from_str(s: &str) -> Result<RenderConfig, ConfigError> {
    let config: RenderConfig = ron::from_str(s)?;
    config.validate()?;
    Ok(config)
}
