//! Engine configuration.
//!
//! The host passes configuration as a JSON string, the same way it passes
//! documents. Every field has a default, so `{}` is a complete config.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, HANDLE_RADIUS_PX, MIN_SCALE_FACTOR, ROTATE_INCREMENT_DEG,
};
use crate::error::ConfigError;
use crate::surface::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Screen-space hit radius for transform handles.
    pub handle_radius_px: f64,
    /// Snap step for the rotate tool while ctrl is held.
    pub rotate_increment_deg: f64,
    /// Smallest magnitude of a per-axis factor produced by the scale tool.
    pub min_scale_factor: f64,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background_color: String,
    pub handle_color: String,
    pub outline_color: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            handle_radius_px: HANDLE_RADIUS_PX,
            rotate_increment_deg: ROTATE_INCREMENT_DEG,
            min_scale_factor: MIN_SCALE_FACTOR,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            background_color: "#FFFFFF".to_owned(),
            handle_color: "#FFFFFF".to_owned(),
            outline_color: "#1E88E5".to_owned(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed JSON, [`ConfigError::Invalid`]
    /// when a value is out of range.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("handleRadiusPx", self.handle_radius_px)?;
        positive("rotateIncrementDeg", self.rotate_increment_deg)?;
        positive("minScaleFactor", self.min_scale_factor)?;
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "canvas size must be non-zero, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        for (key, value) in [
            ("backgroundColor", &self.background_color),
            ("handleColor", &self.handle_color),
            ("outlineColor", &self.outline_color),
        ] {
            if Color::from_hex(value).is_none() {
                return Err(ConfigError::Invalid(format!("{key} is not a hex color: {value:?}")));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn background(&self) -> Color {
        Color::from_hex(&self.background_color).unwrap_or(Color::WHITE)
    }

    #[must_use]
    pub fn handle_fill(&self) -> Color {
        Color::from_hex(&self.handle_color).unwrap_or(Color::WHITE)
    }

    #[must_use]
    pub fn outline(&self) -> Color {
        Color::from_hex(&self.outline_color).unwrap_or(Color::BLACK)
    }
}

fn positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{key} must be a positive number, got {value}")))
    }
}
