//! Simulation configuration
//!
//! Every tuned constant lives here with its shipped default. Files may be
//! written in RON or JSON; missing fields fall back to the defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::motion::MotionConfig;
use crate::nav::NavigationConfig;
use crate::sync::{InterpolationConfig, ReportingConfig};

/// Complete tuning for one simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid, oracle and clearance
    pub navigation: NavigationConfig,
    /// Local avatar movement
    pub motion: MotionConfig,
    /// Remote minion smoothing
    pub interpolation: InterpolationConfig,
    /// Outgoing position reports
    pub reporting: ReportingConfig,
}

impl SimulationConfig {
    /// Replace the navigation settings
    #[must_use]
    pub fn with_navigation(mut self, navigation: NavigationConfig) -> Self {
        self.navigation = navigation;
        self
    }

    /// Replace the motion settings
    #[must_use]
    pub fn with_motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    /// Replace the interpolation settings
    #[must_use]
    pub fn with_interpolation(mut self, interpolation: InterpolationConfig) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Replace the reporting settings
    #[must_use]
    pub fn with_reporting(mut self, reporting: ReportingConfig) -> Self {
        self.reporting = reporting;
        self
    }

    /// Set the avatar speed
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.motion.speed = speed;
        self
    }

    /// Set the agent clearance radius
    #[must_use]
    pub fn with_clearance(mut self, clearance: f32) -> Self {
        self.navigation.agent_clearance = clearance;
        self
    }

    /// Check that the values can drive a simulation
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let nav = &self.navigation;
        let motion = &self.motion;
        let interp = &self.interpolation;

        let positive = [
            ("navigation.world_extent", nav.world_extent),
            ("motion.speed", motion.speed),
            ("motion.attack_range", motion.attack_range),
            ("motion.max_step_delta", motion.max_step_delta),
            ("motion.containment.ring_step", motion.containment.ring_step),
            ("interpolation.default_speed", interp.default_speed),
            ("interpolation.catch_up_multiplier", interp.catch_up_multiplier),
            ("interpolation.stale_after", interp.stale_after),
            ("interpolation.max_frame_delta", interp.max_frame_delta),
            ("reporting.interval", self.reporting.interval),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        if nav.divisions == 0 {
            return Err(ConfigError::Invalid("navigation.divisions must be positive".into()));
        }
        if nav.agent_clearance < 0.0 {
            return Err(ConfigError::Invalid("navigation.agent_clearance must not be negative".into()));
        }

        let fractions = [
            ("motion.turn_blend", motion.turn_blend),
            ("interpolation.velocity_blend", interp.velocity_blend),
            ("interpolation.target_blend", interp.target_blend),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be in [0, 1], got {value}")));
            }
        }
        Ok(())
    }

    /// Save to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load from a RON file and validate
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Self =
            ron::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        log::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Save to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load from a JSON file and validate
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        log::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// File IO error
    Io(String),
    /// Serialization error
    Serialize(String),
    /// Deserialization error
    Deserialize(String),
    /// Parsed but unusable
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Serialize(e) => write!(f, "Serialization error: {e}"),
            Self::Deserialize(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
