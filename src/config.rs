//! Solver configuration and TOML loading.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::physics::planet::Planet;

/// Assumed apogee of the insertion orbit, m.
pub const DEFAULT_APOGEE_ALTITUDE: f64 = 270_000.0;
/// Fixed pass count of the reference iteration.
pub const DEFAULT_PASSES: u32 = 6;

/// How the ground-track iteration decides when to stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IterationMode {
    /// Run exactly `passes` passes with no residual check. Six passes is
    /// the reference behaviour every regression value is pinned to.
    Fixed { passes: u32 },
    /// Stop once azimuth and inclination both move less than
    /// `tolerance_deg` between passes, or after `max_passes`.
    Converge { tolerance_deg: f64, max_passes: u32 },
}

impl Default for IterationMode {
    fn default() -> Self {
        IterationMode::Fixed {
            passes: DEFAULT_PASSES,
        }
    }
}

/// Everything a solve needs besides the mission request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub planet: Planet,
    pub apogee_altitude_m: f64,
    pub flight_path_angle_deg: f64,
    pub mode: IterationMode,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            planet: Planet::earth(),
            apogee_altitude_m: DEFAULT_APOGEE_ALTITUDE,
            flight_path_angle_deg: 0.0,
            mode: IterationMode::default(),
        }
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl SolverConfig {
    pub fn flight_path_angle(&self) -> f64 {
        self.flight_path_angle_deg.to_radians()
    }

    /// Reject values that make the solver meaningless before any math runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let planet = &self.planet;
        if !(planet.radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "planet radius must be positive, got {}",
                planet.radius
            )));
        }
        if !(planet.mu > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "gravitational parameter must be positive, got {}",
                planet.mu
            )));
        }
        if !(planet.rotation_rate >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "rotation rate must be non-negative, got {}",
                planet.rotation_rate
            )));
        }
        if !(self.apogee_altitude_m > -planet.radius) {
            return Err(ConfigError::Invalid(format!(
                "apogee altitude {} m is below the planet centre",
                self.apogee_altitude_m
            )));
        }
        if !(self.flight_path_angle_deg.abs() < 90.0) {
            return Err(ConfigError::Invalid(format!(
                "flight-path angle must be within (-90, 90) deg, got {}",
                self.flight_path_angle_deg
            )));
        }
        match self.mode {
            IterationMode::Fixed { passes: 0 } => Err(ConfigError::Invalid(
                "fixed iteration needs at least one pass".into(),
            )),
            IterationMode::Converge { tolerance_deg, max_passes } => {
                if !(tolerance_deg > 0.0) {
                    Err(ConfigError::Invalid(format!(
                        "convergence tolerance must be positive, got {}",
                        tolerance_deg
                    )))
                } else if max_passes == 0 {
                    Err(ConfigError::Invalid(
                        "convergence mode needs at least one pass".into(),
                    ))
                } else {
                    Ok(())
                }
            }
            IterationMode::Fixed { .. } => Ok(()),
        }
    }
}

/// Parse and validate a config from TOML text.
pub fn from_toml_str(contents: &str) -> Result<SolverConfig, ConfigError> {
    let config: SolverConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a config from a TOML file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<SolverConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    from_toml_str(&contents)
}
