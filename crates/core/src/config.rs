//! Simulation configuration
//!
//! All parameters are constant for a run. Grid dimensions can change later through
//! [`crate::Simulation::resize`]; everything else is fixed at construction.

use crate::error::SimulationError;
use crate::grid::GridIndexer;
use serde::{Deserialize, Serialize};

/// Default neighborhood half-width for splash impacts, in cells
pub const DEFAULT_SPLASH_RADIUS: usize = 20;

/// Parameters for a volume-field simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid width in cells (≥ 2)
    pub width: usize,
    /// Grid height in cells (≥ 2)
    pub height: usize,
    /// Upper clamp bound for any cell
    pub volume_max: f64,
    /// Lower clamp bound for any cell
    pub volume_min: f64,
    /// Rest volume; also the reference for the gravity ratio
    pub volume_target: f64,
    /// Half-width of the uniform perturbation applied by turbulence
    pub volume_turbulence: f64,
    /// Velocity damping factor in `(0, 1]`
    pub resistance_coefficient: f64,
    /// Gravity term scale (typically negative)
    pub gravity: f64,
    /// Volume added per impact
    pub impact_power: f64,
    /// Half-width of the splash window, in cells
    pub splash_radius: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            volume_max: 20.0,
            volume_min: 10.0,
            volume_target: 15.0,
            volume_turbulence: 0.5,
            resistance_coefficient: 0.95,
            gravity: -0.05,
            impact_power: 5.0,
            splash_radius: DEFAULT_SPLASH_RADIUS,
        }
    }
}

impl SimulationConfig {
    /// Same configuration on a different grid size
    pub fn with_dimensions(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Check every construction-time invariant.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidDimensions`] for a grid smaller than 2×2
    /// - [`SimulationError::NonFiniteParameter`] for any NaN/∞ parameter
    /// - [`SimulationError::InvalidVolumeRange`] when `volume_min > volume_max`
    /// - [`SimulationError::InvalidResistance`] outside `(0, 1]`
    pub fn validate(&self) -> Result<(), SimulationError> {
        GridIndexer::new(self.width, self.height)?;

        let floats = [
            ("volume_max", self.volume_max),
            ("volume_min", self.volume_min),
            ("volume_target", self.volume_target),
            ("volume_turbulence", self.volume_turbulence),
            ("resistance_coefficient", self.resistance_coefficient),
            ("gravity", self.gravity),
            ("impact_power", self.impact_power),
        ];
        if let Some(&(name, _)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SimulationError::NonFiniteParameter { name });
        }

        if self.volume_min > self.volume_max {
            return Err(SimulationError::InvalidVolumeRange {
                min: self.volume_min,
                max: self.volume_max,
            });
        }

        if self.resistance_coefficient <= 0.0 || self.resistance_coefficient > 1.0 {
            return Err(SimulationError::InvalidResistance(
                self.resistance_coefficient,
            ));
        }

        Ok(())
    }

    /// Clamp a volume into `[volume_min, volume_max]`.
    ///
    /// NaN maps to `volume_min`; infinities map to the bound on their side.
    #[inline]
    pub fn clamp_volume(&self, volume: f64) -> f64 {
        if volume.is_nan() {
            self.volume_min
        } else {
            volume.clamp(self.volume_min, self.volume_max)
        }
    }
}
