//! Volume-field simulation
//!
//! [`Simulation`] owns the configuration, the volume field, the force integrator
//! (and its kernel), and the random source. Hosts drive it once per frame:
//!
//! 1. forward any pending impacts (`inject_*`)
//! 2. call [`Simulation::step`]
//! 3. read the field back with [`Simulation::export_vertices`] or [`Simulation::volumes`]

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::export::{self, ExportTransform};
use crate::grid::GridIndexer;
use crate::random::{seeded, RandomSource, SeededRandom};
use crate::solver::{
    self, DistributionKernel, FieldStats, ForceIntegrator, ProfilerScope, StepTimer, VolumeField,
};
use nalgebra::Point3;
use tracing::{debug, error, info, warn};

/// Stateful volume-field simulation
pub struct Simulation<R: RandomSource = SeededRandom> {
    config: SimulationConfig,
    field: VolumeField,
    integrator: ForceIntegrator,
    rng: R,
    timer: StepTimer,
    step_count: u64,
}

impl Simulation<SeededRandom> {
    /// Create a simulation with a seeded standard generator.
    ///
    /// # Errors
    ///
    /// Returns any error from [`SimulationConfig::validate`] or kernel construction.
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self, SimulationError> {
        Self::with_random(config, seeded(seed))
    }
}

impl<R: RandomSource> Simulation<R> {
    /// Create a simulation with a caller-supplied random source.
    ///
    /// The field starts at `volume_target` everywhere (`previous` included), then
    /// turbulence is applied to `current`.
    ///
    /// # Errors
    ///
    /// Returns any error from [`SimulationConfig::validate`] or kernel construction.
    pub fn with_random(config: SimulationConfig, rng: R) -> Result<Self, SimulationError> {
        config.validate()?;
        let grid = GridIndexer::new(config.width, config.height)?;
        let integrator = ForceIntegrator::new(grid)?;
        let field = VolumeField::with_value(grid, config.volume_target);

        let mut sim = Self {
            config,
            field,
            integrator,
            rng,
            timer: StepTimer::new(),
            step_count: 0,
        };
        sim.apply_turbulence();

        info!(
            "Volume simulation initialized: {}x{} grid, target={}, range=[{}, {}]",
            config.width, config.height, config.volume_target, config.volume_min, config.volume_max
        );
        Ok(sim)
    }

    /// Change grid dimensions.
    ///
    /// No-op (returning `Ok(false)`) if the dimensions are unchanged. Otherwise the
    /// field and kernel are rebuilt, the field is re-initialized, and `Ok(true)` is
    /// returned. On error the simulation is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidDimensions`] for a grid smaller than 2×2,
    /// or [`SimulationError::DegenerateKernel`].
    pub fn resize(&mut self, width: usize, height: usize) -> Result<bool, SimulationError> {
        if width == self.config.width && height == self.config.height {
            return Ok(false);
        }

        let grid = GridIndexer::new(width, height)?;
        let integrator = ForceIntegrator::new(grid)?;

        self.config = self.config.with_dimensions(width, height);
        self.integrator = integrator;
        self.field = VolumeField::with_value(grid, self.config.volume_target);
        self.apply_turbulence();

        info!("Volume simulation resized to {}x{}", width, height);
        Ok(true)
    }

    /// Set every cell (current and previous) to `volume_target`
    pub fn reset(&mut self) {
        self.field.fill(self.config.volume_target);
        debug!("Field reset to {}", self.config.volume_target);
    }

    /// Set every cell's current volume to `target ± turbulence` (uniform).
    ///
    /// Draws exactly one value per cell, in row-major order.
    pub fn apply_turbulence(&mut self) {
        let target = self.config.volume_target;
        let turbulence = self.config.volume_turbulence.abs();
        for volume in self.field.current_mut() {
            *volume = target + self.rng.uniform(-turbulence, turbulence);
        }
    }

    /// Add `power` at `(x, z)` (mirror-folded). Returns `false` for non-finite power.
    pub fn inject_at(&mut self, x: isize, z: isize, power: f64) -> bool {
        solver::inject_at(&mut self.field, x, z, power)
    }

    /// Add `power` across the in-grid part of a `2*radius` square window centered on
    /// `(center_x, center_z)`. Returns the number of cells modified.
    pub fn inject_splash(
        &mut self,
        center_x: isize,
        center_z: isize,
        power: f64,
        radius: usize,
    ) -> usize {
        solver::inject_splash(&mut self.field, center_x, center_z, power, radius)
    }

    /// Point impact of `impact_power` at a random cell. Returns the cell.
    pub fn inject_random_point(&mut self) -> (usize, usize) {
        let (x, z) = self.random_cell();
        solver::inject_at(&mut self.field, x as isize, z as isize, self.config.impact_power);
        (x, z)
    }

    /// Splash of `impact_power` with `splash_radius` at a random cell.
    ///
    /// Returns the center cell and the number of cells modified.
    pub fn inject_random_splash(&mut self) -> ((usize, usize), usize) {
        let (x, z) = self.random_cell();
        let touched = solver::inject_splash(
            &mut self.field,
            x as isize,
            z as isize,
            self.config.impact_power,
            self.config.splash_radius,
        );
        ((x, z), touched)
    }

    /// Advance one step: velocity derivation, then all-pairs diffusion and clamp.
    pub fn step(&mut self) {
        let scope = ProfilerScope::new("step");
        let sanitized = match self.integrator.step(&mut self.field, &self.config) {
            Ok(sanitized) => sanitized,
            Err(e) => {
                error!("Step {} skipped: {}", self.step_count + 1, e);
                return;
            }
        };
        self.timer.record(scope.elapsed_ms());
        self.step_count += 1;

        if sanitized > 0 {
            warn!(
                "Step {}: non-finite velocity in {} cells",
                self.step_count, sanitized
            );
        }
        debug!(
            "Step {} took {:.3}ms, total volume {:.4}",
            self.step_count,
            self.timer.last_step_ms(),
            self.field.total()
        );
    }

    /// Write one vertex per cell into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::VertexBufferSize`] if `out` is not `area` long.
    pub fn export_vertices(
        &self,
        transform: &ExportTransform,
        out: &mut [Point3<f32>],
    ) -> Result<(), SimulationError> {
        export::export_vertices(self.field.grid(), self.field.current(), transform, out)
    }

    /// Triangle index buffer for the current grid
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidDimensions`] if indices overflow `u32`.
    pub fn triangles(&self) -> Result<Vec<u32>, SimulationError> {
        export::grid_triangles(self.field.grid())
    }

    /// Current volumes in row-major order
    pub fn volumes(&self) -> &[f64] {
        self.field.current()
    }

    /// Current volume at `(x, z)`, mirror-folded
    pub fn volume_at(&self, x: isize, z: isize) -> f64 {
        self.field.get(x, z)
    }

    /// Sum of all current volumes
    pub fn total_volume(&self) -> f64 {
        self.field.total()
    }

    /// Min/max/mean/total of the current field
    pub fn stats(&self) -> FieldStats {
        self.field.stats()
    }

    /// Underlying field
    pub fn field(&self) -> &VolumeField {
        &self.field
    }

    /// Grid indexer for the current dimensions
    pub fn grid(&self) -> &GridIndexer {
        self.field.grid()
    }

    /// `(width, height)` in cells
    pub fn dimensions(&self) -> (usize, usize) {
        (self.config.width, self.config.height)
    }

    /// Active configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Distribution kernel for the current grid
    pub fn kernel(&self) -> &DistributionKernel {
        self.integrator.kernel()
    }

    /// Number of completed steps
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Step timing
    pub fn timer(&self) -> &StepTimer {
        &self.timer
    }

    fn random_cell(&mut self) -> (usize, usize) {
        let (width, height) = self.dimensions();
        let x = self.rng.uniform(0.0, width as f64).floor() as usize;
        let z = self.rng.uniform(0.0, height as f64).floor() as usize;
        (x.min(width - 1), z.min(height - 1))
    }
}
