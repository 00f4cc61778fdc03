//! Per-step force integration
//!
//! One step is two passes over the whole grid, strictly in this order:
//!
//! ```text
//! Pass A  velocity[i] = (current[i] - previous[i] + g * (current[i]/target)^e) * resistance
//!         previous[i] = current[i]
//!
//! Pass B  current[i] += velocity[i]
//!         current[i] -= Σ_src velocity[src] * kernel[index(src - i)]
//!         current[i]  = clamp(current[i], min, max)
//! ```
//!
//! Pass B is all-pairs (`area²` multiply-adds). Each target only reads the Pass A
//! velocities and the kernel and writes its own cell, so targets are processed in
//! parallel with Rayon. The inner sum runs in a fixed source order, which keeps
//! results bit-identical regardless of thread count.

use super::field::VolumeField;
use super::kernel::DistributionKernel;
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::grid::GridIndexer;
use rayon::prelude::*;
use std::borrow::Cow;
use std::f64::consts::E;

/// Kernel plus the folded displacement lookup tables for one grid size
#[derive(Debug, Clone)]
pub struct ForceIntegrator {
    kernel: DistributionKernel,
    grid: GridIndexer,
    // Folded axis position for displacement d, stored at d + (extent - 1)
    fold_x: Vec<usize>,
    fold_z: Vec<usize>,
}

impl ForceIntegrator {
    /// Build the kernel and displacement tables for `grid`.
    ///
    /// # Errors
    ///
    /// Propagates [`SimulationError::DegenerateKernel`] from kernel construction.
    pub fn new(grid: GridIndexer) -> Result<Self, SimulationError> {
        Ok(Self {
            kernel: DistributionKernel::build(&grid)?,
            grid,
            fold_x: grid.displacement_table_x(),
            fold_z: grid.displacement_table_z(),
        })
    }

    /// Distribution kernel used by the diffusion pass
    pub fn kernel(&self) -> &DistributionKernel {
        &self.kernel
    }

    /// Grid this integrator was built for
    pub fn grid(&self) -> &GridIndexer {
        &self.grid
    }

    /// Run Pass A then Pass B.
    ///
    /// Returns the number of cells whose velocity was non-finite.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::GridMismatch`] if `field` was laid out on a
    /// different grid; the field is left untouched.
    pub fn step(
        &self,
        field: &mut VolumeField,
        config: &SimulationConfig,
    ) -> Result<usize, SimulationError> {
        self.check_grid(field)?;
        let sanitized = derive_velocity(field, config);
        self.diffuse_matched(field, config);
        Ok(sanitized)
    }

    /// Pass B: self-update, all-pairs diffusion, then clamp.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::GridMismatch`] if `field` was laid out on a
    /// different grid.
    pub fn diffuse(
        &self,
        field: &mut VolumeField,
        config: &SimulationConfig,
    ) -> Result<(), SimulationError> {
        self.check_grid(field)?;
        self.diffuse_matched(field, config);
        Ok(())
    }

    fn check_grid(&self, field: &VolumeField) -> Result<(), SimulationError> {
        let actual = field.grid();
        if actual == &self.grid {
            Ok(())
        } else {
            Err(SimulationError::GridMismatch {
                expected: (self.grid.width(), self.grid.height()),
                actual: (actual.width(), actual.height()),
            })
        }
    }

    fn diffuse_matched(&self, field: &mut VolumeField, config: &SimulationConfig) {
        let width = self.grid.width();
        let height = self.grid.height();
        let weights = self.kernel.weights();
        let fold_x = &self.fold_x;
        let fold_z = &self.fold_z;

        let VolumeField {
            current, velocity, ..
        } = field;
        let velocity: &[f64] = velocity;
        // Saturated cells still drive their own clamp but never leak into neighbors.
        let sources = diffusion_sources(velocity);
        let sources: &[f64] = &sources;

        current
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, volume)| {
                let (x, z) = (i % width, i / width);
                // Source xv maps to displacement xv - x, i.e. table slot xv + (width - 1 - x)
                let kx_row = &fold_x[width - 1 - x..][..width];
                let kz_col = &fold_z[height - 1 - z..][..height];

                let mut acc = *volume + velocity[i];
                for (zv, &kz) in kz_col.iter().enumerate() {
                    let row = &sources[zv * width..][..width];
                    let kernel_row = &weights[kz * width..][..width];
                    for (&vel, &kx) in row.iter().zip(kx_row) {
                        acc -= vel * kernel_row[kx];
                    }
                }
                *volume = config.clamp_volume(acc);
            });
    }
}

/// Velocities as seen by neighboring cells: infinite entries contribute nothing.
fn diffusion_sources(velocity: &[f64]) -> Cow<'_, [f64]> {
    if velocity.iter().all(|v| v.is_finite()) {
        Cow::Borrowed(velocity)
    } else {
        Cow::Owned(
            velocity
                .iter()
                .map(|&v| if v.is_finite() { v } else { 0.0 })
                .collect(),
        )
    }
}

/// Pass A: derive velocity from the volume change plus gravity, and snapshot
/// `previous`.
///
/// An infinite gravity pull (e.g. a zero target) is kept as a signed infinite
/// velocity so the diffusion pass saturates that cell to the matching volume bound.
/// NaN has no direction: a NaN gravity term (negative ratio raised to `e`) is
/// dropped and a NaN velocity becomes zero. Returns how many cells were affected.
pub fn derive_velocity(field: &mut VolumeField, config: &SimulationConfig) -> usize {
    let target = config.volume_target;
    let gravity = config.gravity;
    let resistance = config.resistance_coefficient;

    let VolumeField {
        current,
        previous,
        velocity,
        ..
    } = field;

    let mut sanitized = 0;
    for ((&cur, prev), vel) in current.iter().zip(previous.iter_mut()).zip(velocity.iter_mut()) {
        let mut gravity_term = gravity * (cur / target).powf(E);
        let mut faulted = false;
        if gravity_term.is_nan() {
            gravity_term = 0.0;
            faulted = true;
        }

        let mut v = (cur - *prev + gravity_term) * resistance;
        if v.is_nan() {
            v = 0.0;
            faulted = true;
        } else if v.is_infinite() {
            faulted = true;
        }

        *vel = v;
        *prev = cur;
        sanitized += usize::from(faulted);
    }
    sanitized
}

/// Straightforward all-pairs Pass B used to cross-check the table-driven version.
#[cfg(test)]
pub(crate) fn diffuse_reference(
    field: &mut VolumeField,
    kernel: &DistributionKernel,
    config: &SimulationConfig,
) {
    let grid = *field.grid();
    let velocity = field.velocity.clone();
    for i in 0..grid.area() {
        let (x, z) = grid.coords(i);
        let mut v = field.current[i] + velocity[i];
        for iv in 0..grid.area() {
            if !velocity[iv].is_finite() {
                continue;
            }
            let (xv, zv) = grid.coords(iv);
            let im = grid.index(xv as isize - x as isize, zv as isize - z as isize);
            v -= velocity[iv] * kernel.weight(im);
        }
        field.current[i] = config.clamp_volume(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{seeded, RandomSource};

    fn config_4x4() -> SimulationConfig {
        SimulationConfig {
            width: 4,
            height: 4,
            volume_target: 15.0,
            volume_min: 10.0,
            volume_max: 20.0,
            gravity: 0.0,
            resistance_coefficient: 1.0,
            volume_turbulence: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_pass_a_velocity_and_snapshot() {
        let cfg = config_4x4();
        let grid = GridIndexer::new(4, 4).unwrap();
        let mut field = VolumeField::with_value(grid, 15.0);
        field.current_mut()[5] = 20.0;

        let sanitized = derive_velocity(&mut field, &cfg);
        assert_eq!(sanitized, 0);
        assert_eq!(field.velocity()[5], 5.0);
        assert_eq!(field.velocity()[0], 0.0);
        assert_eq!(field.previous(), field.current());
    }

    #[test]
    fn test_pass_a_gravity_uses_exponent_e() {
        let cfg = SimulationConfig {
            gravity: -1.0,
            resistance_coefficient: 0.5,
            ..config_4x4()
        };
        let grid = GridIndexer::new(4, 4).unwrap();
        let mut field = VolumeField::with_value(grid, 30.0);
        derive_velocity(&mut field, &cfg);
        let expected = -(2.0_f64.powf(E)) * 0.5;
        assert_eq!(field.velocity()[0], expected);
    }

    #[test]
    fn test_pass_a_sanitizes_negative_ratio() {
        let cfg = SimulationConfig {
            volume_target: -1.0,
            gravity: -0.1,
            ..config_4x4()
        };
        let grid = GridIndexer::new(4, 4).unwrap();
        let mut field = VolumeField::with_value(grid, 15.0);
        field.current_mut()[3] = 16.0;
        let sanitized = derive_velocity(&mut field, &cfg);
        assert_eq!(sanitized, 16);
        assert!(field.velocity().iter().all(|v| v.is_finite()));
        // NaN gravity is dropped; the volume change itself survives.
        assert_eq!(field.velocity()[3], 1.0);
        assert_eq!(field.velocity()[0], 0.0);
    }

    #[test]
    fn test_pass_a_keeps_sign_of_infinite_gravity() {
        let grid = GridIndexer::new(4, 4).unwrap();
        let mut field = VolumeField::with_value(grid, 15.0);
        let cfg = SimulationConfig {
            volume_target: 0.0,
            gravity: -0.5,
            ..config_4x4()
        };
        assert_eq!(derive_velocity(&mut field, &cfg), 16);
        assert!(field.velocity().iter().all(|&v| v == f64::NEG_INFINITY));

        let mut field = VolumeField::with_value(grid, 15.0);
        let cfg = SimulationConfig { gravity: 0.5, ..cfg };
        derive_velocity(&mut field, &cfg);
        assert!(field.velocity().iter().all(|&v| v == f64::INFINITY));
    }

    #[test]
    fn test_infinite_pull_saturates_to_bounds() {
        let grid = GridIndexer::new(4, 4).unwrap();
        let integrator = ForceIntegrator::new(grid).unwrap();

        let down = SimulationConfig {
            volume_target: 0.0,
            gravity: -0.5,
            ..config_4x4()
        };
        let mut field = VolumeField::with_value(grid, 15.0);
        assert_eq!(integrator.step(&mut field, &down), Ok(16));
        assert!(field.current().iter().all(|&v| v == 10.0));

        let up = SimulationConfig { gravity: 0.5, ..down };
        let mut field = VolumeField::with_value(grid, 15.0);
        integrator.step(&mut field, &up).unwrap();
        assert!(field.current().iter().all(|&v| v == 20.0));
    }

    #[test]
    fn test_saturated_cell_does_not_leak_into_neighbors() {
        let cfg = config_4x4();
        let grid = GridIndexer::new(4, 4).unwrap();
        let integrator = ForceIntegrator::new(grid).unwrap();
        let mut field = VolumeField::with_value(grid, 15.0);
        field.velocity[5] = f64::NEG_INFINITY;

        let mut reference = field.clone();
        integrator.diffuse(&mut field, &cfg).unwrap();
        diffuse_reference(&mut reference, integrator.kernel(), &cfg);

        assert_eq!(field.current()[5], 10.0);
        assert!(field
            .current()
            .iter()
            .enumerate()
            .all(|(i, &v)| i == 5 || v == 15.0));
        assert_eq!(field.current(), reference.current());
    }

    #[test]
    fn test_rejects_field_from_other_grid() {
        let cfg = config_4x4();
        let integrator = ForceIntegrator::new(GridIndexer::new(4, 4).unwrap()).unwrap();
        let mut field = VolumeField::with_value(GridIndexer::new(8, 8).unwrap(), 15.0);
        field.current_mut()[0] = 18.0;
        let before = field.clone();

        let expected = Err(SimulationError::GridMismatch {
            expected: (4, 4),
            actual: (8, 8),
        });
        assert_eq!(integrator.step(&mut field, &cfg), expected);
        assert_eq!(integrator.diffuse(&mut field, &cfg), expected.map(|_| ()));
        assert_eq!(field, before);
    }

    #[test]
    fn test_table_diffusion_matches_reference() {
        let cfg = SimulationConfig {
            gravity: -0.05,
            resistance_coefficient: 0.9,
            volume_min: 0.0,
            volume_max: 100.0,
            ..config_4x4()
        };
        for (w, h) in [(4, 4), (5, 3), (7, 6)] {
            let grid = GridIndexer::new(w, h).unwrap();
            let integrator = ForceIntegrator::new(grid).unwrap();
            let mut rng = seeded(11);
            let mut field = VolumeField::with_value(grid, 15.0);
            for v in field.current_mut() {
                *v += rng.uniform(-3.0, 3.0);
            }
            derive_velocity(&mut field, &cfg);

            let mut reference = field.clone();
            integrator.diffuse(&mut field, &cfg).unwrap();
            diffuse_reference(&mut reference, integrator.kernel(), &cfg);

            let fast: Vec<u64> = field.current().iter().map(|v| v.to_bits()).collect();
            let slow: Vec<u64> = reference.current().iter().map(|v| v.to_bits()).collect();
            assert_eq!(fast, slow, "{w}x{h}");
        }
    }

    #[test]
    fn test_step_clamps_every_cell() {
        let cfg = config_4x4();
        let grid = GridIndexer::new(4, 4).unwrap();
        let integrator = ForceIntegrator::new(grid).unwrap();
        let mut field = VolumeField::with_value(grid, 15.0);
        field.current_mut()[0] = 500.0;
        field.current_mut()[15] = -500.0;
        integrator.step(&mut field, &cfg).unwrap();
        assert!(field.current().iter().all(|&v| (10.0..=20.0).contains(&v)));
    }
}
