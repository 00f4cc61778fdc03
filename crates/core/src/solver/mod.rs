//! Volume-field solver
//!
//! The numerical core: the distribution kernel, field storage, the two-pass force
//! integrator, and impact injection. [`crate::Simulation`] wires these together;
//! the pieces are public so hosts can drive individual passes.
//!
//! # Example
//!
//! ```rust
//! use volume_sim_core::grid::GridIndexer;
//! use volume_sim_core::solver::{inject_at, ForceIntegrator, VolumeField};
//! use volume_sim_core::SimulationConfig;
//!
//! let config = SimulationConfig::default().with_dimensions(8, 8);
//! let grid = GridIndexer::new(8, 8).unwrap();
//! let integrator = ForceIntegrator::new(grid).unwrap();
//! let mut field = VolumeField::with_value(grid, config.volume_target);
//!
//! inject_at(&mut field, 3, 3, config.impact_power);
//! integrator.step(&mut field, &config).unwrap();
//! ```

mod field;
mod impact;
mod integrator;
mod kernel;
pub mod profiler;

pub use field::{FieldStats, VolumeField};
pub use impact::{inject_at, inject_splash};
pub use integrator::{derive_velocity, ForceIntegrator};
pub use kernel::DistributionKernel;
pub use profiler::{ProfilerScope, StepTimer};
