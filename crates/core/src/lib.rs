//! Volume Field Simulation Core Library
//!
//! A stylized, stable fluid-height simulation over a dense 2D grid. Each frame the
//! field is pushed by its own change in volume, a superlinear gravity term, and
//! external impacts, then every cell's velocity is diffused to every other cell
//! through a precomputed radial kernel and the result is clamped.
//!
//! ## Components
//!
//! - [`grid::GridIndexer`] - flat indexing with mirror-fold boundaries
//! - [`solver::DistributionKernel`] - normalized relative-displacement weights
//! - [`solver::VolumeField`] - current / previous / velocity arrays
//! - [`solver::ForceIntegrator`] - velocity derivation and all-pairs diffusion
//! - [`solver::inject_at`] / [`solver::inject_splash`] - external impacts
//! - [`export`] - vertex export and grid triangulation for renderers
//! - [`Simulation`] - owns all of the above plus the random source
//!
//! ```rust
//! use volume_sim_core::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::default().with_dimensions(16, 16);
//! let mut sim = Simulation::new(config, 42).unwrap();
//! sim.inject_random_splash();
//! sim.step();
//! assert!(sim.volumes().iter().all(|&v| (10.0..=20.0).contains(&v)));
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod random;
pub mod simulation;
pub mod solver;

pub use nalgebra;

pub use config::{SimulationConfig, DEFAULT_SPLASH_RADIUS};
pub use error::SimulationError;
pub use export::{export_vertices, grid_triangles, ExportTransform};
pub use grid::GridIndexer;
pub use random::{seeded, RandomSource, SeededRandom};
pub use simulation::Simulation;
pub use solver::{DistributionKernel, FieldStats, ForceIntegrator, VolumeField};
