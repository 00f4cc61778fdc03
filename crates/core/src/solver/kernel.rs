//! Distribution kernel
//!
//! A grid-sized weight field describing how a unit velocity at one cell spreads to
//! every other cell. Built once per grid size from a radial falloff around the
//! grid's geometric center and normalized globally by `sum * e`, so the weights
//! total `1/e` rather than 1.
//!
//! Lookups use relative displacement folded through [`GridIndexer::index`]: the
//! weight for a source at `(xv, zv)` acting on a target at `(x, z)` is
//! `weights[index(xv - x, zv - z)]`.

use crate::error::SimulationError;
use crate::grid::GridIndexer;
use nalgebra::Vector2;
use std::f64::consts::E;
use tracing::debug;

/// Precomputed, normalized relative-displacement weights
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionKernel {
    weights: Vec<f64>,
    raw_sum: f64,
}

impl DistributionKernel {
    /// Build the kernel for a grid.
    ///
    /// Each cell gets `1 - |cell - center| / |center|`, where
    /// `center = (width / 2, height / 2)` in integer cells. Weights are then divided
    /// by `raw_sum * e`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::DegenerateKernel`] if the raw sum is zero or
    /// non-finite.
    pub fn build(grid: &GridIndexer) -> Result<Self, SimulationError> {
        let center = Vector2::new((grid.width() / 2) as f64, (grid.height() / 2) as f64);
        let center_distance = center.norm();

        let mut weights = vec![0.0; grid.area()];
        let mut raw_sum = 0.0;
        for z in 0..grid.height() {
            for x in 0..grid.width() {
                let cell = Vector2::new(x as f64, z as f64);
                let distance_ratio = (cell - center).norm() / center_distance;
                let weight = 1.0 + (distance_ratio / -1.0);
                weights[grid.index_unchecked(x, z)] = weight;
                raw_sum += weight;
            }
        }

        if raw_sum == 0.0 || !raw_sum.is_finite() {
            return Err(SimulationError::DegenerateKernel { sum: raw_sum });
        }

        let scale = raw_sum * E;
        for w in &mut weights {
            *w /= scale;
        }

        debug!(
            "Built distribution kernel for {}x{} grid (raw sum {:.6})",
            grid.width(),
            grid.height(),
            raw_sum
        );

        Ok(Self { weights, raw_sum })
    }

    /// Normalized weights in row-major order
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weight at a flat index
    #[inline]
    pub fn weight(&self, index: usize) -> f64 {
        self.weights[index]
    }

    /// Sum of the weights before normalization
    pub fn raw_sum(&self) -> f64 {
        self.raw_sum
    }

    /// Sum of the normalized weights (≈ `1/e`)
    pub fn normalized_sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Number of weights (equals the grid area)
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always false for a built kernel
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
