//! Volume field storage
//!
//! Three parallel `f64` arrays laid out in row-major order (`z * width + x`):
//! the current volume, the previous step's volume, and a scratch velocity that is
//! fully recomputed every step.

use crate::grid::GridIndexer;

/// Volume state for every grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeField {
    /// Volume at time T
    pub(crate) current: Vec<f64>,
    /// Volume at time T-1, used only to derive velocity
    pub(crate) previous: Vec<f64>,
    /// Net rate of change for the step in progress
    pub(crate) velocity: Vec<f64>,
    grid: GridIndexer,
}

impl VolumeField {
    /// Allocate a field with every cell at `value`.
    ///
    /// `previous` starts as a copy of `current` and velocity starts at zero.
    #[must_use]
    pub fn with_value(grid: GridIndexer, value: f64) -> Self {
        let area = grid.area();
        Self {
            current: vec![value; area],
            previous: vec![value; area],
            velocity: vec![0.0; area],
            grid,
        }
    }

    /// Grid this field is laid out on
    #[inline]
    pub fn grid(&self) -> &GridIndexer {
        &self.grid
    }

    /// Current volumes
    #[inline]
    pub fn current(&self) -> &[f64] {
        &self.current
    }

    /// Mutable access to current volumes
    #[inline]
    pub fn current_mut(&mut self) -> &mut [f64] {
        &mut self.current
    }

    /// Previous-step volumes
    #[inline]
    pub fn previous(&self) -> &[f64] {
        &self.previous
    }

    /// Velocities from the most recent step.
    ///
    /// A cell under an unbounded gravity pull holds a signed infinity here.
    #[inline]
    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    /// Current volume at `(x, z)`, mirror-folded
    #[inline]
    pub fn get(&self, x: isize, z: isize) -> f64 {
        self.current[self.grid.index(x, z)]
    }

    /// Set both `current` and `previous` to `value` everywhere
    pub fn fill(&mut self, value: f64) {
        self.current.fill(value);
        self.previous.fill(value);
    }

    /// Copy `current` into `previous`
    pub fn sync_previous(&mut self) {
        self.previous.copy_from_slice(&self.current);
    }

    /// Sum of all current volumes
    pub fn total(&self) -> f64 {
        self.current.iter().sum()
    }

    /// Summary statistics over the current volumes
    pub fn stats(&self) -> FieldStats {
        let (min, max) = self
            .current
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let total = self.total();
        FieldStats {
            min,
            max,
            mean: total / self.current.len() as f64,
            total,
        }
    }
}

/// Summary of the current volume field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    /// Smallest cell volume
    pub min: f64,
    /// Largest cell volume
    pub max: f64,
    /// Mean cell volume
    pub mean: f64,
    /// Sum over all cells
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_creation() {
        let grid = GridIndexer::new(10, 20).unwrap();
        let field = VolumeField::with_value(grid, 15.0);
        assert_eq!(field.current().len(), 200);
        assert!(field.current().iter().all(|&v| v == 15.0));
        assert_eq!(field.current(), field.previous());
        assert!(field.velocity().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_get_uses_mirror_fold() {
        let grid = GridIndexer::new(4, 4).unwrap();
        let mut field = VolumeField::with_value(grid, 0.0);
        field.current_mut()[grid.index(1, 2)] = 7.0;
        assert_eq!(field.get(1, 2), 7.0);
        assert_eq!(field.get(-1, 2), 7.0);
    }

    #[test]
    fn test_fill_and_sync() {
        let grid = GridIndexer::new(3, 3).unwrap();
        let mut field = VolumeField::with_value(grid, 1.0);
        field.current_mut()[4] = 9.0;
        assert_ne!(field.current(), field.previous());
        field.sync_previous();
        assert_eq!(field.previous()[4], 9.0);
        field.fill(2.0);
        assert!(field.previous().iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_stats() {
        let grid = GridIndexer::new(2, 2).unwrap();
        let mut field = VolumeField::with_value(grid, 10.0);
        field.current_mut()[3] = 14.0;
        let stats = field.stats();
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 14.0);
        assert_eq!(stats.total, 44.0);
        assert_eq!(stats.mean, 11.0);
    }
}
