//! Grid indexing with mirror-fold boundaries
//!
//! Maps 2D logical coordinates `(x, z)` onto the flat row-major storage shared by
//! every per-cell array in the simulation (`z * width + x`).
//!
//! Coordinates outside the grid are reflected back into range rather than wrapped
//! or clamped. One step past either edge aliases the *second* cell from that edge:
//!
//! ```text
//! x:      -2  -1 | 0  1  2  3 |  4  5
//! folds:   2   1 | 0  1  2  3 |  2  1      (width = 4)
//! ```
//!
//! The same rule maps relative displacements onto the distribution kernel, so the
//! kernel behaves as a mirrored tile rather than a linear stencil.

use crate::error::SimulationError;

/// Smallest permitted extent on either axis.
pub const MIN_GRID_EXTENT: usize = 2;

/// Grid dimensions plus the mirror-fold index mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridIndexer {
    width: usize,
    height: usize,
}

impl GridIndexer {
    /// Create an indexer for a `width × height` grid.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidDimensions`] if either axis is below
    /// [`MIN_GRID_EXTENT`] or the area does not fit in `isize`.
    pub fn new(width: usize, height: usize) -> Result<Self, SimulationError> {
        let fits = width
            .checked_mul(height)
            .is_some_and(|area| isize::try_from(area).is_ok());
        if width < MIN_GRID_EXTENT || height < MIN_GRID_EXTENT || !fits {
            return Err(SimulationError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Grid width in cells
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells
    #[inline]
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Flat index for `(x, z)` with mirror-fold boundary mapping.
    ///
    /// Total over all integers; the result is always in `[0, area)`.
    #[inline]
    pub fn index(&self, x: isize, z: isize) -> usize {
        fold(z, self.height) * self.width + fold(x, self.width)
    }

    /// Flat index for an in-range coordinate, without folding.
    #[inline]
    pub fn index_unchecked(&self, x: usize, z: usize) -> usize {
        debug_assert!(x < self.width && z < self.height);
        z * self.width + x
    }

    /// Logical `(x, z)` for a flat index.
    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// Whether `(x, z)` lies strictly inside the grid.
    #[inline]
    pub fn contains(&self, x: isize, z: isize) -> bool {
        x >= 0 && z >= 0 && (x as usize) < self.width && (z as usize) < self.height
    }

    /// Folded axis positions for every displacement `d ∈ [-(extent-1), extent-1]`
    /// along the x axis, offset so entry `0` corresponds to `d = -(width-1)`.
    pub(crate) fn displacement_table_x(&self) -> Vec<usize> {
        displacement_table(self.width)
    }

    /// As [`Self::displacement_table_x`], for the z axis.
    pub(crate) fn displacement_table_z(&self) -> Vec<usize> {
        displacement_table(self.height)
    }
}

/// Reflect `coord` into `[0, bound)`.
///
/// For `coord ∈ [-(bound-1), 2*bound-2]` this is exactly a single reflection:
/// negative values map to `-coord`, values at or past `bound` map to
/// `2*bound - coord - 2`. Values further out keep bouncing with period
/// `2*(bound-1)`.
#[inline]
fn fold(coord: isize, bound: usize) -> usize {
    let bound = bound as isize;
    let period = 2 * (bound - 1);
    let m = coord.rem_euclid(period);
    (if m >= bound { period - m } else { m }) as usize
}

fn displacement_table(extent: usize) -> Vec<usize> {
    let span = extent as isize - 1;
    (-span..=span).map(|d| fold(d, extent)).collect()
}
