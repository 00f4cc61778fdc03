//! External impacts on the volume field
//!
//! Point impacts go through the mirror-folded indexer like every other lookup.
//! Splashes are bounds-checked instead: window cells outside the grid are dropped,
//! never folded back in. Neither clamps; the next integration step does.

use super::field::VolumeField;
use crate::grid::GridIndexer;
use std::ops::Range;
use tracing::{trace, warn};

/// Add `power` to the cell at `(x, z)`.
///
/// Returns `false` (and leaves the field untouched) for non-finite power.
pub fn inject_at(field: &mut VolumeField, x: isize, z: isize, power: f64) -> bool {
    if !power.is_finite() {
        warn!("Ignoring point impact with non-finite power {}", power);
        return false;
    }
    let index = field.grid().index(x, z);
    field.current[index] += power;
    trace!("Point impact at ({}, {}) power {:.3}", x, z, power);
    true
}

/// Add `power` to every in-grid cell of the window
/// `[cx - radius, cx + radius) × [cz - radius, cz + radius)`.
///
/// Returns the number of cells modified.
pub fn inject_splash(
    field: &mut VolumeField,
    center_x: isize,
    center_z: isize,
    power: f64,
    radius: usize,
) -> usize {
    if !power.is_finite() {
        warn!("Ignoring splash with non-finite power {}", power);
        return 0;
    }

    let grid = *field.grid();
    let Some((xs, zs)) = splash_window(&grid, center_x, center_z, radius) else {
        trace!("Splash at ({}, {}) missed the grid", center_x, center_z);
        return 0;
    };

    let width = grid.width();
    for z in zs.clone() {
        for cell in &mut field.current[z * width..][xs.clone()] {
            *cell += power;
        }
    }
    let touched = xs.len() * zs.len();

    trace!(
        "Splash at ({}, {}) radius {} power {:.3}: {} cells",
        center_x,
        center_z,
        radius,
        power,
        touched
    );
    touched
}

/// In-grid part of the splash window, one half-open range per axis.
fn splash_window(
    grid: &GridIndexer,
    center_x: isize,
    center_z: isize,
    radius: usize,
) -> Option<(Range<usize>, Range<usize>)> {
    let xs = axis_window(center_x, radius, grid.width())?;
    let zs = axis_window(center_z, radius, grid.height())?;
    Some((xs, zs))
}

fn axis_window(center: isize, radius: usize, extent: usize) -> Option<Range<usize>> {
    let radius = isize::try_from(radius).unwrap_or(isize::MAX);
    let extent_signed = isize::try_from(extent).unwrap_or(isize::MAX);
    let start = center.saturating_sub(radius).clamp(0, extent_signed);
    let end = center.saturating_add(radius).clamp(0, extent_signed);
    if start >= end {
        return None;
    }
    Some(usize::try_from(start).ok()?..usize::try_from(end).ok()?)
}
