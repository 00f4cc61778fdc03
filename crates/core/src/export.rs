//! Render boundary
//!
//! Converts the volume field into vertex positions (`y` = volume) and produces the
//! fixed triangle connectivity for a grid of a given size. Neither function knows
//! anything about a particular renderer.

use crate::error::SimulationError;
use crate::grid::GridIndexer;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Placement of exported vertices in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportTransform {
    /// Distance between neighboring vertices on x and z
    pub cell_spacing: f32,
    /// Multiplier applied to each volume to get vertex height
    pub height_scale: f32,
    /// Offset the grid so its middle sits at the origin
    pub centered: bool,
}

impl Default for ExportTransform {
    fn default() -> Self {
        Self {
            cell_spacing: 1.0,
            height_scale: 1.0,
            centered: true,
        }
    }
}

/// Write one vertex per cell into `out`, in row-major `(z, x)` order.
///
/// # Errors
///
/// Returns [`SimulationError::VertexBufferSize`] if `out.len()` differs from the
/// grid area.
pub fn export_vertices(
    grid: &GridIndexer,
    volumes: &[f64],
    transform: &ExportTransform,
    out: &mut [Point3<f32>],
) -> Result<(), SimulationError> {
    if out.len() != grid.area() || volumes.len() != grid.area() {
        return Err(SimulationError::VertexBufferSize {
            expected: grid.area(),
            actual: out.len(),
        });
    }

    let (offset_x, offset_z) = if transform.centered {
        (
            (grid.width() as f32 - 1.0) * 0.5,
            (grid.height() as f32 - 1.0) * 0.5,
        )
    } else {
        (0.0, 0.0)
    };

    for (i, (vertex, &volume)) in out.iter_mut().zip(volumes).enumerate() {
        let (x, z) = grid.coords(i);
        *vertex = Point3::new(
            (x as f32 - offset_x) * transform.cell_spacing,
            volume as f32 * transform.height_scale,
            (z as f32 - offset_z) * transform.cell_spacing,
        );
    }
    Ok(())
}

/// Triangle index buffer for a `width × height` vertex grid.
///
/// Two triangles per quad, three indices each, counter-clockwise when viewed from
/// +y. Depends only on the dimensions, so it only needs rebuilding on resize.
///
/// # Errors
///
/// Returns [`SimulationError::InvalidDimensions`] if vertex indices would not fit
/// in `u32`.
pub fn grid_triangles(grid: &GridIndexer) -> Result<Vec<u32>, SimulationError> {
    let invalid = || SimulationError::InvalidDimensions {
        width: grid.width(),
        height: grid.height(),
    };
    let width = u32::try_from(grid.width()).map_err(|_| invalid())?;
    u32::try_from(grid.area()).map_err(|_| invalid())?;

    let quads = (grid.width() - 1) * (grid.height() - 1);
    let mut indices = Vec::with_capacity(quads * 6);
    for z in 0..grid.height() as u32 - 1 {
        for x in 0..width - 1 {
            let i0 = z * width + x;
            let i1 = i0 + 1;
            let i2 = i0 + width;
            let i3 = i2 + 1;
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }
    Ok(indices)
}
