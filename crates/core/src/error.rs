//! Errors raised while configuring a simulation
//!
//! Everything here is detected at construction, resize, or export time, except
//! [`SimulationError::GridMismatch`], which guards hosts driving the solver
//! passes by hand.

/// Errors that can occur while building or querying a simulation
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Grid must be at least 2 cells on each axis
    InvalidDimensions {
        /// Requested width in cells
        width: usize,
        /// Requested height in cells
        height: usize,
    },
    /// `volume_min` is greater than `volume_max`
    InvalidVolumeRange {
        /// Configured lower bound
        min: f64,
        /// Configured upper bound
        max: f64,
    },
    /// A configuration parameter is NaN or infinite
    NonFiniteParameter {
        /// Field name of the offending parameter
        name: &'static str,
    },
    /// Resistance coefficient must lie in `(0, 1]`
    InvalidResistance(f64),
    /// Kernel weights summed to zero or a non-finite value
    DegenerateKernel {
        /// Raw weight sum before normalization
        sum: f64,
    },
    /// Caller-supplied vertex storage does not match the grid area
    VertexBufferSize {
        /// Number of cells in the grid
        expected: usize,
        /// Length of the supplied buffer
        actual: usize,
    },
    /// A field was handed to an integrator built for a different grid
    GridMismatch {
        /// Integrator grid as `(width, height)`
        expected: (usize, usize),
        /// Field grid as `(width, height)`
        actual: (usize, usize),
    },
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::InvalidDimensions { width, height } => {
                write!(f, "Grid must be at least 2x2, got {width}x{height}")
            }
            SimulationError::InvalidVolumeRange { min, max } => {
                write!(f, "volume_min ({min}) exceeds volume_max ({max})")
            }
            SimulationError::NonFiniteParameter { name } => {
                write!(f, "Parameter '{name}' must be finite")
            }
            SimulationError::InvalidResistance(value) => {
                write!(f, "resistance_coefficient must be in (0, 1], got {value}")
            }
            SimulationError::DegenerateKernel { sum } => {
                write!(f, "Distribution kernel cannot be normalized (weight sum {sum})")
            }
            SimulationError::VertexBufferSize { expected, actual } => {
                write!(f, "Vertex buffer holds {actual} entries, grid has {expected} cells")
            }
            SimulationError::GridMismatch { expected, actual } => write!(
                f,
                "Field grid {}x{} does not match integrator grid {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
        }
    }
}

impl std::error::Error for SimulationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SimulationError::InvalidDimensions {
            width: 1,
            height: 8,
        };
        assert_eq!(err.to_string(), "Grid must be at least 2x2, got 1x8");

        let err = SimulationError::NonFiniteParameter { name: "gravity" };
        assert_eq!(err.to_string(), "Parameter 'gravity' must be finite");

        let err = SimulationError::GridMismatch {
            expected: (4, 4),
            actual: (8, 6),
        };
        assert_eq!(
            err.to_string(),
            "Field grid 8x6 does not match integrator grid 4x4"
        );
    }
}
