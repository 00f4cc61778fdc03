use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;
use volume_sim_core::SimulationError;

/// Common interface for FFI error types.
///
/// - `code()` - Returns the error code to be passed across FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait VolumeSimError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> VolumeSimErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `VolumeSimError` for common FFI error scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultVolumeSimError {
    code: VolumeSimErrorCode,
    msg: String,
}

impl DefaultVolumeSimError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"instance"`, `"out_volumes"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: VolumeSimErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for a caller buffer of the wrong length.
    pub fn buffer_size(param_name: &str, expected: usize, actual: usize) -> Self {
        Self {
            code: VolumeSimErrorCode::BufferSize,
            msg: format!("Buffer '{param_name}' must hold {expected} entries, got {actual}"),
        }
    }

    /// Create error for invalid parameter.
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: VolumeSimErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl From<&SimulationError> for DefaultVolumeSimError {
    fn from(error: &SimulationError) -> Self {
        let code = match error {
            SimulationError::InvalidDimensions { .. } | SimulationError::GridMismatch { .. } => {
                VolumeSimErrorCode::InvalidDimensions
            }
            SimulationError::VertexBufferSize { .. } => VolumeSimErrorCode::BufferSize,
            SimulationError::InvalidVolumeRange { .. }
            | SimulationError::NonFiniteParameter { .. }
            | SimulationError::InvalidResistance(_)
            | SimulationError::DegenerateKernel { .. } => VolumeSimErrorCode::InvalidConfig,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl VolumeSimError for DefaultVolumeSimError {
    fn code(&self) -> VolumeSimErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by volume simulation functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeSimErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Configuration rejected (volume range, resistance, non-finite values, kernel).
    InvalidConfig = 2,

    /// Grid dimensions below 2x2 or too large to index.
    InvalidDimensions = 3,

    /// Invalid parameter passed to function.
    InvalidParameter = 4,

    /// Caller-supplied buffer has the wrong length.
    BufferSize = 5,
}

impl From<DefaultVolumeSimError> for VolumeSimErrorCode {
    fn from(error: DefaultVolumeSimError) -> Self {
        error.code
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The CString is stored to prevent memory leaks when returning raw pointers via FFI.
    static LAST_ERROR: RefCell<(Option<CString>, VolumeSimErrorCode)> = const { RefCell::new((None, VolumeSimErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, VolumeSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, VolumeSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if an error occurred.
/// - `null` if no error has occurred or the error message cannot be converted to C string.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread that sets
/// or clears the error.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// VolumeSimInstance* sim = nullptr;
/// VolumeSimConfig config = volume_sim_default_config();
/// if (volume_sim_new(&config, 42, &sim) != VolumeSimErrorCode::Ok) {
///     const char* error = volume_sim_get_last_error();
///     if (error) {
///         printf("Volume sim creation failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn volume_sim_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `VolumeSimErrorCode::Ok` (0) if no error has occurred, otherwise the
/// code from the last failed operation on this thread.
#[no_mangle]
pub extern "C" fn volume_sim_get_last_error_code() -> VolumeSimErrorCode {
    with_last_error(|(_cstring, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_error_mapping() {
        let err = DefaultVolumeSimError::from(&SimulationError::InvalidDimensions {
            width: 1,
            height: 1,
        });
        assert_eq!(err.code(), VolumeSimErrorCode::InvalidDimensions);
        assert_eq!(err.msg(), "Grid must be at least 2x2, got 1x1");

        let err = DefaultVolumeSimError::from(&SimulationError::InvalidResistance(2.0));
        assert_eq!(err.code(), VolumeSimErrorCode::InvalidConfig);
    }

    #[test]
    fn test_null_pointer_message() {
        let err = DefaultVolumeSimError::null_pointer("ptr");
        assert_eq!(err.code(), VolumeSimErrorCode::NullPointer);
        assert_eq!(err.msg(), "Parameter 'ptr' cannot be null");
    }
}
