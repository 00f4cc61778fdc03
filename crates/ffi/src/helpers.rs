//! Last-error bookkeeping shared by every `volume_sim_*` entry point
//!
//! Each entry point ends in exactly one of two ways: it reports a failure through
//! [`track_error`] and returns that code, or it reports success through
//! [`clear_last_error`]. A host reading `volume_sim_get_last_error` therefore
//! always sees the outcome of its most recent call on that thread.

use crate::error::{with_last_error_mut, VolumeSimError, VolumeSimErrorCode};
use std::ffi::CString;

/// Record `error` as this thread's last error and hand back its code.
///
/// A message with an interior NUL cannot cross the C boundary; the code is still
/// recorded and the message reads back as null.
#[inline]
pub(crate) fn track_error(error: &impl VolumeSimError) -> VolumeSimErrorCode {
    let code = error.code();
    with_last_error_mut(|(message, last_code)| {
        *message = CString::new(error.msg()).ok();
        *last_code = code;
    });
    code
}

/// Reset this thread's last error after a successful call.
pub(crate) fn clear_last_error() -> VolumeSimErrorCode {
    with_last_error_mut(|(message, code)| {
        *message = None;
        *code = VolumeSimErrorCode::Ok;
    });
    VolumeSimErrorCode::Ok
}
