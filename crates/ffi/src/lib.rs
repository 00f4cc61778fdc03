//! C ABI for the volume-field simulation
//!
//! Hosts (game engines, renderers) hold an opaque `VolumeSimInstance`, step it once
//! per frame, forward impacts, and copy vertices or raw volumes out. Every fallible
//! call returns a `VolumeSimErrorCode` and records a message retrievable with
//! `volume_sim_get_last_error()` on the same thread.

mod error;
mod helpers;
mod simulation;

pub use error::{volume_sim_get_last_error, volume_sim_get_last_error_code, VolumeSimErrorCode};
pub use simulation::{
    volume_sim_apply_turbulence, volume_sim_default_config, volume_sim_destroy,
    volume_sim_export_vertices, volume_sim_get_dimensions, volume_sim_inject_at,
    volume_sim_inject_random_point, volume_sim_inject_random_splash, volume_sim_inject_splash,
    volume_sim_new, volume_sim_read_volumes, volume_sim_reset, volume_sim_resize,
    volume_sim_step, volume_sim_triangle_index_count, volume_sim_write_triangles,
    VolumeSimConfig, VolumeSimInstance,
};
