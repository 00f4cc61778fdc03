//! Volume simulation FFI (C-compatible API)
#![allow(clippy::not_unsafe_ptr_arg_deref)]

use std::ptr;
use std::slice;

use volume_sim_core::nalgebra::Point3;
use volume_sim_core::{ExportTransform, Simulation, SimulationConfig};

use crate::error::{DefaultVolumeSimError, VolumeSimErrorCode};
use crate::helpers::{clear_last_error, track_error};

/// C-compatible mirror of `SimulationConfig`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSimConfig {
    pub width: u32,
    pub height: u32,
    pub volume_max: f64,
    pub volume_min: f64,
    pub volume_target: f64,
    pub volume_turbulence: f64,
    pub resistance_coefficient: f64,
    pub gravity: f64,
    pub impact_power: f64,
    pub splash_radius: u32,
}

impl From<SimulationConfig> for VolumeSimConfig {
    fn from(config: SimulationConfig) -> Self {
        Self {
            width: u32::try_from(config.width).unwrap_or(u32::MAX),
            height: u32::try_from(config.height).unwrap_or(u32::MAX),
            volume_max: config.volume_max,
            volume_min: config.volume_min,
            volume_target: config.volume_target,
            volume_turbulence: config.volume_turbulence,
            resistance_coefficient: config.resistance_coefficient,
            gravity: config.gravity,
            impact_power: config.impact_power,
            splash_radius: u32::try_from(config.splash_radius).unwrap_or(u32::MAX),
        }
    }
}

impl From<VolumeSimConfig> for SimulationConfig {
    fn from(config: VolumeSimConfig) -> Self {
        Self {
            width: config.width as usize,
            height: config.height as usize,
            volume_max: config.volume_max,
            volume_min: config.volume_min,
            volume_target: config.volume_target,
            volume_turbulence: config.volume_turbulence,
            resistance_coefficient: config.resistance_coefficient,
            gravity: config.gravity,
            impact_power: config.impact_power,
            splash_radius: config.splash_radius as usize,
        }
    }
}

/// Opaque handle to a volume simulation instance.
///
/// Memory is managed by `volume_sim_new`/`volume_sim_destroy`.
pub struct VolumeSimInstance {
    pub(crate) simulation: Simulation,
}

/// Returns the default configuration (32x32 grid).
#[no_mangle]
pub extern "C" fn volume_sim_default_config() -> VolumeSimConfig {
    SimulationConfig::default().into()
}

/// Creates a new volume simulation instance.
///
/// # Arguments
/// * `config` - Simulation parameters (must not be null)
/// * `seed` - Seed for the turbulence and random-impact generator
/// * `out_instance` - Receives the new instance on success
///
/// # Returns
/// `VolumeSimErrorCode::Ok` on success; otherwise an error code, with details in
/// `volume_sim_get_last_error()`.
///
/// # Safety
/// - `config` and `out_instance` must be valid pointers
/// - Caller owns the returned instance and must call `volume_sim_destroy()`
#[no_mangle]
pub extern "C" fn volume_sim_new(
    config: *const VolumeSimConfig,
    seed: u64,
    out_instance: *mut *mut VolumeSimInstance,
) -> VolumeSimErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultVolumeSimError::null_pointer("out_instance"));
    }
    unsafe { *out_instance = ptr::null_mut() };
    if config.is_null() {
        return track_error(&DefaultVolumeSimError::null_pointer("config"));
    }

    let config = SimulationConfig::from(unsafe { *config });
    match Simulation::new(config, seed) {
        Ok(simulation) => {
            let instance = Box::new(VolumeSimInstance { simulation });
            unsafe { *out_instance = Box::into_raw(instance) };
            clear_last_error()
        }
        Err(e) => track_error(&DefaultVolumeSimError::from(&e)),
    }
}

/// Destroys a simulation instance and frees all memory.
///
/// # Safety
/// - `instance` must have been created by `volume_sim_new()` (null is a no-op)
/// - After this call, `instance` is invalid
#[no_mangle]
pub extern "C" fn volume_sim_destroy(instance: *mut VolumeSimInstance) {
    if !instance.is_null() {
        unsafe {
            let _ = Box::from_raw(instance);
        }
    }
}

fn with_instance<F>(instance: *mut VolumeSimInstance, f: F) -> VolumeSimErrorCode
where
    F: FnOnce(&mut Simulation) -> VolumeSimErrorCode,
{
    if instance.is_null() {
        return track_error(&DefaultVolumeSimError::null_pointer("instance"));
    }
    let instance_ref = unsafe { &mut *instance };
    f(&mut instance_ref.simulation)
}

/// Advances the simulation by one step.
///
/// # Safety
/// `instance` must be a valid pointer from `volume_sim_new()`
#[no_mangle]
pub extern "C" fn volume_sim_step(instance: *mut VolumeSimInstance) -> VolumeSimErrorCode {
    with_instance(instance, |sim| {
        sim.step();
        clear_last_error()
    })
}

/// Sets every cell back to the target volume.
///
/// # Safety
/// `instance` must be a valid pointer from `volume_sim_new()`
#[no_mangle]
pub extern "C" fn volume_sim_reset(instance: *mut VolumeSimInstance) -> VolumeSimErrorCode {
    with_instance(instance, |sim| {
        sim.reset();
        clear_last_error()
    })
}

/// Re-applies turbulence around the target volume.
///
/// # Safety
/// `instance` must be a valid pointer from `volume_sim_new()`
#[no_mangle]
pub extern "C" fn volume_sim_apply_turbulence(
    instance: *mut VolumeSimInstance,
) -> VolumeSimErrorCode {
    with_instance(instance, |sim| {
        sim.apply_turbulence();
        clear_last_error()
    })
}

/// Changes grid dimensions. No-op when unchanged.
///
/// Vertex and triangle buffers must be re-sized by the caller afterwards.
///
/// # Safety
/// `instance` must be a valid pointer from `volume_sim_new()`
#[no_mangle]
pub extern "C" fn volume_sim_resize(
    instance: *mut VolumeSimInstance,
    width: u32,
    height: u32,
) -> VolumeSimErrorCode {
    with_instance(instance, |sim| {
        match sim.resize(width as usize, height as usize) {
            Ok(_) => clear_last_error(),
            Err(e) => track_error(&DefaultVolumeSimError::from(&e)),
        }
    })
}

/// Adds `power` at cell `(x, z)` (mirror-folded).
///
/// # Safety
/// `instance` must be a valid pointer from `volume_sim_new()`
#[no_mangle]
pub extern "C" fn volume_sim_inject_at(
    instance: *mut VolumeSimInstance,
    x: i32,
    z: i32,
    power: f64,
) -> VolumeSimErrorCode {
    with_instance(instance, |sim| {
        if sim.inject_at(x as isize, z as isize, power) {
            clear_last_error()
        } else {
            track_error(&DefaultVolumeSimError::invalid_parameter(format!(
                "Impact power must be finite, got {power}"
            )))
        }
    })
}

/// Adds `power` to every in-grid cell of the splash window around `(x, z)`.
///
/// # Arguments
/// * `out_touched` - Optional; receives the number of cells modified
///
/// # Safety
/// `instance` must be valid; `out_touched` must be null or valid
#[no_mangle]
pub extern "C" fn volume_sim_inject_splash(
    instance: *mut VolumeSimInstance,
    x: i32,
    z: i32,
    power: f64,
    radius: u32,
    out_touched: *mut u32,
) -> VolumeSimErrorCode {
    with_instance(instance, |sim| {
        if !power.is_finite() {
            return track_error(&DefaultVolumeSimError::invalid_parameter(format!(
                "Impact power must be finite, got {power}"
            )));
        }
        let touched = sim.inject_splash(x as isize, z as isize, power, radius as usize);
        if !out_touched.is_null() {
            unsafe { *out_touched = u32::try_from(touched).unwrap_or(u32::MAX) };
        }
        clear_last_error()
    })
}

/// Point impact of the configured power at a random cell.
///
/// # Safety
/// `instance` must be valid; `out_x`/`out_z` must be null or valid
#[no_mangle]
pub extern "C" fn volume_sim_inject_random_point(
    instance: *mut VolumeSimInstance,
    out_x: *mut u32,
    out_z: *mut u32,
) -> VolumeSimErrorCode {
    with_instance(instance, |sim| {
        let (x, z) = sim.inject_random_point();
        write_cell(out_x, out_z, x, z);
        clear_last_error()
    })
}

/// Splash of the configured power and radius at a random cell.
///
/// # Safety
/// `instance` must be valid; `out_x`/`out_z` must be null or valid
#[no_mangle]
pub extern "C" fn volume_sim_inject_random_splash(
    instance: *mut VolumeSimInstance,
    out_x: *mut u32,
    out_z: *mut u32,
) -> VolumeSimErrorCode {
    with_instance(instance, |sim| {
        let ((x, z), _) = sim.inject_random_splash();
        write_cell(out_x, out_z, x, z);
        clear_last_error()
    })
}

fn write_cell(out_x: *mut u32, out_z: *mut u32, x: usize, z: usize) {
    if !out_x.is_null() {
        unsafe { *out_x = x as u32 };
    }
    if !out_z.is_null() {
        unsafe { *out_z = z as u32 };
    }
}

/// Gets grid dimensions.
///
/// # Safety
/// All pointers must be valid
#[no_mangle]
pub extern "C" fn volume_sim_get_dimensions(
    instance: *const VolumeSimInstance,
    out_width: *mut u32,
    out_height: *mut u32,
) -> VolumeSimErrorCode {
    if instance.is_null() {
        return track_error(&DefaultVolumeSimError::null_pointer("instance"));
    }
    if out_width.is_null() || out_height.is_null() {
        return track_error(&DefaultVolumeSimError::null_pointer("out_width/out_height"));
    }
    let (width, height) = unsafe { &*instance }.simulation.dimensions();
    unsafe {
        *out_width = width as u32;
        *out_height = height as u32;
    }
    clear_last_error()
}

/// Copies current volumes (row-major, `width * height` entries) into `out_volumes`.
///
/// # Safety
/// `out_volumes` must point to `len` writable `f64`s
#[no_mangle]
pub extern "C" fn volume_sim_read_volumes(
    instance: *const VolumeSimInstance,
    out_volumes: *mut f64,
    len: usize,
) -> VolumeSimErrorCode {
    if instance.is_null() {
        return track_error(&DefaultVolumeSimError::null_pointer("instance"));
    }
    if out_volumes.is_null() {
        return track_error(&DefaultVolumeSimError::null_pointer("out_volumes"));
    }
    let volumes = unsafe { &*instance }.simulation.volumes();
    if len != volumes.len() {
        return track_error(&DefaultVolumeSimError::buffer_size(
            "out_volumes",
            volumes.len(),
            len,
        ));
    }
    let out = unsafe { slice::from_raw_parts_mut(out_volumes, len) };
    out.copy_from_slice(volumes);
    clear_last_error()
}

/// Writes one `(x, y, z)` vertex per cell into `out_xyz` (`3 * width * height` floats).
///
/// # Arguments
/// * `cell_spacing` - Distance between neighboring vertices
/// * `height_scale` - Multiplier applied to each volume
/// * `centered` - Offset the grid so its middle sits at the origin
///
/// # Safety
/// `out_xyz` must point to `len` writable `f32`s
#[no_mangle]
pub extern "C" fn volume_sim_export_vertices(
    instance: *const VolumeSimInstance,
    cell_spacing: f32,
    height_scale: f32,
    centered: bool,
    out_xyz: *mut f32,
    len: usize,
) -> VolumeSimErrorCode {
    if instance.is_null() {
        return track_error(&DefaultVolumeSimError::null_pointer("instance"));
    }
    if out_xyz.is_null() {
        return track_error(&DefaultVolumeSimError::null_pointer("out_xyz"));
    }
    let sim = &unsafe { &*instance }.simulation;
    let area = sim.grid().area();
    if len != area * 3 {
        return track_error(&DefaultVolumeSimError::buffer_size("out_xyz", area * 3, len));
    }

    let transform = ExportTransform {
        cell_spacing,
        height_scale,
        centered,
    };
    let mut vertices = vec![Point3::origin(); area];
    if let Err(e) = sim.export_vertices(&transform, &mut vertices) {
        return track_error(&DefaultVolumeSimError::from(&e));
    }

    let out = unsafe { slice::from_raw_parts_mut(out_xyz, len) };
    for (dst, v) in out.chunks_exact_mut(3).zip(&vertices) {
        dst.copy_from_slice(&[v.x, v.y, v.z]);
    }
    clear_last_error()
}

/// Number of `u32` indices `volume_sim_write_triangles` produces.
///
/// # Safety
/// `instance` must be a valid pointer from `volume_sim_new()`
#[no_mangle]
pub extern "C" fn volume_sim_triangle_index_count(instance: *const VolumeSimInstance) -> usize {
    if instance.is_null() {
        track_error(&DefaultVolumeSimError::null_pointer("instance"));
        return 0;
    }
    let (width, height) = unsafe { &*instance }.simulation.dimensions();
    clear_last_error();
    (width - 1) * (height - 1) * 6
}

/// Writes the triangle index buffer for the current grid into `out_indices`.
///
/// # Safety
/// `out_indices` must point to `len` writable `u32`s
#[no_mangle]
pub extern "C" fn volume_sim_write_triangles(
    instance: *const VolumeSimInstance,
    out_indices: *mut u32,
    len: usize,
) -> VolumeSimErrorCode {
    if instance.is_null() {
        return track_error(&DefaultVolumeSimError::null_pointer("instance"));
    }
    if out_indices.is_null() {
        return track_error(&DefaultVolumeSimError::null_pointer("out_indices"));
    }
    let indices = match unsafe { &*instance }.simulation.triangles() {
        Ok(indices) => indices,
        Err(e) => return track_error(&DefaultVolumeSimError::from(&e)),
    };
    if len != indices.len() {
        return track_error(&DefaultVolumeSimError::buffer_size(
            "out_indices",
            indices.len(),
            len,
        ));
    }
    let out = unsafe { slice::from_raw_parts_mut(out_indices, len) };
    out.copy_from_slice(&indices);
    clear_last_error()
}
