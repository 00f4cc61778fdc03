//! Volume Field Property Suite
//!
//! End-to-end checks of the simulation's observable guarantees: clamping, kernel
//! normalization, mirror indexing, determinism, splash bounds, and steady state.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use std::f64::consts::E;
use volume_sim_core::{GridIndexer, Simulation, SimulationConfig};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn example_config() -> SimulationConfig {
    SimulationConfig {
        width: 4,
        height: 4,
        volume_target: 15.0,
        volume_min: 10.0,
        volume_max: 20.0,
        gravity: 0.0,
        resistance_coefficient: 1.0,
        volume_turbulence: 0.0,
        ..Default::default()
    }
}

#[test]
fn test_clamp_invariant_under_heavy_impacts() {
    let config = SimulationConfig {
        volume_turbulence: 3.0,
        impact_power: 40.0,
        splash_radius: 3,
        ..SimulationConfig::default().with_dimensions(12, 10)
    };
    let mut sim = Simulation::new(config, 7).unwrap();

    for step in 0..40 {
        if step % 3 == 0 {
            sim.inject_random_splash();
        } else {
            sim.inject_random_point();
        }
        sim.inject_at(0, 0, -100.0);
        sim.step();
        let stats = sim.stats();
        assert!(stats.min >= 10.0, "step {step}: min {}", stats.min);
        assert!(stats.max <= 20.0, "step {step}: max {}", stats.max);
    }
}

#[test]
fn test_kernel_normalization_4x4() {
    let sim = Simulation::new(example_config(), 0).unwrap();
    let kernel = sim.kernel();
    assert_relative_eq!(kernel.raw_sum(), 7.009295215085431, max_relative = 1e-12);
    assert_relative_eq!(kernel.normalized_sum(), 1.0 / E, max_relative = 1e-12);
}

#[test]
fn test_mirror_indexing() {
    let grid = GridIndexer::new(7, 5).unwrap();
    for z in 0..5 {
        assert_eq!(grid.index(-1, z), grid.index(1, z));
        assert_eq!(grid.index(7, z), grid.index(5, z));
    }
    for x in 0..7 {
        assert_eq!(grid.index(x, -1), grid.index(x, 1));
        assert_eq!(grid.index(x, 5), grid.index(x, 3));
    }
    for z in -20..20 {
        for x in -20..20 {
            assert!(grid.index(x, z) < grid.area());
        }
    }
}

#[test]
fn test_determinism_with_fixed_seed() {
    let config = SimulationConfig::default().with_dimensions(10, 8);

    let run = || {
        let mut sim = Simulation::new(config, 1234).unwrap();
        for step in 0..25 {
            if step % 5 == 0 {
                sim.inject_random_splash();
            }
            sim.inject_random_point();
            sim.step();
        }
        sim.volumes().iter().map(|v| v.to_bits()).collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_different_seeds_diverge() {
    let config = SimulationConfig::default().with_dimensions(8, 8);
    let a = Simulation::new(config, 1).unwrap();
    let b = Simulation::new(config, 2).unwrap();
    assert_ne!(a.volumes(), b.volumes());
}

#[test]
fn test_corner_splash_touches_only_grid_cells() {
    let config = SimulationConfig {
        volume_turbulence: 0.0,
        ..SimulationConfig::default().with_dimensions(30, 25)
    };

    // (center, expected cells) for radius 20 windows
    let cases = [
        ((0, 0), 20 * 20),
        ((29, 24), 21 * 21),
        ((29, 0), 21 * 20),
        ((5, 3), 25 * 23),
    ];
    for ((cx, cz), expected) in cases {
        let mut sim = Simulation::new(config, 0).unwrap();
        let before = sim.total_volume();
        let touched = sim.inject_splash(cx, cz, 1.0, 20);
        assert_eq!(touched, expected, "center ({cx}, {cz})");
        assert_abs_diff_eq!(sim.total_volume() - before, expected as f64, epsilon = 1e-9);
    }
}

#[test]
fn test_steady_state_stays_at_target() {
    let config = SimulationConfig {
        volume_turbulence: 0.0,
        gravity: 0.0,
        resistance_coefficient: 0.8,
        ..SimulationConfig::default().with_dimensions(9, 7)
    };
    let mut sim = Simulation::new(config, 99).unwrap();
    for _ in 0..10 {
        sim.step();
    }
    assert!(sim.volumes().iter().all(|&v| v == config.volume_target));
    assert!(sim.field().velocity().iter().all(|&v| v == 0.0));
}

#[test]
fn test_end_to_end_single_impact() {
    let mut sim = Simulation::new(example_config(), 0).unwrap();
    assert_eq!(sim.volumes(), &[15.0; 16]);

    sim.inject_at(1, 1, 5.0);
    let injected_total = sim.total_volume();
    sim.step();

    let grid = *sim.grid();
    let hit = sim.volume_at(1, 1);
    assert!(hit > 15.0 && hit <= 20.0, "impact cell {hit}");

    let kernel = sim.kernel();
    for z in 0..4_isize {
        for x in 0..4_isize {
            if (x, z) == (1, 1) {
                continue;
            }
            let expected = 15.0 - 5.0 * kernel.weight(grid.index(1 - x, 1 - z));
            assert_relative_eq!(sim.volume_at(x, z), expected, max_relative = 1e-12);
            assert!(sim.volume_at(x, z) <= 15.0);
        }
    }

    // The impact cell overshoots to 25 and is clamped back to 20; the rest of the
    // grid gives up 5/e between them.
    assert_eq!(hit, 20.0);
    let lost = injected_total - sim.total_volume();
    assert_relative_eq!(lost, 5.0 / E, max_relative = 1e-9);
}

#[test]
fn test_malformed_target_never_produces_non_finite() {
    let config = SimulationConfig {
        volume_target: 0.0,
        volume_turbulence: 0.0,
        gravity: -0.5,
        ..SimulationConfig::default().with_dimensions(6, 6)
    };
    let mut sim = Simulation::new(config, 3).unwrap();
    sim.inject_at(2, 2, 12.0);
    for _ in 0..5 {
        sim.step();
        // An unbounded downward pull pins every cell to the floor.
        assert!(sim.volumes().iter().all(|&v| v == config.volume_min));
    }

    let config = SimulationConfig {
        volume_target: -4.0,
        ..config
    };
    let mut sim = Simulation::new(config, 3).unwrap();
    sim.inject_at(2, 2, 12.0);
    for _ in 0..5 {
        sim.step();
        assert!(sim.volumes().iter().all(|v| v.is_finite()));
        assert!(sim
            .volumes()
            .iter()
            .all(|&v| (config.volume_min..=config.volume_max).contains(&v)));
    }
}

#[test]
fn test_config_round_trips_through_json() {
    let config = SimulationConfig {
        gravity: -0.25,
        resistance_coefficient: 0.75,
        splash_radius: 4,
        ..SimulationConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let parsed: SimulationConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);

    // Missing fields fall back to defaults
    let partial: SimulationConfig = serde_json::from_str(r#"{"width": 8}"#).unwrap();
    assert_eq!(partial.width, 8);
    assert_eq!(partial.height, SimulationConfig::default().height);
}
