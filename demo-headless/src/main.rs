use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use volume_sim_core::{Simulation, SimulationConfig, DEFAULT_SPLASH_RADIUS};

/// Volume field simulation demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "volume-sim-demo")]
#[command(about = "Headless volume-field simulation runner", long_about = None)]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = 32)]
    width: usize,

    /// Grid height in cells
    #[arg(long, default_value_t = 32)]
    height: usize,

    /// Number of simulation steps
    #[arg(short, long, default_value_t = 200)]
    steps: u64,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Upper volume bound
    #[arg(long, default_value_t = 20.0)]
    volume_max: f64,

    /// Lower volume bound
    #[arg(long, default_value_t = 10.0)]
    volume_min: f64,

    /// Rest volume
    #[arg(long, default_value_t = 15.0)]
    volume_target: f64,

    /// Initial random perturbation half-width
    #[arg(long, default_value_t = 0.5)]
    turbulence: f64,

    /// Velocity damping in (0, 1]
    #[arg(long, default_value_t = 0.95)]
    resistance: f64,

    /// Gravity scale (negative pulls volume down)
    #[arg(long, default_value_t = -0.05, allow_negative_numbers = true)]
    gravity: f64,

    /// Volume added per impact
    #[arg(long, default_value_t = 5.0)]
    impact_power: f64,

    /// Splash half-width in cells
    #[arg(long, default_value_t = DEFAULT_SPLASH_RADIUS)]
    splash_radius: usize,

    /// Trigger a random splash every N steps (0 = never)
    #[arg(long, default_value_t = 50)]
    splash_every: u64,

    /// Trigger a random point impact every N steps (0 = never)
    #[arg(long, default_value_t = 10)]
    point_every: u64,

    /// Report interval in steps
    #[arg(short, long, default_value_t = 20)]
    report_interval: u64,
}

impl Args {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            width: self.width,
            height: self.height,
            volume_max: self.volume_max,
            volume_min: self.volume_min,
            volume_target: self.volume_target,
            volume_turbulence: self.turbulence,
            resistance_coefficient: self.resistance,
            gravity: self.gravity,
            impact_power: self.impact_power,
            splash_radius: self.splash_radius,
        }
    }
}

fn every(step: u64, interval: u64) -> bool {
    interval != 0 && step % interval == 0
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    println!("=== Volume Field Simulation Demo ===\n");

    let mut sim = match Simulation::new(args.config(), args.seed) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    let (width, height) = sim.dimensions();
    println!("Grid: {width}x{height} ({} cells), seed {}", width * height, args.seed);
    println!(
        "Kernel raw sum: {:.6}, normalized sum: {:.6}\n",
        sim.kernel().raw_sum(),
        sim.kernel().normalized_sum()
    );

    let initial = sim.stats();
    println!(
        "Step {:>5}: min {:>8.4}  max {:>8.4}  mean {:>8.4}  total {:>12.4}",
        0, initial.min, initial.max, initial.mean, initial.total
    );

    for step in 1..=args.steps {
        if every(step, args.splash_every) {
            let ((x, z), touched) = sim.inject_random_splash();
            info!("Splash at ({}, {}) touched {} cells", x, z, touched);
        }
        if every(step, args.point_every) {
            let (x, z) = sim.inject_random_point();
            info!("Point impact at ({}, {})", x, z);
        }

        sim.step();

        if every(step, args.report_interval) || step == args.steps {
            let stats = sim.stats();
            println!(
                "Step {:>5}: min {:>8.4}  max {:>8.4}  mean {:>8.4}  total {:>12.4}  ({:.2}ms/step)",
                step,
                stats.min,
                stats.max,
                stats.mean,
                stats.total,
                sim.timer().average_step_ms()
            );
        }
    }

    println!("\n=== Simulation Complete ===");
    println!("Steps: {}", sim.step_count());
    println!("Average step time: {:.3}ms", sim.timer().average_step_ms());
}
