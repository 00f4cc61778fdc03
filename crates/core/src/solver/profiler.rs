/// Timing helpers for simulation steps.
///
/// `ProfilerScope` measures one section; `StepTimer` keeps the last and running
/// average step time.
use std::time::Instant;

/// Measures elapsed time since construction.
pub struct ProfilerScope {
    start: Instant,
    name: &'static str,
}

impl ProfilerScope {
    /// Starts timing a named section.
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Section name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Gets elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Step timing statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepTimer {
    last_step_ms: f64,
    total_ms: f64,
    steps: u64,
}

impl StepTimer {
    /// Creates an empty timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one step duration in milliseconds.
    pub fn record(&mut self, time_ms: f64) {
        self.last_step_ms = time_ms;
        self.total_ms += time_ms;
        self.steps += 1;
    }

    /// Gets the last recorded step time.
    pub fn last_step_ms(&self) -> f64 {
        self.last_step_ms
    }

    /// Mean step time over every recorded step, or 0 before the first one.
    pub fn average_step_ms(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.total_ms / self.steps as f64
        }
    }

    /// Number of recorded steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}
