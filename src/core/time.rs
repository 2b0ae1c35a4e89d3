//! Simulation tick timing

/// Maximum delta time accepted for a single tick, in seconds.
///
/// A stalled host frame (debugger pause, window drag) would otherwise feed
/// one enormous dt into the simulation and launch every body into orbit.
pub const MAX_TICK_DT: f32 = 0.1;

/// Tracks simulation time across ticks with a clamped delta.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    tick: u64,
    elapsed: f32,
    last_dt: f32,
}

impl TickClock {
    pub fn new() -> Self {
        Self {
            tick: 0,
            elapsed: 0.0,
            last_dt: 0.0,
        }
    }

    /// Advance one tick by `dt` seconds and return the clamped delta.
    ///
    /// Negative and non-finite deltas are treated as zero.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_TICK_DT)
        } else {
            0.0
        };
        self.tick += 1;
        self.elapsed += dt;
        self.last_dt = dt;
        dt
    }

    /// Tick count since creation.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Total simulated seconds.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Delta used by the most recent tick.
    pub fn last_dt(&self) -> f32 {
        self.last_dt
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}
