//! Bussi Runner - a side-scrolling auto-runner
//!
//! Core modules:
//! - `sim`: Deterministic gameplay core (run state, per-frame step, spawning, collisions)
//! - `session`: Scene lifecycle - game over sequence, initials entry, restart
//! - `leaderboard`: Shared top-5 scores with offline fallback

pub mod leaderboard;
pub mod session;
pub mod sim;

pub use leaderboard::{HighScoreEntry, Leaderboard};
pub use session::{Session, SessionPhase};

/// Game tuning constants
pub mod consts {
    /// Visible window
    pub const SCREEN_WIDTH: f32 = 960.0;
    pub const SCREEN_HEIGHT: f32 = 540.0;
    /// The level extends far beyond the visible window
    pub const LEVEL_WIDTH: f32 = 20000.0;
    /// Top of the ground tiles; the player's feet rest here
    pub const FLOOR_Y: f32 = SCREEN_HEIGHT - 56.0;
    /// Baseline obstacles stand on
    pub const OBSTACLE_FOOT_Y: f32 = SCREEN_HEIGHT - 70.0;
    pub const PLAYER_START_X: f32 = 120.0;

    /// Player hitbox, slightly smaller than the 60x48 visual
    pub const PLAYER_WIDTH: f32 = 50.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;

    /// Vertical physics (pixels/s^2, pixels/s)
    pub const GRAVITY: f32 = 1200.0;
    /// Extra gravity applied when falling for snappier landings
    pub const FALL_GRAVITY_BOOST: f32 = 420.0;
    pub const MAX_FALL_SPEED: f32 = 1000.0;

    /// Launch velocity (negative = upward)
    pub const BASE_JUMP_VELOCITY: f32 = -660.0;
    /// Releasing jump early multiplies upward speed for tighter short hops
    pub const JUMP_CUT_MULTIPLIER: f32 = 0.35;
    /// Leeway after leaving the ground (ms)
    pub const COYOTE_TIME_MS: f64 = 120.0;
    /// Window to buffer jump input before landing (ms)
    pub const JUMP_BUFFER_MS: f64 = 120.0;

    /// Forward speed ramp: starts at base, eases up to max over the ramp window
    pub const BASE_SPEED: f32 = 260.0;
    pub const MAX_SPEED: f32 = 520.0;
    pub const SPEED_RAMP_MS: f64 = 30_000.0;
    /// Up to this much speed comes from the time ramp alone
    pub const SPEED_RAMP_BONUS: f32 = 180.0;
    /// Additional speed per 100 points of score
    pub const SCORE_SPEED_FACTOR: f32 = 0.25;

    /// Obstacle spawn cadence (ms); interval eases from base toward min
    pub const SPAWN_BASE_INTERVAL_MS: f64 = 1400.0;
    pub const SPAWN_MIN_INTERVAL_MS: f64 = 700.0;
    pub const SPAWN_RAMP_MS: f64 = 30_000.0;
    pub const FIRST_SPAWN_DELAY_MS: f64 = 800.0;
    /// High obstacles unlock after a short warm-up
    pub const HIGH_OBSTACLE_UNLOCK_MS: f64 = 3000.0;
    pub const HIGH_OBSTACLE_CHANCE: f64 = 0.25;
    /// Entities this far behind the camera's left edge are destroyed
    pub const DESPAWN_MARGIN: f32 = 200.0;

    /// Power-up spawn gap, uniform between min and max (ms)
    pub const POWER_SPAWN_MIN_MS: f64 = 5000.0;
    pub const POWER_SPAWN_MAX_MS: f64 = 9000.0;
    pub const JUMP_BOOST_MULTIPLIER: f32 = 1.25;
    pub const JUMP_BOOST_DURATION_MS: f64 = 4000.0;

    /// Mid-air fast-fall spin
    pub const SPIN_DURATION_MS: f64 = 350.0;
    pub const SPIN_COOLDOWN_MS: f64 = 650.0;
    pub const FAST_FALL_MIN_SPEED: f32 = 600.0;

    /// Score is derived from distance travelled
    pub const SCORE_PER_PIXEL: f32 = 0.1;
    /// Level 1 -> 2 transition fires at this score
    pub const LEVEL_TWO_SCORE: u32 = 500;
    /// Obstacle spawning stops above this score on level 1 (clear run-up)
    pub const SAFE_ZONE_SCORE: u32 = 400;
    /// Spawn pause right after the transition
    pub const TRANSITION_SPAWN_PAUSE_MS: f64 = 3000.0;
}

/// Quadratic ease-out: fast start, smooth approach to 1
#[inline]
pub fn ease_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Cubic ease-out
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let u = 1.0 - t;
    1.0 - u * u * u
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
