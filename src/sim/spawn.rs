//! Obstacle and power-up spawn scheduling
//!
//! Obstacles spawn on an eased interval that ramps from the base cadence to
//! the minimum over the ramp window; power-ups respawn on a uniform random
//! gap. Everything spawns ahead of the camera and is destroyed once it falls
//! sufficiently behind it, so the entity vectors stay bounded no matter how
//! long the level runs.

use rand::Rng;

use super::state::{Obstacle, ObstacleKind, PowerKind, Powerup, RunState};
use crate::consts::*;
use crate::{ease_out_cubic, lerp};

/// Spawn scheduler state, owned by the run
#[derive(Debug, Clone, Copy)]
pub struct Spawner {
    /// Next obstacle spawn time
    pub next_spawn_at: f64,
    /// Next power-up spawn time
    pub power_spawn_at: f64,
}

/// Interval until the next obstacle, eased toward the floor over the ramp
pub fn spawn_interval_ms(elapsed_ms: f64) -> f64 {
    let normalized = (elapsed_ms / SPAWN_RAMP_MS).clamp(0.0, 1.0) as f32;
    lerp(
        SPAWN_BASE_INTERVAL_MS as f32,
        SPAWN_MIN_INTERVAL_MS as f32,
        ease_out_cubic(normalized),
    ) as f64
}

/// Run the spawn and cleanup pass for this frame
pub fn update(state: &mut RunState, now: f64) {
    spawn_obstacles(state, now);
    spawn_powerups(state, now);
    cleanup(state);
}

fn spawn_obstacles(state: &mut RunState, now: f64) {
    if now < state.spawner.next_spawn_at {
        return;
    }
    // Safe zone before the finish line: guaranteed clear run-up
    if state.current_level == 1 && state.score > SAFE_ZONE_SCORE {
        return;
    }

    let elapsed = now - state.run_start_at;
    let spawn_x = state.camera_right() + state.rng.random_range(80.0..220.0);
    let allow_high = elapsed > HIGH_OBSTACLE_UNLOCK_MS;
    let kind = if allow_high && state.rng.random_bool(HIGH_OBSTACLE_CHANCE) {
        ObstacleKind::High
    } else {
        ObstacleKind::Low
    };
    let id = state.next_entity_id();
    state.obstacles.push(Obstacle {
        id,
        x: spawn_x,
        foot_y: OBSTACLE_FOOT_Y,
        kind,
    });

    state.spawner.next_spawn_at = now + spawn_interval_ms(elapsed);
}

fn spawn_powerups(state: &mut RunState, now: f64) {
    if now < state.spawner.power_spawn_at {
        return;
    }

    let spawn_x = state.camera_right() + state.rng.random_range(200.0..420.0);
    // Hover above the ground; gravity stays off for power-ups
    let spawn_y = SCREEN_HEIGHT - state.rng.random_range(120.0..180.0);
    let kind = if state.rng.random_bool(0.5) {
        PowerKind::Invincible
    } else {
        PowerKind::JumpBoost
    };
    let id = state.next_entity_id();
    state.powerups.push(Powerup {
        id,
        x: spawn_x,
        y: spawn_y,
        kind,
    });

    state.spawner.power_spawn_at = now + state.rng.random_range(POWER_SPAWN_MIN_MS..POWER_SPAWN_MAX_MS);
}

fn cleanup(state: &mut RunState) {
    let cutoff = state.camera_left() - DESPAWN_MARGIN;
    state.obstacles.retain(|o| o.x >= cutoff);
    state.powerups.retain(|p| p.x >= cutoff);
    if state.finish_line.is_some_and(|f| f.x < cutoff) {
        state.finish_line = None;
    }
}
