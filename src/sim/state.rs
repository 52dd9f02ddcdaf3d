//! Run state and entity types
//!
//! Everything that must reset cleanly on restart lives on `RunState`.
//! Restart discards the whole value and builds a new one; no field is ever
//! patched back to a default.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::Aabb;
use super::spawn::Spawner;
use crate::consts::*;

/// Power-up kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerKind {
    /// Single-hit shield: nullifies exactly one obstacle hit
    Invincible,
    /// Higher launch velocity for a fixed window
    JumpBoost,
}

/// The one live power-up effect, if any
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivePower {
    pub kind: PowerKind,
    /// When the effect expires; 0 for the untimed shield
    pub ends_at: f64,
    pub duration_ms: f64,
}

impl ActivePower {
    pub fn invincible() -> Self {
        Self {
            kind: PowerKind::Invincible,
            ends_at: 0.0,
            duration_ms: 0.0,
        }
    }

    pub fn jump_boost(now: f64) -> Self {
        Self {
            kind: PowerKind::JumpBoost,
            ends_at: now + JUMP_BOOST_DURATION_MS,
            duration_ms: JUMP_BOOST_DURATION_MS,
        }
    }

    /// Remaining fraction of a timed effect, for the HUD ring
    pub fn remaining_fraction(&self, now: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 0.0;
        }
        ((self.ends_at - now) / self.duration_ms).clamp(0.0, 1.0) as f32
    }
}

/// Obstacle kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Traffic cone, jumpable from the start
    Low,
    /// Tall barrier, unlocked after a warm-up period
    High,
}

/// A blocking obstacle standing on the ground
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: u32,
    pub x: f32,
    pub foot_y: f32,
    pub kind: ObstacleKind,
}

impl Obstacle {
    /// Collision box, inset from the visual for fairness
    pub fn hitbox(&self) -> Aabb {
        match self.kind {
            // Cone: 26x36 box inside the 46x46 visual
            ObstacleKind::Low => Aabb::new(
                Vec2::new(self.x, self.foot_y - 22.0),
                Vec2::new(13.0, 18.0),
            ),
            // Barrier: 40x80 box inside the 46x90 visual
            ObstacleKind::High => Aabb::new(
                Vec2::new(self.x, self.foot_y - 40.0),
                Vec2::new(20.0, 40.0),
            ),
        }
    }
}

/// A collectible power-up hovering above the ground (gravity-free)
#[derive(Debug, Clone)]
pub struct Powerup {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub kind: PowerKind,
}

impl Powerup {
    pub fn hitbox(&self) -> Aabb {
        Aabb::new(Vec2::new(self.x, self.y), Vec2::splat(16.0))
    }
}

/// Finish-line marker for the level 1 -> 2 transition
#[derive(Debug, Clone, Copy)]
pub struct FinishLine {
    pub x: f32,
}

impl FinishLine {
    pub fn hitbox(&self) -> Aabb {
        // 100x200 arch standing on the floor
        Aabb::new(Vec2::new(self.x, FLOOR_Y - 100.0), Vec2::new(50.0, 100.0))
    }
}

/// Display classification for the rendering collaborator; no gameplay effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    Idle,
    Move,
    Jump,
}

/// Player kinematics; `pos` is the body center
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub on_ground: bool,
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, FLOOR_Y - PLAYER_HEIGHT / 2.0),
            vel: Vec2::ZERO,
            on_ground: true,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(PLAYER_WIDTH / 2.0, PLAYER_HEIGHT / 2.0))
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete per-run state. Recreated wholesale on restart.
#[derive(Debug, Clone)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Run RNG; all spawn randomness flows through it
    pub rng: Pcg32,
    /// None until a body is installed; every step no-ops without one
    pub player: Option<Player>,
    /// Forward speed, clamped to [BASE_SPEED, MAX_SPEED]
    pub player_speed: f32,
    pub run_start_at: f64,
    /// Coyote/buffer timers; 0 means unset
    pub last_grounded_at: f64,
    pub jump_buffered_at: f64,
    /// Pointer taps reuse the buffered jump path
    pub pointer_jump_queued: bool,
    /// Mutated by jump boost, restored on expiry
    pub jump_velocity: f32,
    pub is_spinning: bool,
    pub spin_end_at: f64,
    pub spin_cooldown_at: f64,
    /// Derived each frame as floor(pos.x * SCORE_PER_PIXEL)
    pub score: u32,
    /// 1 or 2; the transition never reverts
    pub current_level: u8,
    pub level_transition_triggered: bool,
    /// At most one live effect at a time
    pub active_power: Option<ActivePower>,
    pub obstacles: Vec<Obstacle>,
    pub powerups: Vec<Powerup>,
    pub finish_line: Option<FinishLine>,
    pub spawner: Spawner,
    /// Pickup intents queued by the collision pass, applied next step
    pub pending_pickups: Vec<PowerKind>,
    pub display_state: DisplayState,
    /// Remaining fraction of the active timed power, for the HUD
    pub power_ring_fraction: f32,
    /// Set on the fatal hit; stops all movement and therefore scoring
    pub physics_frozen: bool,
    next_id: u32,
}

impl RunState {
    /// Create a fresh run starting at `now`
    pub fn new(seed: u64, now: f64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let power_spawn_at = now + rng.random_range(POWER_SPAWN_MIN_MS..POWER_SPAWN_MAX_MS);
        Self {
            seed,
            rng,
            player: Some(Player::new()),
            player_speed: BASE_SPEED,
            run_start_at: now,
            last_grounded_at: 0.0,
            jump_buffered_at: 0.0,
            pointer_jump_queued: false,
            jump_velocity: BASE_JUMP_VELOCITY,
            is_spinning: false,
            spin_end_at: 0.0,
            spin_cooldown_at: 0.0,
            score: 0,
            current_level: 1,
            level_transition_triggered: false,
            active_power: None,
            obstacles: Vec::new(),
            powerups: Vec::new(),
            finish_line: None,
            spawner: Spawner {
                next_spawn_at: now + FIRST_SPAWN_DELAY_MS,
                power_spawn_at,
            },
            pending_pickups: Vec::new(),
            display_state: DisplayState::Idle,
            power_ring_fraction: 0.0,
            physics_frozen: false,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Left edge of the camera window (follows the player, clamped to the level)
    pub fn camera_left(&self) -> f32 {
        let px = self
            .player
            .as_ref()
            .map(|p| p.pos.x)
            .unwrap_or(PLAYER_START_X);
        (px - SCREEN_WIDTH * 0.35).clamp(0.0, LEVEL_WIDTH - SCREEN_WIDTH)
    }

    /// Right edge of the camera window; spawns land beyond it
    pub fn camera_right(&self) -> f32 {
        self.camera_left() + SCREEN_WIDTH
    }

    pub fn is_invincible(&self) -> bool {
        matches!(
            self.active_power,
            Some(ActivePower {
                kind: PowerKind::Invincible,
                ..
            })
        )
    }

    pub fn is_jump_boosted(&self) -> bool {
        matches!(
            self.active_power,
            Some(ActivePower {
                kind: PowerKind::JumpBoost,
                ..
            })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let state = RunState::new(42, 1000.0);
        assert_eq!(state.score, 0);
        assert_eq!(state.current_level, 1);
        assert!(!state.level_transition_triggered);
        assert!(state.active_power.is_none());
        assert!(state.obstacles.is_empty());
        assert_eq!(state.player_speed, BASE_SPEED);
        assert_eq!(state.jump_velocity, BASE_JUMP_VELOCITY);
        // First obstacle is delayed, first power-up lands in its window
        assert_eq!(state.spawner.next_spawn_at, 1000.0 + FIRST_SPAWN_DELAY_MS);
        assert!(state.spawner.power_spawn_at >= 1000.0 + POWER_SPAWN_MIN_MS);
        assert!(state.spawner.power_spawn_at <= 1000.0 + POWER_SPAWN_MAX_MS);
    }

    #[test]
    fn test_same_seed_same_run() {
        let a = RunState::new(7, 0.0);
        let b = RunState::new(7, 0.0);
        assert_eq!(a.spawner.power_spawn_at, b.spawner.power_spawn_at);
    }

    #[test]
    fn test_camera_clamps_to_level() {
        let mut state = RunState::new(1, 0.0);
        assert_eq!(state.camera_left(), 0.0);
        state.player.as_mut().unwrap().pos.x = LEVEL_WIDTH;
        assert_eq!(state.camera_left(), LEVEL_WIDTH - SCREEN_WIDTH);
    }

    #[test]
    fn test_hitboxes_smaller_than_visuals() {
        let low = Obstacle {
            id: 1,
            x: 0.0,
            foot_y: OBSTACLE_FOOT_Y,
            kind: ObstacleKind::Low,
        };
        let high = Obstacle {
            id: 2,
            x: 0.0,
            foot_y: OBSTACLE_FOOT_Y,
            kind: ObstacleKind::High,
        };
        // Low visual is 46x46, high is 46x90
        assert!(low.hitbox().half.x * 2.0 < 46.0);
        assert!(low.hitbox().half.y * 2.0 < 46.0);
        assert!(high.hitbox().half.x * 2.0 < 46.0);
        assert!(high.hitbox().half.y * 2.0 < 90.0);
    }

    #[test]
    fn test_power_ring_fraction() {
        let power = ActivePower::jump_boost(1000.0);
        assert!((power.remaining_fraction(1000.0) - 1.0).abs() < 1e-6);
        assert!((power.remaining_fraction(3000.0) - 0.5).abs() < 1e-6);
        assert_eq!(power.remaining_fraction(6000.0), 0.0);
        // The untimed shield has no ring
        assert_eq!(ActivePower::invincible().remaining_fraction(0.0), 0.0);
    }
}
