//! Collision detection and resolution
//!
//! Runs after the state machine and spawner each frame. Blocking obstacle
//! hits either consume the shield or end the run; power-up overlaps only
//! enqueue intents that the next step applies, so collections are never
//! mutated mid-resolution. The resolver reports outcomes and never touches
//! the session phase itself.

use glam::Vec2;

use super::state::RunState;
use crate::consts::*;

/// Axis-aligned box given by center and half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        let delta = (self.center - other.center).abs();
        let reach = self.half + other.half;
        delta.x < reach.x && delta.y < reach.y
    }
}

/// What the collision pass did this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    /// Fatal hit: physics frozen, run is over
    pub died: bool,
    /// Shield absorbed a hit and deactivated
    pub shield_spent: bool,
    /// Power-ups collected (activation is deferred one tick)
    pub pickups: u32,
    /// Finish-line overlap advanced the level
    pub level_completed: bool,
}

/// Resolve player-vs-world overlaps for this frame
pub fn resolve_collisions(state: &mut RunState, now: f64) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();
    let Some(player_box) = state.player.as_ref().map(|p| p.hitbox()) else {
        return outcome;
    };
    if state.physics_frozen {
        return outcome;
    }

    // Power-up overlap: destroy now, activate next step. Deferring keeps the
    // overlap pass free of effect side-channels.
    let pending = &mut state.pending_pickups;
    state.powerups.retain(|power| {
        if power.hitbox().intersects(&player_box) {
            pending.push(power.kind);
            outcome.pickups += 1;
            false
        } else {
            true
        }
    });

    // Finish-line overlap: one-shot level advance plus a short spawn pause
    if state.current_level == 1
        && let Some(finish) = state.finish_line
        && finish.hitbox().intersects(&player_box)
    {
        state.current_level = 2;
        state.spawner.next_spawn_at = now + TRANSITION_SPAWN_PAUSE_MS;
        outcome.level_completed = true;
        log::info!("level 2 reached at score {}", state.score);
    }

    // Blocking obstacles
    let hit = state
        .obstacles
        .iter()
        .position(|o| o.hitbox().intersects(&player_box));
    if let Some(idx) = hit {
        if state.is_invincible() {
            // Single-hit shield: consume it and the obstacle, keep running
            state.active_power = None;
            state.obstacles.remove(idx);
            outcome.shield_spent = true;
        } else {
            outcome.died = true;
            state.physics_frozen = true;
            if let Some(player) = state.player.as_mut() {
                player.vel = Vec2::ZERO;
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{
        ActivePower, FinishLine, Obstacle, ObstacleKind, PowerKind, Powerup,
    };

    fn obstacle_at_player(state: &RunState) -> Obstacle {
        let pos = state.player.as_ref().unwrap().pos;
        Obstacle {
            id: 99,
            x: pos.x,
            foot_y: FLOOR_Y,
            kind: ObstacleKind::Low,
        }
    }

    #[test]
    fn test_aabb_intersects() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(15.0, 0.0), Vec2::new(10.0, 10.0));
        let c = Aabb::new(Vec2::new(25.0, 0.0), Vec2::new(4.0, 4.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        // Touching edges do not count as overlap
        let d = Aabb::new(Vec2::new(20.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(!a.intersects(&d));
    }

    #[test]
    fn test_fatal_hit_freezes_physics() {
        let mut state = RunState::new(1, 0.0);
        let obstacle = obstacle_at_player(&state);
        state.obstacles.push(obstacle);

        let outcome = resolve_collisions(&mut state, 100.0);
        assert!(outcome.died);
        assert!(!outcome.shield_spent);
        assert!(state.physics_frozen);
        assert_eq!(state.player.as_ref().unwrap().vel, Vec2::ZERO);
        // The obstacle is not destroyed by a fatal hit
        assert_eq!(state.obstacles.len(), 1);
    }

    #[test]
    fn test_shield_consumes_exactly_one_hit() {
        let mut state = RunState::new(1, 0.0);
        state.active_power = Some(ActivePower::invincible());
        let obstacle = obstacle_at_player(&state);
        state.obstacles.push(obstacle.clone());

        let outcome = resolve_collisions(&mut state, 100.0);
        assert!(outcome.shield_spent);
        assert!(!outcome.died);
        assert!(state.active_power.is_none());
        assert!(state.obstacles.is_empty());
        assert!(!state.physics_frozen);

        // Second hit without the shield is fatal
        state.obstacles.push(obstacle);
        let outcome = resolve_collisions(&mut state, 200.0);
        assert!(outcome.died);
    }

    #[test]
    fn test_pickup_is_deferred_one_tick() {
        let mut state = RunState::new(1, 0.0);
        let pos = state.player.as_ref().unwrap().pos;
        state.powerups.push(Powerup {
            id: 7,
            x: pos.x,
            y: pos.y,
            kind: PowerKind::JumpBoost,
        });

        let outcome = resolve_collisions(&mut state, 100.0);
        assert_eq!(outcome.pickups, 1);
        assert!(state.powerups.is_empty());
        // Not active yet: only the intent is queued
        assert!(state.active_power.is_none());
        assert_eq!(state.pending_pickups, vec![PowerKind::JumpBoost]);
    }

    #[test]
    fn test_finish_line_advances_level_once() {
        let mut state = RunState::new(1, 0.0);
        let pos = state.player.as_ref().unwrap().pos;
        state.finish_line = Some(FinishLine { x: pos.x });
        state.spawner.next_spawn_at = 0.0;

        let outcome = resolve_collisions(&mut state, 5000.0);
        assert!(outcome.level_completed);
        assert_eq!(state.current_level, 2);
        // Post-transition spawn pause
        assert_eq!(state.spawner.next_spawn_at, 5000.0 + TRANSITION_SPAWN_PAUSE_MS);

        // Still overlapping next frame: no second transition
        let outcome = resolve_collisions(&mut state, 5016.0);
        assert!(!outcome.level_completed);
        assert_eq!(state.current_level, 2);
    }

    #[test]
    fn test_no_player_is_a_noop() {
        let mut state = RunState::new(1, 0.0);
        state.player = None;
        state.powerups.push(Powerup {
            id: 1,
            x: 0.0,
            y: 0.0,
            kind: PowerKind::Invincible,
        });
        let outcome = resolve_collisions(&mut state, 100.0);
        assert_eq!(outcome, CollisionOutcome::default());
        assert_eq!(state.powerups.len(), 1);
    }

    #[test]
    fn test_frozen_world_resolves_nothing() {
        let mut state = RunState::new(1, 0.0);
        state.physics_frozen = true;
        let obstacle = obstacle_at_player(&state);
        state.obstacles.push(obstacle);
        let outcome = resolve_collisions(&mut state, 100.0);
        assert!(!outcome.died);
    }
}
