//! Per-frame run state machine
//!
//! `step` advances one frame in a fixed phase order; later phases read state
//! set by earlier ones, so the order is load-bearing:
//!
//! 1. apply pickup intents deferred from last frame's collision pass
//! 2. score update (derived from distance)
//! 3. level-transition check (one-shot)
//! 4. speed ramp (eased, clamped)
//! 5. input resolution + vertical physics (buffered/coyote jumps, jump cut,
//!    fast-fall spin, falling gravity boost, ground clamp)
//! 6. obstacle/power-up spawn and cleanup
//! 7. timed power expiry
//! 8. spin timer expiry
//! 9. display-state classification for the renderer
//! 10. power-ring bookkeeping for the HUD
//!
//! All time reads use the single `now` passed in, so no two phases can
//! disagree about the clock. With no player body installed the whole step is
//! a no-op.

use super::spawn;
use super::state::{ActivePower, DisplayState, FinishLine, PowerKind, RunState};
use crate::consts::*;
use crate::ease_out_quad;

/// Edge-triggered input events for a single frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Jump key went down this frame
    pub jump_pressed: bool,
    /// Jump key went up this frame
    pub jump_released: bool,
    /// Down key went down this frame
    pub down_pressed: bool,
    /// Pointer tap; reuses the buffered jump path during play
    pub pointer_down: bool,
}

/// Noteworthy things a step did, for the session controller and logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepEvents {
    /// A deferred pickup became the active power this frame
    pub power_activated: Option<PowerKind>,
    /// The timed power expired this frame
    pub power_expired: bool,
    /// The one-shot level transition fired this frame
    pub transition_triggered: bool,
    /// A buffered or coyote jump launched this frame
    pub jumped: bool,
}

/// Forward speed for a given elapsed run time and score, clamped to
/// [BASE_SPEED, MAX_SPEED]
pub fn runner_speed(elapsed_ms: f64, score: u32) -> f32 {
    let normalized = (elapsed_ms / SPEED_RAMP_MS).clamp(0.0, 1.0) as f32;
    let ramp_from_time = ease_out_quad(normalized) * SPEED_RAMP_BONUS;
    let score_boost = (score as f32 / 100.0) * SCORE_SPEED_FACTOR;
    (BASE_SPEED + ramp_from_time + score_boost).clamp(BASE_SPEED, MAX_SPEED)
}

/// Advance the run by one frame
pub fn step(state: &mut RunState, input: &FrameInput, now: f64, dt: f32) -> StepEvents {
    let mut events = StepEvents::default();
    if state.player.is_none() || state.physics_frozen {
        return events;
    }

    apply_pending_pickups(state, now, &mut events);
    update_score(state);
    check_level_transition(state, &mut events);
    state.player_speed = runner_speed(now - state.run_start_at, state.score);
    handle_input(state, input, now, dt, &mut events);
    spawn::update(state, now);
    expire_power(state, now, &mut events);
    expire_spin(state, now);
    classify_display_state(state);
    state.power_ring_fraction = state
        .active_power
        .map(|p| p.remaining_fraction(now))
        .unwrap_or(0.0);
    events
}

/// Apply pickup intents queued by last frame's collision pass. Exactly one
/// power may be live; acquiring the other kind while one is active is
/// ignored, and re-grabbing the boost refreshes its window.
fn apply_pending_pickups(state: &mut RunState, now: f64, events: &mut StepEvents) {
    for kind in std::mem::take(&mut state.pending_pickups) {
        match kind {
            PowerKind::Invincible => {
                if state.active_power.is_some() {
                    log::debug!("ignoring shield pickup, a power is already active");
                    continue;
                }
                state.active_power = Some(ActivePower::invincible());
                events.power_activated = Some(kind);
                log::info!("shield up");
            }
            PowerKind::JumpBoost => {
                if state.is_invincible() {
                    log::debug!("ignoring jump boost pickup while shielded");
                    continue;
                }
                state.active_power = Some(ActivePower::jump_boost(now));
                state.jump_velocity = BASE_JUMP_VELOCITY * JUMP_BOOST_MULTIPLIER;
                events.power_activated = Some(kind);
                log::info!("jump boost active");
            }
        }
    }
}

fn update_score(state: &mut RunState) {
    let Some(player) = state.player.as_ref() else {
        return;
    };
    let distance_score = (player.pos.x * SCORE_PER_PIXEL).floor() as u32;
    if distance_score != state.score {
        state.score = distance_score;
    }
}

fn check_level_transition(state: &mut RunState, events: &mut StepEvents) {
    if state.current_level == 1
        && state.score >= LEVEL_TWO_SCORE
        && !state.level_transition_triggered
    {
        state.level_transition_triggered = true;
        state.finish_line = Some(FinishLine {
            x: state.camera_right() + 100.0,
        });
        events.transition_triggered = true;
        log::info!("finish line ahead at score {}", state.score);
    }
}

fn handle_input(
    state: &mut RunState,
    input: &FrameInput,
    now: f64,
    dt: f32,
    events: &mut StepEvents,
) {
    if input.pointer_down {
        state.pointer_jump_queued = true;
    }

    let Some(player) = state.player.as_mut() else {
        return;
    };

    let on_ground = player.on_ground;
    if on_ground {
        state.last_grounded_at = now;
    }

    // Auto-run forward; no manual horizontal input in runner mode
    player.vel.x = state.player_speed;

    // Buffer jump input; the pointer queue feeds the same path
    let pointer_queued = std::mem::take(&mut state.pointer_jump_queued);
    let jump_pressed = input.jump_pressed || pointer_queued;
    if jump_pressed {
        state.jump_buffered_at = now;
    }

    let buffered_still_valid =
        state.jump_buffered_at != 0.0 && now - state.jump_buffered_at <= JUMP_BUFFER_MS;
    let can_use_buffered_jump = state.jump_buffered_at != 0.0
        && (on_ground
            || (state.last_grounded_at != 0.0 && now - state.last_grounded_at <= COYOTE_TIME_MS));

    if buffered_still_valid && can_use_buffered_jump {
        player.vel.y = state.jump_velocity;
        player.on_ground = false;
        state.jump_buffered_at = 0.0;
        events.jumped = true;
    }

    // Variable jump height: releasing jump early shortens airtime
    if input.jump_released && player.vel.y < 0.0 {
        player.vel.y *= JUMP_CUT_MULTIPLIER;
    }

    // Mid-air fast-fall spin with cooldown
    if input.down_pressed && !player.on_ground && !state.is_spinning && now >= state.spin_cooldown_at
    {
        state.is_spinning = true;
        state.spin_end_at = now + SPIN_DURATION_MS;
        state.spin_cooldown_at = now + SPIN_COOLDOWN_MS;
        player.vel.y = player.vel.y.max(FAST_FALL_MIN_SPEED);
    }

    // Stronger gravity when falling for snappier landings
    let falling = player.vel.y > 0.0 && !player.on_ground;
    let gravity = if falling {
        GRAVITY + FALL_GRAVITY_BOOST
    } else {
        GRAVITY
    };
    player.vel.y = (player.vel.y + gravity * dt).min(MAX_FALL_SPEED);

    player.pos += player.vel * dt;
    player.pos.x = player.pos.x.min(LEVEL_WIDTH - PLAYER_WIDTH / 2.0);

    // Ground clamp doubles as grounded detection
    let floor_center = FLOOR_Y - PLAYER_HEIGHT / 2.0;
    if player.pos.y >= floor_center {
        player.pos.y = floor_center;
        player.vel.y = 0.0;
        player.on_ground = true;
    } else {
        player.on_ground = false;
    }
}

fn expire_power(state: &mut RunState, now: f64, events: &mut StepEvents) {
    if let Some(power) = state.active_power
        && power.duration_ms > 0.0
        && now >= power.ends_at
    {
        state.active_power = None;
        state.jump_velocity = BASE_JUMP_VELOCITY;
        events.power_expired = true;
        log::debug!("timed power expired");
    }
}

fn expire_spin(state: &mut RunState, now: f64) {
    if state.is_spinning && now >= state.spin_end_at {
        state.is_spinning = false;
    }
}

fn classify_display_state(state: &mut RunState) {
    let Some(player) = state.player.as_ref() else {
        return;
    };
    state.display_state = if !player.on_ground {
        DisplayState::Jump
    } else if player.vel.x.abs() > 20.0 {
        DisplayState::Move
    } else {
        DisplayState::Idle
    };
}
