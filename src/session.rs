//! Session controller: run lifecycle and the game-over sequence
//!
//! The phase enum makes the lifecycle explicit; invalid flag combinations
//! cannot be represented. While any phase other than `Playing` is active,
//! gameplay input is gated off entirely: no step, no spawn, no collision
//! pass. Restart rebuilds the whole `RunState` from a fresh seed rather than
//! patching fields, so stale timers cannot leak across runs.

use crate::leaderboard::{HighScoreEntry, Leaderboard, ScoreService};
use crate::sim::{self, FrameInput, RunState, StepEvents};

/// Number of initials slots on the entry screen
pub const INITIALS_SLOTS: usize = 6;

/// Label substituted when the player confirms blank initials
pub const BLANK_INITIALS_LABEL: &str = "PLAYER";

const SLOT_PLACEHOLDER: char = '_';

/// Seed mix for successive runs (LCG step)
const SEED_MUL: u64 = 6364136223846793005;
const SEED_ADD: u64 = 1442695040888963407;

/// Keyboard input while entering initials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialsKey {
    /// A-Z; anything else is ignored
    Letter(char),
    Backspace,
    Confirm,
}

/// Touch input while entering initials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialsTap {
    /// Cycle the current slot through the alphabet
    Left,
    /// Advance past the current slot; confirms on an empty slot or a full row
    Right,
}

/// In-progress initials entry, up to six slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialsEntry {
    slots: [char; INITIALS_SLOTS],
    cursor: usize,
}

impl InitialsEntry {
    pub fn new() -> Self {
        Self {
            slots: [SLOT_PLACEHOLDER; INITIALS_SLOTS],
            cursor: 0,
        }
    }

    /// Slots as shown on screen, placeholders included
    pub fn display(&self) -> String {
        self.slots.iter().collect()
    }

    pub fn push_letter(&mut self, letter: char) {
        if !letter.is_ascii_alphabetic() || self.cursor >= INITIALS_SLOTS {
            return;
        }
        self.slots[self.cursor] = letter.to_ascii_uppercase();
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
        self.slots[self.cursor] = SLOT_PLACEHOLDER;
    }

    /// Cycle the current slot one letter forward, wrapping Z back to A
    pub fn cycle_current(&mut self) {
        if self.cursor >= INITIALS_SLOTS {
            return;
        }
        self.slots[self.cursor] = match self.slots[self.cursor] {
            SLOT_PLACEHOLDER => 'A',
            'Z' => 'A',
            c => (c as u8 + 1) as char,
        };
    }

    /// Move past the current slot. Returns true when this tap confirms the
    /// entry instead: the row is full, or the current slot was never cycled.
    pub fn advance(&mut self) -> bool {
        if self.cursor >= INITIALS_SLOTS || self.slots[self.cursor] == SLOT_PLACEHOLDER {
            return true;
        }
        self.cursor += 1;
        false
    }

    /// Final initials: trailing placeholders trimmed, blank falls back to
    /// the default label
    pub fn finalize(&self) -> String {
        let typed: String = self.slots.iter().collect();
        let typed = typed.trim_end_matches(SLOT_PLACEHOLDER);
        if typed.is_empty() {
            BLANK_INITIALS_LABEL.to_string()
        } else {
            typed.to_string()
        }
    }
}

impl Default for InitialsEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    /// Normal frame loop: step, spawn, resolve
    Playing,
    /// Fatal hit registered; the next frame resolves qualification
    Dying { score: u32 },
    /// Qualified: collecting initials, gameplay input gated off
    EnteringInitials { score: u32, entry: InitialsEntry },
    /// Final standings on screen, waiting for a restart trigger
    ShowingPanel { top: Vec<HighScoreEntry> },
    /// One-frame guard against duplicate restart triggers
    Restarting,
}

/// Owns the run state, the phase, and the leaderboard facade
pub struct Session<S: ScoreService> {
    state: RunState,
    phase: SessionPhase,
    leaderboard: Leaderboard<S>,
    seed: u64,
}

impl<S: ScoreService> Session<S> {
    pub fn new(seed: u64, now: f64, service: S) -> Self {
        Self {
            state: RunState::new(seed, now),
            phase: SessionPhase::Playing,
            leaderboard: Leaderboard::new(service),
            seed,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    /// Advance the session one frame. Gameplay only runs in `Playing`; the
    /// other phases either resolve the game-over sequence or wait on input.
    pub fn frame(&mut self, input: &FrameInput, now: f64, dt: f32) -> StepEvents {
        match &self.phase {
            SessionPhase::Playing => {
                let events = sim::step(&mut self.state, input, now, dt);
                let outcome = sim::resolve_collisions(&mut self.state, now);
                if outcome.died {
                    log::info!("run over at score {}", self.state.score);
                    self.phase = SessionPhase::Dying {
                        score: self.state.score,
                    };
                }
                events
            }
            SessionPhase::Dying { score } => {
                // Qualification happens exactly once, here
                let score = *score;
                if self.leaderboard.qualifies(score) {
                    self.phase = SessionPhase::EnteringInitials {
                        score,
                        entry: InitialsEntry::new(),
                    };
                } else {
                    let top = self.leaderboard.load_top();
                    self.phase = SessionPhase::ShowingPanel { top };
                }
                StepEvents::default()
            }
            SessionPhase::EnteringInitials { .. } => StepEvents::default(),
            SessionPhase::ShowingPanel { .. } => {
                if input.jump_pressed || input.pointer_down {
                    self.phase = SessionPhase::Restarting;
                }
                StepEvents::default()
            }
            SessionPhase::Restarting => {
                self.restart(now);
                StepEvents::default()
            }
        }
    }

    /// Keyboard input for the initials screen; ignored in any other phase
    pub fn initials_key(&mut self, key: InitialsKey) {
        let submit = match &mut self.phase {
            SessionPhase::EnteringInitials { score, entry } => match key {
                InitialsKey::Letter(c) => {
                    entry.push_letter(c);
                    None
                }
                InitialsKey::Backspace => {
                    entry.backspace();
                    None
                }
                InitialsKey::Confirm => Some((*score, entry.finalize())),
            },
            _ => None,
        };
        if let Some((score, initials)) = submit {
            self.submit(score, &initials);
        }
    }

    /// Touch input for the initials screen; ignored in any other phase
    pub fn initials_tap(&mut self, tap: InitialsTap) {
        let submit = match &mut self.phase {
            SessionPhase::EnteringInitials { score, entry } => match tap {
                InitialsTap::Left => {
                    entry.cycle_current();
                    None
                }
                InitialsTap::Right => {
                    if entry.advance() {
                        Some((*score, entry.finalize()))
                    } else {
                        None
                    }
                }
            },
            _ => None,
        };
        if let Some((score, initials)) = submit {
            self.submit(score, &initials);
        }
    }

    fn submit(&mut self, score: u32, initials: &str) {
        let top = self.leaderboard.save_score(score, initials);
        log::info!("saved {initials} at {score}");
        self.phase = SessionPhase::ShowingPanel { top };
    }

    /// Discard the old run wholesale and start a new one
    fn restart(&mut self, now: f64) {
        self.seed = self.seed.wrapping_mul(SEED_MUL).wrapping_add(SEED_ADD);
        self.state = RunState::new(self.seed, now);
        self.phase = SessionPhase::Playing;
        log::info!("new run, seed {}", self.seed);
    }
}
