//! Deterministic gameplay core
//!
//! All run logic lives here. This module must stay pure:
//! - One shared monotonic clock value per frame (no skew between systems)
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod step;

pub use collision::{Aabb, CollisionOutcome, resolve_collisions};
pub use spawn::Spawner;
pub use state::{
    ActivePower, DisplayState, FinishLine, Obstacle, ObstacleKind, Player, PowerKind, Powerup,
    RunState,
};
pub use step::{FrameInput, StepEvents, step};
