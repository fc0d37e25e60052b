//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform concerns:
//! - Timestamps come in from the caller, never from a clock
//! - Seeded RNG only
//! - Collections are never mutated while being iterated

pub mod collision;
pub mod powerup;
pub mod resolve;
pub mod schedule;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timer;

pub use collision::{WallHit, circles_overlap, outside_field, wall_reflection};
pub use resolve::{Resolution, explode, resolve_projectiles, split_count};
pub use schedule::{Deferred, DeferredAction, Schedule};
pub use spawner::{Edge, maybe_spawn_normal, maybe_spawn_refraction, maybe_spawn_special};
pub use state::{
    ActiveEffects, ClockAnchor, ExplosionFlash, GameEvent, GamePhase, GameState, Player, PowerupKind,
    Projectile, ProjectileKind, UsedPowerups,
};
pub use tick::{MovementIntent, TickInput, game_over, retry, start_game, tick, toggle_pause};
pub use timer::{TimerOutcome, advance_timer, display_seconds};
