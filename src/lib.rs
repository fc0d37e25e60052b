//! Bullet Dodge - An arcade survival game on a rectangular field
//!
//! Core modules:
//! - `sim`: Simulation (spawning, motion, collisions, levels, power-ups)
//! - `engine`: Facade the renderer, input and UI layers talk to
//! - `config`: Data-driven game balance
//! - `error`: Configuration loading errors

pub mod config;
pub mod engine;
pub mod error;
pub mod sim;

pub use config::GameConfig;
pub use engine::{Engine, Hud};
pub use error::ConfigError;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Field dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Nominal frame time used by the headless runner (60 Hz display refresh)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Normal projectiles enter this far outside the field
    pub const NORMAL_SPAWN_OFFSET: f32 = 10.0;
    /// Special projectiles enter this far outside the field
    pub const SPECIAL_SPAWN_OFFSET: f32 = 100.0;
    /// Refraction projectiles enter this far inside the field
    pub const REFRACTION_SPAWN_INSET: f32 = 10.0;
    /// Special targets keep at least this distance from every edge
    pub const SPECIAL_TARGET_PADDING: f32 = 100.0;
    /// Special projectiles explode once closer than this to their target
    pub const SPECIAL_ARRIVAL_DISTANCE: f32 = 10.0;
    /// Special projectiles are only culled beyond this buffer
    pub const SPECIAL_REMOVAL_BUFFER: f32 = 100.0;

    /// Explosion fragments never exceed this count
    pub const MAX_SPLIT_COUNT: u32 = 16;
    /// Radius of explosion fragments
    pub const FRAGMENT_RADIUS: f32 = 6.0;
    /// Lifetime of the explosion flash shown by the renderer
    pub const EXPLOSION_FLASH_MS: f64 = 500.0;

    /// Level announcement between levels
    pub const ANNOUNCE_DURATION_MS: f64 = 2000.0;
}

/// Velocity of magnitude `speed` pointing from `from` toward `to`.
///
/// Returns zero when the two points coincide.
#[inline]
pub fn aim_velocity(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or_zero() * speed
}

/// Clamp a circle center so the whole circle stays inside the field
#[inline]
pub fn clamp_to_field(pos: Vec2, radius: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        pos.x.clamp(radius, (width - radius).max(radius)),
        pos.y.clamp(radius, (height - radius).max(radius)),
    )
}

/// Unit vector at `degrees` from the +x axis (y grows downward on the field)
#[inline]
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}
