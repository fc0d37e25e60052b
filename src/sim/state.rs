//! Game state and core simulation types
//!
//! Everything one game session needs lives in [`GameState`]. Base tuning comes
//! from an immutable [`GameConfig`]; transient effects are layered on top.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::schedule::Schedule;
use crate::clamp_to_field;
use crate::config::{GameConfig, LevelDescriptor};

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first start
    Idle,
    /// Active gameplay (the only phase that simulates)
    Playing,
    /// Game is paused
    Paused,
    /// Between-level announcement, resumes automatically
    Announcing,
    /// Player was hit, waiting for retry
    GameOver,
    /// Every level survived
    Victory,
}

/// The player's avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    base_radius: f32,
    base_speed: f32,
    /// Active size multiplier (1.0 without effects)
    size_factor: f32,
    /// Active speed multiplier (1.0 without effects)
    speed_factor: f32,
}

impl Player {
    /// A fresh player in the middle of the field
    pub fn new(config: &GameConfig) -> Self {
        Self {
            pos: Vec2::new(config.field_width / 2.0, config.field_height / 2.0),
            base_radius: config.player.size,
            base_speed: config.player.speed,
            size_factor: 1.0,
            speed_factor: 1.0,
        }
    }

    /// Effective collision radius
    #[inline]
    pub fn radius(&self) -> f32 {
        self.base_radius * self.size_factor
    }

    /// Effective movement per frame
    #[inline]
    pub fn speed(&self) -> f32 {
        self.base_speed * self.speed_factor
    }

    pub fn apply_agility(&mut self, size_factor: f32, speed_factor: f32) {
        self.size_factor = size_factor;
        self.speed_factor = speed_factor;
    }

    /// Back to base size and speed
    pub fn clear_agility(&mut self) {
        self.size_factor = 1.0;
        self.speed_factor = 1.0;
    }

    /// Move by `delta` and keep the whole avatar on the field
    pub fn move_by(&mut self, delta: Vec2, width: f32, height: f32) {
        self.pos += delta;
        self.clamp_to(width, height);
    }

    pub fn clamp_to(&mut self, width: f32, height: f32) {
        self.pos = clamp_to_field(self.pos, self.radius(), width, height);
    }
}

/// Projectile behaviours
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Straight-line projectile (player-aimed or explosion fragment)
    Normal { fragment: bool },
    /// Heads for a fixed point and explodes there
    Special { target: Vec2, arrived: bool },
    /// Bounces off the field walls a limited number of times
    Refraction { reflections: u32 },
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Displacement per tick
    pub vel: Vec2,
    pub radius: f32,
    /// RGB color tag for the renderer
    pub color: u32,
    pub kind: ProjectileKind,
}

impl Projectile {
    pub fn is_special(&self) -> bool {
        matches!(self.kind, ProjectileKind::Special { .. })
    }

    /// Reflection count (None for non-bouncing kinds)
    pub fn reflections(&self) -> Option<u32> {
        match self.kind {
            ProjectileKind::Refraction { reflections } => Some(reflections),
            _ => None,
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    Invisibility,
    ClearScreen,
    Agility,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 3] = [
        PowerupKind::Invisibility,
        PowerupKind::ClearScreen,
        PowerupKind::Agility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerupKind::Invisibility => "invisibility",
            PowerupKind::ClearScreen => "clearScreen",
            PowerupKind::Agility => "agility",
        }
    }

    /// Parse the identifiers used by button/keyboard layers
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "invisibility" | "1" => Some(PowerupKind::Invisibility),
            "clearscreen" | "clear_screen" | "2" => Some(PowerupKind::ClearScreen),
            "agility" | "3" => Some(PowerupKind::Agility),
            _ => None,
        }
    }
}

/// Timed power-up effects currently running
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub invisibility: bool,
    pub agility: bool,
}

/// One-shot usage flags, cleared on every session reset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsedPowerups {
    pub invisibility: bool,
    pub clear_screen: bool,
    pub agility: bool,
}

impl UsedPowerups {
    pub fn is_used(&self, kind: PowerupKind) -> bool {
        match kind {
            PowerupKind::Invisibility => self.invisibility,
            PowerupKind::ClearScreen => self.clear_screen,
            PowerupKind::Agility => self.agility,
        }
    }

    pub fn mark(&mut self, kind: PowerupKind) {
        match kind {
            PowerupKind::Invisibility => self.invisibility = true,
            PowerupKind::ClearScreen => self.clear_screen = true,
            PowerupKind::Agility => self.agility = true,
        }
    }
}

/// Short-lived explosion marker for the renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionFlash {
    pub id: u32,
    pub pos: Vec2,
    pub started_ms: f64,
}

/// Notifications for renderer, audio and UI collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    LevelStarted { level: usize },
    ProjectileSpawned { id: u32, kind: ProjectileKind },
    Exploded { pos: Vec2, fragments: u32 },
    PowerupActivated { kind: PowerupKind },
    PowerupExpired { kind: PowerupKind },
    LevelCleared { level: usize },
    Announcing { level: usize },
    PlayerHit { projectile_id: u32, pos: Vec2 },
    GameOver { level: usize },
    Victory,
    Paused,
    Resumed,
}

/// Whether the session clocks match the frame timestamps.
///
/// Lifecycle calls that arrive without a timestamp leave the clocks pending;
/// the first Playing tick settles them against its own timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ClockAnchor {
    Anchored,
    /// Restart every clock at the next tick. Deferred callbacks of the current
    /// epoch were scheduled from `stale_ms` and move along with the clocks.
    Restart { stale_ms: f64 },
    /// Shift every clock by the time since `paused_at_ms`
    Resume { paused_at_ms: f64 },
}

/// Events kept when nobody drains them
pub const MAX_PENDING_EVENTS: usize = 256;

/// Complete game session state
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// Base tuning (never modified by the simulation)
    pub config: GameConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    #[serde(skip)]
    pub rng: Pcg32,
    /// Current level index (0-based)
    pub level_index: usize,
    /// Seconds left in the current level
    pub remaining_secs: f32,
    /// Timestamp of the last simulated tick
    pub last_update_ms: f64,
    pub last_normal_spawn_ms: f64,
    pub last_special_spawn_ms: f64,
    pub last_refraction_spawn_ms: f64,
    /// When the current pause started
    pub paused_at_ms: Option<f64>,
    pub clock_anchor: ClockAnchor,
    pub phase: GamePhase,
    /// Bumped on every session reset; deferred callbacks from older epochs are dropped
    pub epoch: u64,
    pub player: Player,
    /// Live projectiles
    pub projectiles: Vec<Projectile>,
    pub effects: ActiveEffects,
    pub used_powerups: UsedPowerups,
    /// Visual explosion markers (not gameplay-affecting)
    pub explosions: Vec<ExplosionFlash>,
    /// Pending deferred callbacks
    #[serde(skip)]
    pub schedule: Schedule,
    /// Events not yet drained by a collaborator
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create an idle game with the given tuning and seed
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let player = Player::new(&config);
        let remaining_secs = config.level(0).map(|l| l.duration_secs).unwrap_or(0.0);
        Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level_index: 0,
            remaining_secs,
            last_update_ms: 0.0,
            last_normal_spawn_ms: 0.0,
            last_special_spawn_ms: 0.0,
            last_refraction_spawn_ms: 0.0,
            paused_at_ms: None,
            clock_anchor: ClockAnchor::Anchored,
            phase: GamePhase::Idle,
            epoch: 0,
            player,
            projectiles: Vec::new(),
            effects: ActiveEffects::default(),
            used_powerups: UsedPowerups::default(),
            explosions: Vec::new(),
            schedule: Schedule::default(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Difficulty of the current level (None once past the table)
    pub fn current_level(&self) -> Option<&LevelDescriptor> {
        self.config.level(self.level_index)
    }

    pub fn has_next_level(&self) -> bool {
        self.level_index + 1 < self.config.level_count()
    }

    pub fn field_size(&self) -> (f32, f32) {
        (self.config.field_width, self.config.field_height)
    }

    /// Reset everything scoped to one attempt at the current level.
    ///
    /// Player, projectiles, effects, power-up usage, timer and spawn clocks
    /// start over; the level index is left alone.
    pub fn reset_session(&mut self, now_ms: f64) {
        self.epoch += 1;
        self.player = Player::new(&self.config);
        self.projectiles.clear();
        self.explosions.clear();
        self.effects = ActiveEffects::default();
        self.used_powerups = UsedPowerups::default();
        self.remaining_secs = self.current_level().map(|l| l.duration_secs).unwrap_or(0.0);
        self.paused_at_ms = None;
        self.restart_clock(now_ms);
    }

    /// Stop the session in place (game over / victory): cancel effects and clear the field
    pub fn halt(&mut self) {
        self.epoch += 1;
        self.projectiles.clear();
        self.explosions.clear();
        self.effects = ActiveEffects::default();
        self.player.clear_agility();
        let (width, height) = self.field_size();
        self.player.clamp_to(width, height);
        self.paused_at_ms = None;
    }

    /// Point the update and spawn clocks at `now_ms`
    pub fn restart_clock(&mut self, now_ms: f64) {
        self.clock_anchor = ClockAnchor::Anchored;
        self.last_update_ms = now_ms;
        self.last_normal_spawn_ms = now_ms;
        self.last_special_spawn_ms = now_ms;
        self.last_refraction_spawn_ms = now_ms;
    }

    /// Shift every clock forward (used after a pause)
    pub fn shift_clock(&mut self, span_ms: f64) {
        self.clock_anchor = ClockAnchor::Anchored;
        self.last_update_ms += span_ms;
        self.last_normal_spawn_ms += span_ms;
        self.last_special_spawn_ms += span_ms;
        self.last_refraction_spawn_ms += span_ms;
    }

    /// Settle pending clocks against the first Playing timestamp
    pub fn anchor_clock(&mut self, now_ms: f64) {
        match self.clock_anchor {
            ClockAnchor::Anchored => {}
            ClockAnchor::Restart { stale_ms } => {
                let span = (now_ms - stale_ms).max(0.0);
                self.schedule.shift_epoch(self.epoch, span);
                self.restart_clock(now_ms);
                log::debug!("Clocks restarted at {:.0}ms", now_ms);
            }
            ClockAnchor::Resume { paused_at_ms } => {
                self.shift_clock((now_ms - paused_at_ms).max(0.0));
                log::debug!("Clocks resumed at {:.0}ms", now_ms);
            }
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        if self.events.len() < MAX_PENDING_EVENTS {
            self.events.push(event);
        }
    }

    /// JSON snapshot of the visible state for out-of-process renderers
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
