//! Engine facade for the renderer, input and UI layers
//!
//! Holds the game state plus the latest input intent, the way the frame loop
//! owns them. Lifecycle and power-up calls arrive between frames without a
//! timestamp. Power-ups use the most recent one; start, retry and resume leave
//! the clocks pending until the next frame, since the loop may have been
//! stopped for a while.

use glam::Vec2;
use serde::Serialize;

use crate::config::GameConfig;
use crate::sim::state::{ClockAnchor, GameEvent, GamePhase, GameState, Player, PowerupKind, Projectile};
use crate::sim::{self, MovementIntent, TickInput, powerup, timer};

/// What the status panel shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    /// 1-based level number
    pub level_number: usize,
    pub level_count: usize,
    /// Countdown, rounded up
    pub seconds_left: u32,
    pub phase: GamePhase,
    pub invisibility_available: bool,
    pub clear_screen_available: bool,
    pub agility_available: bool,
    /// Player drawn translucent
    pub invisible: bool,
    /// Overlay message, if any
    pub status: Option<String>,
}

/// A single game instance
pub struct Engine {
    state: GameState,
    input: TickInput,
    last_timestamp: f64,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(GameConfig::default(), 0)
    }
}

impl Engine {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            state: GameState::new(config, seed),
            input: TickInput::default(),
            last_timestamp: 0.0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn player(&self) -> &Player {
        &self.state.player
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.state.projectiles
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Advance one frame
    pub fn tick(&mut self, timestamp_ms: f64) -> GamePhase {
        self.last_timestamp = timestamp_ms;
        sim::tick(&mut self.state, &self.input, timestamp_ms)
    }

    /// Directions currently held; persists until replaced
    pub fn set_movement_intent(&mut self, intent: MovementIntent) {
        self.input.movement = intent;
    }

    /// Joystick deflection in [-1, 1] per axis; (0, 0) releases it
    pub fn set_analog_intent(&mut self, dx: f32, dy: f32) {
        let analog = Vec2::new(dx, dy);
        self.input.analog = if analog.is_finite() {
            analog.clamp_length_max(1.0)
        } else {
            Vec2::ZERO
        };
    }

    pub fn activate_powerup(&mut self, kind: PowerupKind) -> bool {
        powerup::activate(&mut self.state, kind, self.last_timestamp)
    }

    /// Activate by identifier ("invisibility", "clearScreen", "agility" or
    /// the 1/2/3 hotkeys). Unknown names are ignored.
    pub fn activate_powerup_named(&mut self, name: &str) -> bool {
        match PowerupKind::from_name(name) {
            Some(kind) => self.activate_powerup(kind),
            None => {
                log::debug!("Ignoring unknown power-up '{}'", name);
                false
            }
        }
    }

    pub fn start_game(&mut self) {
        self.input = TickInput::default();
        sim::start_game(&mut self.state, self.last_timestamp);
        self.restart_on_next_frame();
    }

    pub fn retry_after_game_over(&mut self) -> bool {
        let accepted = sim::retry(&mut self.state, self.last_timestamp);
        if accepted {
            self.input = TickInput::default();
            self.restart_on_next_frame();
        }
        accepted
    }

    pub fn toggle_pause(&mut self) -> bool {
        match (self.state.phase, self.state.paused_at_ms) {
            (GamePhase::Paused, Some(paused_at_ms)) => {
                let pending = self.state.clock_anchor;
                // Resume with a zero span; the real one is known at the next frame
                let resumed = sim::toggle_pause(&mut self.state, paused_at_ms);
                self.state.clock_anchor = match pending {
                    ClockAnchor::Anchored => ClockAnchor::Resume { paused_at_ms },
                    restart => restart,
                };
                resumed
            }
            _ => sim::toggle_pause(&mut self.state, self.last_timestamp),
        }
    }

    fn restart_on_next_frame(&mut self) {
        self.state.clock_anchor = ClockAnchor::Restart {
            stale_ms: self.last_timestamp,
        };
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }

    pub fn hud(&self) -> Hud {
        let state = &self.state;
        let level_number = state.level_index + 1;
        let status = match state.phase {
            GamePhase::Idle => Some("Press start to play".to_string()),
            GamePhase::Playing => None,
            GamePhase::Paused => Some("Paused".to_string()),
            GamePhase::Announcing => Some(format!("Level {} - get ready!", level_number)),
            GamePhase::GameOver => Some("Game over! Retry to continue".to_string()),
            GamePhase::Victory => Some("Congratulations, all levels cleared!".to_string()),
        };

        Hud {
            level_number,
            level_count: state.config.level_count(),
            seconds_left: timer::display_seconds(state),
            phase: state.phase,
            invisibility_available: powerup::is_available(state, PowerupKind::Invisibility),
            clear_screen_available: powerup::is_available(state, PowerupKind::ClearScreen),
            agility_available: powerup::is_available(state, PowerupKind::Agility),
            invisible: state.effects.invisibility,
            status,
        }
    }
}
