//! Frame tick and game phase transitions
//!
//! One call per display refresh with a monotonic timestamp. Only `Playing`
//! simulates; every other phase just lets due deferred callbacks fire.

use glam::Vec2;

use super::powerup;
use super::resolve::{Resolution, resolve_projectiles};
use super::schedule::DeferredAction;
use super::spawner::{maybe_spawn_normal, maybe_spawn_refraction, maybe_spawn_special};
use super::state::{GameEvent, GamePhase, GameState};
use super::timer::advance_timer;

/// Discrete directions held this frame (keyboard)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementIntent {
    /// Per-axis step direction; each held key contributes a full unit
    pub fn axis(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir
    }
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub movement: MovementIntent,
    /// Joystick deflection, length at most 1
    pub analog: Vec2,
}

impl TickInput {
    /// Player displacement for this frame at `speed` units per frame
    pub fn displacement(&self, speed: f32) -> Vec2 {
        (self.movement.axis() + self.analog.clamp_length_max(1.0)) * speed
    }
}

/// Advance the game by one frame at timestamp `now_ms`.
///
/// Returns the phase after the tick.
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: f64) -> GamePhase {
    // Pending clocks settle before anything due is judged against them
    if state.phase == GamePhase::Playing {
        state.anchor_clock(now_ms);
    }
    fire_deferred(state, now_ms);

    if state.phase != GamePhase::Playing {
        return state.phase;
    }

    let delta_ms = now_ms - state.last_update_ms;
    state.last_update_ms = now_ms;

    // Player movement
    let (width, height) = state.field_size();
    let step = input.displacement(state.player.speed());
    state.player.move_by(step, width, height);

    maybe_spawn_special(state, now_ms);
    maybe_spawn_refraction(state, now_ms);
    maybe_spawn_normal(state, now_ms);

    if let Resolution::PlayerHit { projectile_id, pos } = resolve_projectiles(state, now_ms) {
        state.push_event(GameEvent::PlayerHit { projectile_id, pos });
        game_over(state);
        return state.phase;
    }

    advance_timer(state, delta_ms, now_ms);
    state.phase
}

/// Run deferred callbacks due at `now_ms`, dropping stale ones
pub fn fire_deferred(state: &mut GameState, now_ms: f64) {
    for deferred in state.schedule.take_due(now_ms) {
        if deferred.epoch != state.epoch {
            log::debug!(
                "Dropping stale {:?} (epoch {} != {})",
                deferred.action,
                deferred.epoch,
                state.epoch
            );
            continue;
        }

        match deferred.action {
            DeferredAction::EndInvisibility => {
                powerup::end_invisibility(state);
            }
            DeferredAction::EndAgility => {
                powerup::end_agility(state);
            }
            DeferredAction::EndAnnouncement => {
                if state.phase == GamePhase::Announcing {
                    enter_playing(state, now_ms);
                }
            }
            DeferredAction::ClearExplosion { id } => {
                state.explosions.retain(|e| e.id != id);
            }
        }
    }
}

/// Begin a fresh game at level 1. Allowed from any phase.
pub fn start_game(state: &mut GameState, now_ms: f64) {
    state.level_index = 0;
    state.reset_session(now_ms);
    enter_playing(state, now_ms);
    log::info!("Game started ({} levels)", state.config.level_count());
}

/// Try again after a game over (same level), or from the top after a victory.
///
/// Returns false from any other phase.
pub fn retry(state: &mut GameState, now_ms: f64) -> bool {
    match state.phase {
        GamePhase::GameOver => {
            state.reset_session(now_ms);
            enter_playing(state, now_ms);
            log::info!("Retrying level {}", state.level_index + 1);
            true
        }
        GamePhase::Victory => {
            start_game(state, now_ms);
            true
        }
        _ => false,
    }
}

/// Pause while playing, resume while paused. Returns false otherwise.
pub fn toggle_pause(state: &mut GameState, now_ms: f64) -> bool {
    match state.phase {
        GamePhase::Playing => {
            state.phase = GamePhase::Paused;
            state.paused_at_ms = Some(now_ms);
            state.push_event(GameEvent::Paused);
            true
        }
        GamePhase::Paused => {
            // Nothing decays or spawns across the pause
            let span = state
                .paused_at_ms
                .take()
                .map(|t| (now_ms - t).max(0.0))
                .unwrap_or(0.0);
            state.shift_clock(span);
            state.phase = GamePhase::Playing;
            state.push_event(GameEvent::Resumed);
            true
        }
        _ => false,
    }
}

/// Player was hit: stop the session and wait for a retry
pub fn game_over(state: &mut GameState) {
    state.halt();
    state.phase = GamePhase::GameOver;
    log::info!("Game over on level {}", state.level_index + 1);
    state.push_event(GameEvent::GameOver {
        level: state.level_index,
    });
}

/// Enter Playing with fresh clocks
fn enter_playing(state: &mut GameState, now_ms: f64) {
    state.restart_clock(now_ms);
    state.phase = GamePhase::Playing;
    state.push_event(GameEvent::LevelStarted {
        level: state.level_index,
    });
}
