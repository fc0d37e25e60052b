//! One-shot power-ups
//!
//! Every kind can be used once per level. Timed effects end through a deferred
//! callback tagged with the session epoch, so an expiry left over from an
//! earlier session never touches the current one.

use super::schedule::DeferredAction;
use super::state::{GameEvent, GamePhase, GameState, PowerupKind};

/// Try to use a power-up. Returns false if it was rejected.
pub fn activate(state: &mut GameState, kind: PowerupKind, now_ms: f64) -> bool {
    if state.phase != GamePhase::Playing {
        return false;
    }
    if state.used_powerups.is_used(kind) {
        return false;
    }
    state.used_powerups.mark(kind);

    let epoch = state.epoch;
    match kind {
        PowerupKind::ClearScreen => {
            let cleared = state.projectiles.len();
            state.projectiles.clear();
            log::info!("Clear screen removed {} projectiles", cleared);
        }
        PowerupKind::Invisibility => {
            state.effects.invisibility = true;
            let duration = state.config.powerups.invisibility_ms;
            state
                .schedule
                .after(now_ms, duration, epoch, DeferredAction::EndInvisibility);
            log::info!("Invisibility for {} ms", duration);
        }
        PowerupKind::Agility => {
            let powerups = &state.config.powerups;
            let (size_factor, speed_factor, duration) = (
                powerups.agility_size_factor,
                powerups.agility_speed_factor,
                powerups.agility_ms,
            );
            state.effects.agility = true;
            state.player.apply_agility(size_factor, speed_factor);
            let (width, height) = state.field_size();
            state.player.clamp_to(width, height);
            state
                .schedule
                .after(now_ms, duration, epoch, DeferredAction::EndAgility);
            log::info!("Agility for {} ms", duration);
        }
    }

    state.push_event(GameEvent::PowerupActivated { kind });
    true
}

/// Expire Invisibility. No-op unless it is running.
pub fn end_invisibility(state: &mut GameState) -> bool {
    if !state.effects.invisibility {
        return false;
    }
    state.effects.invisibility = false;
    state.push_event(GameEvent::PowerupExpired {
        kind: PowerupKind::Invisibility,
    });
    true
}

/// Expire Agility and restore base size and speed. No-op unless it is running.
pub fn end_agility(state: &mut GameState) -> bool {
    if !state.effects.agility {
        return false;
    }
    state.effects.agility = false;
    state.player.clear_agility();
    // Growing back may push the avatar past a wall
    let (width, height) = state.field_size();
    state.player.clamp_to(width, height);
    state.push_event(GameEvent::PowerupExpired {
        kind: PowerupKind::Agility,
    });
    true
}

/// Whether a power-up can still be used right now
pub fn is_available(state: &GameState, kind: PowerupKind) -> bool {
    state.phase == GamePhase::Playing && !state.used_powerups.is_used(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::state::{Projectile, ProjectileKind};
    use glam::Vec2;

    fn playing_state() -> GameState {
        let mut state = GameState::new(GameConfig::default(), 5);
        state.reset_session(0.0);
        state.phase = GamePhase::Playing;
        state
    }

    fn add_projectile(state: &mut GameState) {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            pos: Vec2::new(10.0, 10.0),
            vel: Vec2::ZERO,
            radius: 8.0,
            color: 0,
            kind: ProjectileKind::Normal { fragment: false },
        });
    }

    #[test]
    fn test_clear_screen_once_per_level() {
        let mut state = playing_state();
        add_projectile(&mut state);
        add_projectile(&mut state);

        assert!(activate(&mut state, PowerupKind::ClearScreen, 0.0));
        assert!(state.projectiles.is_empty());

        add_projectile(&mut state);
        assert!(!activate(&mut state, PowerupKind::ClearScreen, 10.0));
        assert_eq!(state.projectiles.len(), 1);
        assert!(!is_available(&state, PowerupKind::ClearScreen));
    }

    #[test]
    fn test_rejected_outside_playing() {
        let mut state = GameState::new(GameConfig::default(), 5);
        assert!(!activate(&mut state, PowerupKind::Invisibility, 0.0));
        assert!(!state.used_powerups.invisibility);
    }

    #[test]
    fn test_invisibility_schedules_expiry() {
        let mut state = playing_state();
        assert!(activate(&mut state, PowerupKind::Invisibility, 1000.0));
        assert!(state.effects.invisibility);
        assert_eq!(state.schedule.next_due(), Some(6000.0));

        assert!(end_invisibility(&mut state));
        assert!(!state.effects.invisibility);
        assert!(!end_invisibility(&mut state));
    }

    #[test]
    fn test_agility_applies_and_restores_exactly() {
        let mut state = playing_state();
        assert!(activate(&mut state, PowerupKind::Agility, 0.0));
        assert_eq!(state.player.radius(), 7.5);
        assert_eq!(state.player.speed(), 7.5);
        assert_eq!(state.config.player.size, 15.0);

        // Not renewable
        assert!(!activate(&mut state, PowerupKind::Agility, 100.0));

        assert!(end_agility(&mut state));
        assert_eq!(state.player.radius(), 15.0);
        assert_eq!(state.player.speed(), 5.0);
    }

    #[test]
    fn test_agility_end_reclamps_player() {
        let mut state = playing_state();
        activate(&mut state, PowerupKind::Agility, 0.0);
        state.player.move_by(Vec2::new(-1000.0, 0.0), 800.0, 600.0);
        assert_eq!(state.player.pos.x, 7.5);

        end_agility(&mut state);
        assert_eq!(state.player.pos.x, 15.0);
    }
}
