//! Level countdown and progression

use super::schedule::DeferredAction;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::ANNOUNCE_DURATION_MS;

/// What the countdown did this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    /// Time left on the current level
    Running,
    /// Level survived; announcing the next one (new index)
    NextLevel(usize),
    /// Last level survived
    Victory,
}

/// Count down by `delta_ms` and advance the level when time runs out
pub fn advance_timer(state: &mut GameState, delta_ms: f64, now_ms: f64) -> TimerOutcome {
    let delta_secs = (delta_ms.max(0.0) / 1000.0) as f32;
    state.remaining_secs = (state.remaining_secs - delta_secs).max(0.0);

    if state.current_level().is_none() {
        declare_victory(state);
        return TimerOutcome::Victory;
    }
    if state.remaining_secs > 0.0 {
        return TimerOutcome::Running;
    }

    complete_level(state, now_ms)
}

/// Leave the current level: announce the next one or finish the game
pub fn complete_level(state: &mut GameState, now_ms: f64) -> TimerOutcome {
    let cleared = state.level_index;
    state.push_event(GameEvent::LevelCleared { level: cleared });

    if !state.has_next_level() {
        declare_victory(state);
        return TimerOutcome::Victory;
    }

    state.level_index += 1;
    state.reset_session(now_ms);
    state.phase = GamePhase::Announcing;

    let epoch = state.epoch;
    state
        .schedule
        .after(now_ms, ANNOUNCE_DURATION_MS, epoch, DeferredAction::EndAnnouncement);

    log::info!(
        "Level {} cleared, announcing level {}",
        cleared + 1,
        state.level_index + 1
    );
    state.push_event(GameEvent::Announcing {
        level: state.level_index,
    });
    TimerOutcome::NextLevel(state.level_index)
}

fn declare_victory(state: &mut GameState) {
    state.halt();
    state.phase = GamePhase::Victory;
    log::info!("All {} levels cleared", state.config.level_count());
    state.push_event(GameEvent::Victory);
}

/// Whole seconds shown on the HUD (rounded up)
pub fn display_seconds(state: &GameState) -> u32 {
    state.remaining_secs.max(0.0).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn playing_state() -> GameState {
        let mut state = GameState::new(GameConfig::default(), 1);
        state.reset_session(0.0);
        state.phase = GamePhase::Playing;
        state
    }

    #[test]
    fn test_countdown() {
        let mut state = playing_state();
        assert_eq!(advance_timer(&mut state, 1500.0, 1500.0), TimerOutcome::Running);
        assert!((state.remaining_secs - 58.5).abs() < 1e-4);
        assert_eq!(display_seconds(&state), 59);
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut state = playing_state();
        advance_timer(&mut state, -500.0, 0.0);
        assert_eq!(state.remaining_secs, 60.0);
    }

    #[test]
    fn test_expiry_announces_next_level() {
        let mut state = playing_state();
        state.used_powerups.invisibility = true;
        let epoch = state.epoch;

        let outcome = advance_timer(&mut state, 61_000.0, 61_000.0);

        assert_eq!(outcome, TimerOutcome::NextLevel(1));
        assert_eq!(state.phase, GamePhase::Announcing);
        assert_eq!(state.level_index, 1);
        assert_eq!(state.remaining_secs, 60.0);
        assert!(!state.used_powerups.invisibility);
        assert!(state.epoch > epoch);
        assert_eq!(state.schedule.next_due(), Some(63_000.0));
    }

    #[test]
    fn test_last_level_is_victory() {
        let mut state = playing_state();
        state.level_index = 4;
        state.remaining_secs = 0.5;

        let outcome = advance_timer(&mut state, 500.0, 500.0);

        assert_eq!(outcome, TimerOutcome::Victory);
        assert_eq!(state.phase, GamePhase::Victory);
        assert_eq!(state.level_index, 4);
        assert!(state.schedule.is_empty());
    }

    #[test]
    fn test_level_past_table_is_victory() {
        let mut state = playing_state();
        state.level_index = 12;
        assert_eq!(advance_timer(&mut state, 16.0, 16.0), TimerOutcome::Victory);
        assert_eq!(state.phase, GamePhase::Victory);
    }
}
