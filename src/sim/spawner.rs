//! Timer-gated projectile spawning
//!
//! Each kind keeps its own last-spawn timestamp in [`GameState`]. A spawn
//! fires once at least the configured interval has passed since the last one.

use glam::Vec2;
use rand::Rng;

use super::state::{GameEvent, GameState, Projectile, ProjectileKind};
use crate::aim_velocity;
use crate::consts::*;

/// Field edge a projectile enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Random point along this edge, `offset` units outside the field
    /// (negative offsets land inside).
    pub fn point(&self, offset: f32, width: f32, height: f32, rng: &mut impl Rng) -> Vec2 {
        match self {
            Edge::Top => Vec2::new(rng.random_range(0.0..width), -offset),
            Edge::Bottom => Vec2::new(rng.random_range(0.0..width), height + offset),
            Edge::Left => Vec2::new(-offset, rng.random_range(0.0..height)),
            Edge::Right => Vec2::new(width + offset, rng.random_range(0.0..height)),
        }
    }
}

/// Spawn the level's normal wave if its interval has elapsed.
///
/// Returns the number of projectiles spawned.
pub fn maybe_spawn_normal(state: &mut GameState, now_ms: f64) -> usize {
    let Some(level) = state.current_level().copied() else {
        return 0;
    };
    if now_ms - state.last_normal_spawn_ms < level.spawn_interval_ms {
        return 0;
    }
    state.last_normal_spawn_ms = now_ms;

    for _ in 0..level.bullet_count {
        spawn_normal(state, level.bullet_speed);
    }
    level.bullet_count as usize
}

/// Spawn an exploding projectile if the special interval has elapsed
pub fn maybe_spawn_special(state: &mut GameState, now_ms: f64) -> usize {
    let Some(level) = state.current_level().copied() else {
        return 0;
    };
    if now_ms - state.last_special_spawn_ms < state.config.special.spawn_interval_ms {
        return 0;
    }
    state.last_special_spawn_ms = now_ms;

    spawn_special(state, level.bullet_speed);
    1
}

/// Spawn a bouncing projectile if the refraction interval has elapsed
pub fn maybe_spawn_refraction(state: &mut GameState, now_ms: f64) -> usize {
    if state.current_level().is_none() {
        return 0;
    }
    if now_ms - state.last_refraction_spawn_ms < state.config.refraction.spawn_interval_ms {
        return 0;
    }
    state.last_refraction_spawn_ms = now_ms;

    spawn_refraction(state);
    1
}

/// Edge-entering projectile aimed at where the player is right now
pub fn spawn_normal(state: &mut GameState, speed: f32) -> u32 {
    let (width, height) = state.field_size();
    let edge = Edge::random(&mut state.rng);
    let pos = edge.point(NORMAL_SPAWN_OFFSET, width, height, &mut state.rng);

    let id = state.next_entity_id();
    let projectile = Projectile {
        id,
        pos,
        vel: aim_velocity(pos, state.player.pos, speed),
        radius: state.config.bullet.radius,
        color: state.config.bullet.color,
        kind: ProjectileKind::Normal { fragment: false },
    };
    push_projectile(state, projectile)
}

/// Far off-field projectile heading for a random interior target.
///
/// `level_speed` is the level's bullet speed; the special travels slower.
pub fn spawn_special(state: &mut GameState, level_speed: f32) -> u32 {
    let (width, height) = state.field_size();
    let edge = Edge::random(&mut state.rng);
    let pos = edge.point(SPECIAL_SPAWN_OFFSET, width, height, &mut state.rng);
    let target = random_target(state, SPECIAL_TARGET_PADDING);
    let speed = level_speed * state.config.special.speed_factor;

    let id = state.next_entity_id();
    let projectile = Projectile {
        id,
        pos,
        vel: aim_velocity(pos, target, speed),
        radius: state.config.special_radius(),
        color: state.config.special.color,
        kind: ProjectileKind::Special {
            target,
            arrived: false,
        },
    };
    push_projectile(state, projectile)
}

/// Just-inside-the-field projectile aimed at the player, bounces off walls
pub fn spawn_refraction(state: &mut GameState) -> u32 {
    let (width, height) = state.field_size();
    let edge = Edge::random(&mut state.rng);
    let pos = edge.point(-REFRACTION_SPAWN_INSET, width, height, &mut state.rng);
    let speed = state.config.refraction.speed;

    let id = state.next_entity_id();
    let projectile = Projectile {
        id,
        pos,
        vel: aim_velocity(pos, state.player.pos, speed),
        radius: state.config.refraction.radius,
        color: state.config.refraction.color,
        kind: ProjectileKind::Refraction { reflections: 0 },
    };
    push_projectile(state, projectile)
}

/// Uniform point at least `padding` away from every edge
fn random_target(state: &mut GameState, padding: f32) -> Vec2 {
    let (width, height) = state.field_size();
    // Fields narrower than twice the padding fall back to a thin strip
    let x_max = (width - padding).max(padding + 1.0);
    let y_max = (height - padding).max(padding + 1.0);
    Vec2::new(
        state.rng.random_range(padding..x_max),
        state.rng.random_range(padding..y_max),
    )
}

fn push_projectile(state: &mut GameState, projectile: Projectile) -> u32 {
    let id = projectile.id;
    log::debug!(
        "Spawned {:?} #{} at ({:.1}, {:.1})",
        projectile.kind,
        id,
        projectile.pos.x,
        projectile.pos.y
    );
    state.push_event(GameEvent::ProjectileSpawned {
        id,
        kind: projectile.kind,
    });
    state.projectiles.push(projectile);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::state::GamePhase;

    fn playing_state() -> GameState {
        let mut state = GameState::new(GameConfig::default(), 12345);
        state.reset_session(0.0);
        state.phase = GamePhase::Playing;
        state
    }

    #[test]
    fn test_normal_gated_by_interval() {
        let mut state = playing_state();
        assert_eq!(maybe_spawn_normal(&mut state, 1999.0), 0);
        assert!(state.projectiles.is_empty());

        assert_eq!(maybe_spawn_normal(&mut state, 2000.0), 1);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.last_normal_spawn_ms, 2000.0);

        // Gate restarts from the last spawn
        assert_eq!(maybe_spawn_normal(&mut state, 3000.0), 0);
        assert_eq!(maybe_spawn_normal(&mut state, 4000.0), 1);
    }

    #[test]
    fn test_normal_count_follows_level() {
        let mut state = playing_state();
        state.level_index = 4;
        assert_eq!(maybe_spawn_normal(&mut state, 5000.0), 3);
        assert_eq!(state.projectiles.len(), 3);
        for p in &state.projectiles {
            assert!((p.vel.length() - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_normal_enters_outside_and_aims_at_player() {
        let mut state = playing_state();
        state.player.pos = Vec2::new(123.0, 456.0);
        for _ in 0..20 {
            spawn_normal(&mut state, 3.0);
        }
        for p in &state.projectiles {
            let outside = p.pos.x < 0.0 || p.pos.x > 800.0 || p.pos.y < 0.0 || p.pos.y > 600.0;
            assert!(outside, "normal spawned inside at {:?}", p.pos);
            let to_player = (state.player.pos - p.pos).normalize();
            assert!(to_player.dot(p.vel.normalize()) > 0.9999);
            assert!((p.vel.length() - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_special_targets_interior() {
        let mut state = playing_state();
        for _ in 0..50 {
            spawn_special(&mut state, 3.0);
        }
        for p in &state.projectiles {
            let ProjectileKind::Special { target, arrived } = p.kind else {
                panic!("expected special");
            };
            assert!(!arrived);
            assert!((100.0..=700.0).contains(&target.x));
            assert!((100.0..=500.0).contains(&target.y));
            assert!((p.vel.length() - 2.4).abs() < 1e-4);
            assert_eq!(p.radius, 24.0);
            let off_field = p.pos.x <= -100.0
                || p.pos.x >= 900.0
                || p.pos.y <= -100.0
                || p.pos.y >= 700.0;
            assert!(off_field);
        }
    }

    #[test]
    fn test_refraction_spawns_inside() {
        let mut state = playing_state();
        assert_eq!(maybe_spawn_refraction(&mut state, 6999.0), 0);
        assert_eq!(maybe_spawn_refraction(&mut state, 7000.0), 1);
        let p = &state.projectiles[0];
        assert_eq!(p.reflections(), Some(0));
        assert!((0.0..=800.0).contains(&p.pos.x));
        assert!((0.0..=600.0).contains(&p.pos.y));
        assert!((p.vel.length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_special_interval() {
        let mut state = playing_state();
        assert_eq!(maybe_spawn_special(&mut state, 4999.0), 0);
        assert_eq!(maybe_spawn_special(&mut state, 5000.0), 1);
        assert!(state.projectiles[0].is_special());
    }

    #[test]
    fn test_no_spawn_past_last_level() {
        let mut state = playing_state();
        state.level_index = 99;
        assert_eq!(maybe_spawn_normal(&mut state, 1e9), 0);
        assert_eq!(maybe_spawn_special(&mut state, 1e9), 0);
        assert_eq!(maybe_spawn_refraction(&mut state, 1e9), 0);
    }
}
