//! Per-tick projectile motion, pruning and player hit test
//!
//! Runs in two passes over a stable collection: first every projectile moves,
//! then removal and collision are judged on the moved positions. Removals are
//! collected into a mask and applied with a single filter at the end, so no
//! entry is skipped or visited twice.

use glam::Vec2;

use super::collision::{circles_overlap, outside_field, reflect_velocity, wall_reflection};
use super::schedule::DeferredAction;
use super::state::{ExplosionFlash, GameEvent, GameState, Projectile, ProjectileKind};
use crate::config::SpecialConfig;
use crate::consts::*;
use crate::direction_from_degrees;

/// Outcome of one resolver pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// No hit; the collection was pruned and explosions applied
    Clear,
    /// First projectile found overlapping the player. Nothing else was applied.
    PlayerHit { projectile_id: u32, pos: Vec2 },
}

/// Advance, prune and hit-test every live projectile
pub fn resolve_projectiles(state: &mut GameState, now_ms: f64) -> Resolution {
    let (width, height) = state.field_size();
    let max_refractions = state.config.refraction.max_refractions;
    let count = state.projectiles.len();

    let mut removed = vec![false; count];
    let mut bursts: Vec<Vec2> = Vec::new();

    // Motion
    for (i, p) in state.projectiles.iter_mut().enumerate() {
        match &mut p.kind {
            ProjectileKind::Normal { .. } => {
                p.pos += p.vel;
            }
            ProjectileKind::Special { target, arrived } => {
                if !*arrived {
                    p.pos += p.vel;
                    if p.pos.distance(*target) < SPECIAL_ARRIVAL_DISTANCE {
                        *arrived = true;
                        bursts.push(p.pos);
                        removed[i] = true;
                    }
                }
            }
            ProjectileKind::Refraction { reflections } => {
                p.pos += p.vel;
                let hit = wall_reflection(p.pos, p.vel, p.radius, width, height);
                if hit.any() {
                    p.vel = reflect_velocity(p.vel, hit);
                    *reflections += hit.count();
                }
                if *reflections > max_refractions {
                    removed[i] = true;
                }
            }
        }
    }

    // Bounds and player collision
    let invisible = state.effects.invisibility;
    let player_pos = state.player.pos;
    let player_radius = state.player.radius();

    for (i, p) in state.projectiles.iter().enumerate() {
        if removed[i] {
            continue;
        }

        if outside_field(p.pos, removal_buffer(p), width, height) {
            removed[i] = true;
            continue;
        }

        if !invisible && circles_overlap(player_pos, player_radius, p.pos, p.radius) {
            return Resolution::PlayerHit {
                projectile_id: p.id,
                pos: p.pos,
            };
        }
    }

    let mut index = 0;
    state.projectiles.retain(|_| {
        let keep = !removed[index];
        index += 1;
        keep
    });

    if !bursts.is_empty() {
        let fragment_speed = state
            .current_level()
            .map(|l| l.bullet_speed)
            .unwrap_or(0.0);
        for center in bursts {
            explode(state, center, fragment_speed, now_ms);
        }
    }

    Resolution::Clear
}

/// Margin beyond the field edge before a projectile is culled
fn removal_buffer(p: &Projectile) -> f32 {
    match p.kind {
        ProjectileKind::Special { .. } => SPECIAL_REMOVAL_BUFFER,
        _ => p.radius,
    }
}

/// Number of fragments an explosion produces on `level`
pub fn split_count(special: &SpecialConfig, level: usize) -> u32 {
    let level = u32::try_from(level).unwrap_or(u32::MAX);
    special
        .base_split_count
        .saturating_add(special.split_increment_per_level.saturating_mul(level))
        .min(MAX_SPLIT_COUNT)
}

/// Burst into evenly spaced fragments around `center`.
///
/// Returns the number of fragments added.
pub fn explode(state: &mut GameState, center: Vec2, speed: f32, now_ms: f64) -> u32 {
    let fragments = split_count(&state.config.special, state.level_index);
    let step = 360.0 / fragments as f32;
    let color = state.config.special.explosion_color;

    for i in 0..fragments {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            pos: center,
            vel: direction_from_degrees(i as f32 * step) * speed,
            radius: FRAGMENT_RADIUS,
            color,
            kind: ProjectileKind::Normal { fragment: true },
        });
    }

    let flash_id = state.next_entity_id();
    state.explosions.push(ExplosionFlash {
        id: flash_id,
        pos: center,
        started_ms: now_ms,
    });
    let epoch = state.epoch;
    state.schedule.after(
        now_ms,
        EXPLOSION_FLASH_MS,
        epoch,
        DeferredAction::ClearExplosion { id: flash_id },
    );

    log::debug!(
        "Explosion at ({:.1}, {:.1}): {} fragments",
        center.x,
        center.y,
        fragments
    );
    state.push_event(GameEvent::Exploded {
        pos: center,
        fragments,
    });
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::state::GamePhase;

    fn playing_state() -> GameState {
        let mut state = GameState::new(GameConfig::default(), 777);
        state.reset_session(0.0);
        state.phase = GamePhase::Playing;
        state
    }

    fn add(state: &mut GameState, pos: Vec2, vel: Vec2, radius: f32, kind: ProjectileKind) -> u32 {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            pos,
            vel,
            radius,
            color: 0,
            kind,
        });
        id
    }

    const NORMAL: ProjectileKind = ProjectileKind::Normal { fragment: false };

    #[test]
    fn test_normal_moves_by_velocity() {
        let mut state = playing_state();
        add(&mut state, Vec2::new(100.0, 100.0), Vec2::new(3.0, -2.0), 8.0, NORMAL);
        assert_eq!(resolve_projectiles(&mut state, 16.0), Resolution::Clear);
        assert_eq!(state.projectiles[0].pos, Vec2::new(103.0, 98.0));
    }

    #[test]
    fn test_out_of_bounds_removed_without_skipping_neighbors() {
        let mut state = playing_state();
        // Two adjacent leavers followed by a survivor
        add(&mut state, Vec2::new(-7.0, 50.0), Vec2::new(-2.0, 0.0), 8.0, NORMAL);
        add(&mut state, Vec2::new(-7.0, 80.0), Vec2::new(-2.0, 0.0), 8.0, NORMAL);
        let survivor = add(&mut state, Vec2::new(50.0, 50.0), Vec2::new(1.0, 0.0), 8.0, NORMAL);

        resolve_projectiles(&mut state, 16.0);

        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].id, survivor);
        assert_eq!(state.projectiles[0].pos, Vec2::new(51.0, 50.0));
    }

    #[test]
    fn test_special_uses_wide_buffer() {
        let mut state = playing_state();
        let target = Vec2::new(400.0, 100.0);
        add(
            &mut state,
            Vec2::new(400.0, -100.0),
            Vec2::new(0.0, 2.4),
            24.0,
            ProjectileKind::Special {
                target,
                arrived: false,
            },
        );
        resolve_projectiles(&mut state, 16.0);
        assert_eq!(state.projectiles.len(), 1);
        assert!((state.projectiles[0].pos - Vec2::new(400.0, -97.6)).length() < 1e-4);
    }

    #[test]
    fn test_special_explodes_on_arrival() {
        let mut state = playing_state();
        state.level_index = 1;
        let target = Vec2::new(200.0, 200.0);
        add(
            &mut state,
            Vec2::new(200.0, 185.0),
            Vec2::new(0.0, 6.0),
            24.0,
            ProjectileKind::Special {
                target,
                arrived: false,
            },
        );

        resolve_projectiles(&mut state, 100.0);

        // 8 + 2 * 1 fragments, special itself gone
        assert_eq!(state.projectiles.len(), 10);
        assert!(state.projectiles.iter().all(|p| !p.is_special()));
        for p in &state.projectiles {
            assert_eq!(p.pos, Vec2::new(200.0, 191.0));
            assert_eq!(p.radius, FRAGMENT_RADIUS);
            // Level 1 bullet speed
            assert!((p.vel.length() - 3.5).abs() < 1e-4);
            assert_eq!(p.kind, ProjectileKind::Normal { fragment: true });
        }
        assert_eq!(state.explosions.len(), 1);
        assert!(state.events.contains(&GameEvent::Exploded {
            pos: Vec2::new(200.0, 191.0),
            fragments: 10
        }));
    }

    #[test]
    fn test_split_count_caps_at_sixteen() {
        let special = GameConfig::default().special;
        assert_eq!(split_count(&special, 0), 8);
        assert_eq!(split_count(&special, 3), 14);
        assert_eq!(split_count(&special, 4), 16);
        assert_eq!(split_count(&special, 10), 16);
    }

    #[test]
    fn test_fragments_evenly_spaced() {
        let mut state = playing_state();
        state.level_index = 2;
        let n = explode(&mut state, Vec2::new(300.0, 300.0), 4.0, 0.0);
        assert_eq!(n, 12);

        let mut angles: Vec<f32> = state
            .projectiles
            .iter()
            .map(|p| p.vel.y.atan2(p.vel.x).to_degrees().rem_euclid(360.0))
            .collect();
        angles.sort_by(f32::total_cmp);
        for (i, angle) in angles.iter().enumerate() {
            assert!((angle - i as f32 * 30.0).abs() < 1e-3, "angle {i}: {angle}");
        }
    }

    #[test]
    fn test_refraction_removed_on_fourth_reflection() {
        let mut state = playing_state();
        // Bounce horizontally well away from the player
        add(
            &mut state,
            Vec2::new(400.0, 100.0),
            Vec2::new(-40.0, 0.0),
            10.0,
            ProjectileKind::Refraction { reflections: 0 },
        );

        let mut last_seen = 0;
        for _ in 0..1000 {
            resolve_projectiles(&mut state, 0.0);
            match state.projectiles.first() {
                Some(p) => {
                    let r = p.reflections().unwrap();
                    assert!(r <= 3, "survived {r} reflections");
                    last_seen = r;
                }
                None => break,
            }
        }
        assert!(state.projectiles.is_empty());
        assert_eq!(last_seen, 3);
    }

    #[test]
    fn test_refraction_flips_velocity() {
        let mut state = playing_state();
        add(
            &mut state,
            Vec2::new(13.0, 100.0),
            Vec2::new(-4.0, 0.0),
            10.0,
            ProjectileKind::Refraction { reflections: 0 },
        );
        resolve_projectiles(&mut state, 0.0);
        let p = &state.projectiles[0];
        assert_eq!(p.pos, Vec2::new(9.0, 100.0));
        assert_eq!(p.vel, Vec2::new(4.0, 0.0));
        assert_eq!(p.reflections(), Some(1));
    }

    #[test]
    fn test_collision_reports_first_hit_only() {
        let mut state = playing_state();
        let player = state.player.pos;
        add(&mut state, Vec2::new(-50.0, -50.0), Vec2::new(-1.0, 0.0), 8.0, NORMAL);
        let first = add(&mut state, player + Vec2::new(5.0, 0.0), Vec2::ZERO, 8.0, NORMAL);
        add(&mut state, player, Vec2::ZERO, 8.0, NORMAL);

        let result = resolve_projectiles(&mut state, 0.0);
        assert_eq!(
            result,
            Resolution::PlayerHit {
                projectile_id: first,
                pos: player + Vec2::new(5.0, 0.0)
            }
        );
        // Tick terminated before the removal filter
        assert_eq!(state.projectiles.len(), 3);
    }

    #[test]
    fn test_invisibility_suppresses_collision() {
        let mut state = playing_state();
        state.effects.invisibility = true;
        let player = state.player.pos;
        add(&mut state, player, Vec2::ZERO, 8.0, NORMAL);
        assert_eq!(resolve_projectiles(&mut state, 0.0), Resolution::Clear);
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_agility_shrinks_hitbox() {
        let mut state = playing_state();
        let player = state.player.pos;
        // 20 units away: hits a radius-15 player, misses a radius-7.5 one
        add(&mut state, player + Vec2::new(20.0, 0.0), Vec2::ZERO, 8.0, NORMAL);
        state.player.apply_agility(0.5, 1.5);
        assert_eq!(resolve_projectiles(&mut state, 0.0), Resolution::Clear);
        state.player.clear_agility();
        assert!(matches!(
            resolve_projectiles(&mut state, 0.0),
            Resolution::PlayerHit { .. }
        ));
    }
}
