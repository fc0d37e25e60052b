//! Bullet Dodge headless runner
//!
//! Plays the game with a simple autopilot at a fixed 60 Hz frame clock and logs
//! what happens. Rendering and input belong to the embedding frontend.
//!
//! Usage: `bullet-dodge [config.json] [seed]`

use bullet_dodge::consts::FRAME_MS;
use bullet_dodge::sim::{GameEvent, GamePhase, PowerupKind};
use bullet_dodge::{Engine, GameConfig};
use glam::Vec2;

/// Give up after this many game overs
const MAX_RETRIES: u32 = 3;
/// Projectiles closer than this push the autopilot away
const AVOID_RADIUS: f32 = 150.0;
/// Extra gap that counts as an emergency
const PANIC_MARGIN: f32 = 25.0;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::load_or_default(path),
        None => GameConfig::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    log::info!("Bullet Dodge (headless) starting, seed {}", seed);

    let total_secs: f32 = config.levels.iter().map(|l| l.duration_secs).sum();
    // Room for every level, announcements and a few retries
    let max_frames = ((total_secs as f64 * 1000.0 * (MAX_RETRIES + 2) as f64) / FRAME_MS) as u64;

    let mut engine = Engine::new(config, seed);
    engine.start_game();

    let mut retries = 0;
    let mut explosions = 0;
    let mut frame = 0;
    while frame < max_frames {
        frame += 1;
        steer(&mut engine);

        let phase = engine.tick(frame as f64 * FRAME_MS);
        for event in engine.drain_events() {
            match event {
                GameEvent::Exploded { .. } => explosions += 1,
                GameEvent::ProjectileSpawned { .. } => {}
                other => log::info!("{:?}", other),
            }
        }

        match phase {
            GamePhase::GameOver if retries < MAX_RETRIES => {
                retries += 1;
                engine.retry_after_game_over();
            }
            GamePhase::GameOver | GamePhase::Victory => break,
            _ => {}
        }
    }

    let hud = engine.hud();
    println!(
        "Finished in {:?} on level {}/{} after {} frames ({} retries, {} explosions)",
        hud.phase, hud.level_number, hud.level_count, frame, retries, explosions
    );
}

/// Drift away from nearby projectiles and toward the center; burn power-ups
/// when something is about to hit.
fn steer(engine: &mut Engine) {
    if engine.phase() != GamePhase::Playing {
        return;
    }

    let player = engine.player();
    let (pos, radius) = (player.pos, player.radius());
    let (width, height) = engine.state().field_size();

    let mut push = Vec2::ZERO;
    let mut danger = false;
    for p in engine.projectiles() {
        let away = pos - p.pos;
        let dist = away.length();
        if dist < radius + p.radius + PANIC_MARGIN {
            danger = true;
        }
        if dist < AVOID_RADIUS && dist > f32::EPSILON {
            // Threats moving toward us count double
            let closing = if p.vel.dot(away) > 0.0 { 2.0 } else { 1.0 };
            push += away / (dist * dist) * closing;
        }
    }

    let center = Vec2::new(width / 2.0, height / 2.0);
    let home = (center - pos) / width.max(height) * 0.02;
    let dir = (push * 40.0 + home).clamp_length_max(1.0);
    engine.set_analog_intent(dir.x, dir.y);

    if danger {
        for kind in [
            PowerupKind::Invisibility,
            PowerupKind::Agility,
            PowerupKind::ClearScreen,
        ] {
            if engine.activate_powerup(kind) {
                break;
            }
        }
    }
}
