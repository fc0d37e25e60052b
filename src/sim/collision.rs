//! Collision and boundary tests on the rectangular field
//!
//! Everything here is pure geometry on circle centers and radii; the resolver
//! decides what a hit means.

use glam::Vec2;

/// Which walls a bouncing projectile hit this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallHit {
    /// Left or right wall (flip x velocity)
    pub x: bool,
    /// Top or bottom wall (flip y velocity)
    pub y: bool,
}

impl WallHit {
    pub fn any(&self) -> bool {
        self.x || self.y
    }

    /// Number of reflections this hit counts for
    pub fn count(&self) -> u32 {
        self.x as u32 + self.y as u32
    }
}

/// Check whether two circles overlap (touching is not a hit)
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

/// Check whether a center lies outside the field grown by `buffer` on every side
#[inline]
pub fn outside_field(pos: Vec2, buffer: f32, width: f32, height: f32) -> bool {
    pos.x < -buffer || pos.x > width + buffer || pos.y < -buffer || pos.y > height + buffer
}

/// Detect wall contact for a circle of `radius` moving with `vel`.
///
/// A wall only counts when the circle touches it and is still heading into it,
/// so a projectile sitting on the edge while moving away is left alone.
pub fn wall_reflection(pos: Vec2, vel: Vec2, radius: f32, width: f32, height: f32) -> WallHit {
    WallHit {
        x: (pos.x <= radius && vel.x < 0.0) || (pos.x >= width - radius && vel.x > 0.0),
        y: (pos.y <= radius && vel.y < 0.0) || (pos.y >= height - radius && vel.y > 0.0),
    }
}

/// Reflect a velocity off the walls in `hit`
#[inline]
pub fn reflect_velocity(vel: Vec2, hit: WallHit) -> Vec2 {
    Vec2::new(
        if hit.x { -vel.x } else { vel.x },
        if hit.y { -vel.y } else { vel.y },
    )
}
