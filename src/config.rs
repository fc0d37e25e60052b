//! Game balance and tuning
//!
//! Read-only at runtime. Transient power-up effects are layered over these
//! values by the simulation and never written back.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH};
use crate::error::ConfigError;

/// Player defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Base collision radius
    pub size: f32,
    /// Base movement per frame
    pub speed: f32,
    pub color: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: 15.0,
            speed: 5.0,
            color: 0x2ecc71,
        }
    }
}

/// Normal projectile defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    pub radius: f32,
    pub color: u32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            radius: 8.0,
            color: 0xe74c3c,
        }
    }
}

/// One entry of the difficulty table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    /// Survival time in seconds
    pub duration_secs: f32,
    /// Milliseconds between normal spawn waves
    pub spawn_interval_ms: f64,
    /// Normal projectile speed (units per frame)
    pub bullet_speed: f32,
    /// Normal projectiles per spawn wave
    pub bullet_count: u32,
}

impl LevelDescriptor {
    pub const fn new(
        duration_secs: f32,
        spawn_interval_ms: f64,
        bullet_speed: f32,
        bullet_count: u32,
    ) -> Self {
        Self {
            duration_secs,
            spawn_interval_ms,
            bullet_speed,
            bullet_count,
        }
    }
}

/// Power-up timings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupConfig {
    pub invisibility_ms: f64,
    pub agility_ms: f64,
    /// Player size multiplier while Agility is active
    pub agility_size_factor: f32,
    /// Player speed multiplier while Agility is active
    pub agility_speed_factor: f32,
}

impl Default for PowerupConfig {
    fn default() -> Self {
        Self {
            invisibility_ms: 5000.0,
            agility_ms: 10000.0,
            agility_size_factor: 0.5,
            agility_speed_factor: 1.5,
        }
    }
}

/// Exploding (special) projectile tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialConfig {
    pub color: u32,
    pub explosion_color: u32,
    /// Radius relative to a normal projectile
    pub size_multiplier: f32,
    /// Speed relative to the level's bullet speed
    pub speed_factor: f32,
    pub spawn_interval_ms: f64,
    /// Fragments produced on level 0
    pub base_split_count: u32,
    /// Extra fragments per level
    pub split_increment_per_level: u32,
}

impl Default for SpecialConfig {
    fn default() -> Self {
        Self {
            color: 0x3498db,
            explosion_color: 0xf1c40f,
            size_multiplier: 3.0,
            speed_factor: 0.8,
            spawn_interval_ms: 5000.0,
            base_split_count: 8,
            split_increment_per_level: 2,
        }
    }
}

/// Bouncing (refraction) projectile tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefractionConfig {
    pub color: u32,
    pub radius: f32,
    pub speed: f32,
    /// Reflections survived; the next one removes the projectile
    pub max_refractions: u32,
    pub spawn_interval_ms: f64,
}

impl Default for RefractionConfig {
    fn default() -> Self {
        Self {
            color: 0x9b59b6,
            radius: 10.0,
            speed: 4.0,
            max_refractions: 3,
            spawn_interval_ms: 7000.0,
        }
    }
}

/// Complete game tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub field_width: f32,
    pub field_height: f32,
    pub player: PlayerConfig,
    pub bullet: BulletConfig,
    pub levels: Vec<LevelDescriptor>,
    pub powerups: PowerupConfig,
    pub special: SpecialConfig,
    pub refraction: RefractionConfig,
}

/// Difficulty table shipped with the game
pub const DEFAULT_LEVELS: [LevelDescriptor; 5] = [
    LevelDescriptor::new(60.0, 2000.0, 3.0, 1),
    LevelDescriptor::new(60.0, 1800.0, 3.5, 1),
    LevelDescriptor::new(60.0, 1600.0, 4.0, 2),
    LevelDescriptor::new(60.0, 1400.0, 4.5, 2),
    LevelDescriptor::new(60.0, 1200.0, 5.0, 3),
];

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            player: PlayerConfig::default(),
            bullet: BulletConfig::default(),
            levels: DEFAULT_LEVELS.to_vec(),
            powerups: PowerupConfig::default(),
            special: SpecialConfig::default(),
            refraction: RefractionConfig::default(),
        }
    }
}

impl GameConfig {
    /// Look up a level descriptor (None past the last level)
    pub fn level(&self, index: usize) -> Option<&LevelDescriptor> {
        self.levels.get(index)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Radius of a special projectile
    pub fn special_radius(&self) -> f32 {
        self.bullet.radius * self.special.size_multiplier
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!(
            "Loaded config from {} ({} levels)",
            path.as_ref().display(),
            config.level_count()
        );
        Ok(config)
    }

    /// Load a config file, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Using default config ({} unusable: {})",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Serialize to pretty JSON (for writing a starter tuning file)
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject tuning the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }

        for (index, level) in self.levels.iter().enumerate() {
            let reason = if level.duration_secs <= 0.0 {
                Some("duration must be positive")
            } else if level.spawn_interval_ms <= 0.0 {
                Some("spawn interval must be positive")
            } else if level.bullet_speed <= 0.0 {
                Some("bullet speed must be positive")
            } else if level.bullet_count == 0 {
                Some("bullet count must be at least 1")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ConfigError::InvalidLevel {
                    index,
                    reason: reason.to_string(),
                });
            }
        }

        let min_field = 2.0 * self.special.size_multiplier.max(1.0) * self.bullet.radius;
        if self.field_width <= min_field || self.field_height <= min_field {
            return Err(ConfigError::InvalidValue {
                field: "field",
                reason: format!(
                    "{}x{} is too small",
                    self.field_width, self.field_height
                ),
            });
        }
        if self.player.size <= 0.0 || self.player.size * 2.0 >= self.field_width.min(self.field_height)
        {
            return Err(ConfigError::InvalidValue {
                field: "player.size",
                reason: format!("{} does not fit the field", self.player.size),
            });
        }
        if self.player.speed < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "player.speed",
                reason: "must not be negative".to_string(),
            });
        }
        if self.special.spawn_interval_ms <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "special.spawn_interval_ms",
                reason: "must be positive".to_string(),
            });
        }
        if self.refraction.spawn_interval_ms <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "refraction.spawn_interval_ms",
                reason: "must be positive".to_string(),
            });
        }
        if self.special.base_split_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "special.base_split_count",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
