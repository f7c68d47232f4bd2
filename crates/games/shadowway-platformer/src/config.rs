use serde::{Deserialize, Serialize};

/// Screen width in pixels, used to lay out the builtin levels.
pub const SCREEN_WIDTH: i32 = 1000;
/// Screen height in pixels.
pub const SCREEN_HEIGHT: i32 = 700;
/// How far below the screen the hitbox top may drop before the player is lost.
pub const FALL_MARGIN: i32 = 50;

/// Player movement tuning. Velocities are in pixels per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub acceleration: f32,
    /// Negative: friction opposes horizontal velocity.
    pub friction: f32,
    pub gravity: f32,
    pub jump_power: f32,
    pub double_jump_power: f32,
    pub wall_slide_speed: f32,
    pub wall_jump_x: f32,
    pub wall_jump_y: f32,
    pub max_fall_speed: f32,
    pub max_run_speed: f32,
    pub hitbox_width: i32,
    pub hitbox_height: i32,
    /// Pixels the hitbox is shifted sideways when probing for a wall.
    pub wall_probe_distance: i32,
    /// Horizontal speeds below this snap to zero.
    pub drift_dead_zone: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            acceleration: 0.7,
            friction: -0.15,
            gravity: 0.6,
            jump_power: -13.0,
            double_jump_power: -10.0,
            wall_slide_speed: 2.0,
            wall_jump_x: 7.0,
            wall_jump_y: -10.0,
            max_fall_speed: 15.0,
            max_run_speed: 7.0,
            hitbox_width: 30,
            hitbox_height: 45,
            wall_probe_distance: 1,
            drift_dead_zone: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    pub coins_needed: u32,
    pub initial_duration_secs: f64,
    pub extension_per_coin_secs: f64,
    pub speed_multiplier: f32,
    pub jump_multiplier: f32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            coins_needed: 3,
            initial_duration_secs: 2.5,
            extension_per_coin_secs: 1.0,
            speed_multiplier: 1.3,
            jump_multiplier: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub screen_height: i32,
    pub fall_margin: i32,
    pub collectible_size: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            screen_height: SCREEN_HEIGHT,
            fall_margin: FALL_MARGIN,
            collectible_size: 30,
        }
    }
}

impl WorldConfig {
    /// Hitbox tops strictly below this line are out of the world.
    pub fn fall_bound(&self) -> i32 {
        self.screen_height + self.fall_margin
    }
}

/// Frame cycling for a looping sprite animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub frames: u32,
    pub frame_ms: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames: 9,
            frame_ms: 90,
        }
    }
}

impl AnimationConfig {
    pub fn frame_secs(&self) -> f64 {
        f64::from(self.frame_ms) / 1000.0
    }
}

/// Idle and run cycles for the player sprite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerAnimConfig {
    pub idle_frames: u32,
    pub run_frames: u32,
    pub frame_ms: u32,
}

impl Default for PlayerAnimConfig {
    fn default() -> Self {
        Self {
            idle_frames: 10,
            run_frames: 16,
            frame_ms: 100,
        }
    }
}

/// Top-level game configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerConfig {
    pub physics: PhysicsConfig,
    pub powerup: PowerUpConfig,
    pub world: WorldConfig,
    pub tick_rate_hz: f32,
    pub collectible_anim: AnimationConfig,
    pub player_anim: PlayerAnimConfig,
}

impl Default for PlatformerConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            powerup: PowerUpConfig::default(),
            world: WorldConfig::default(),
            tick_rate_hz: 60.0,
            collectible_anim: AnimationConfig::default(),
            player_anim: PlayerAnimConfig::default(),
        }
    }
}

impl PlatformerConfig {
    /// Load config from `$SHADOWWAY_CONFIG` or `config/shadowway.toml`.
    /// Falls back to defaults if the file is missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("SHADOWWAY_CONFIG")
            .unwrap_or_else(|_| "config/shadowway.toml".to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<PlatformerConfig>(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    PlatformerConfig::default()
                },
            },
            Err(_) => PlatformerConfig::default(),
        }
    }
}
