use glam::Vec2;
use serde::{Deserialize, Serialize};

use shadowway_core::geometry::Rect;
use shadowway_core::input::HeldKeys;

use crate::collision::{VerticalContact, resolve_horizontal, resolve_vertical, touches_any};
use crate::config::{PhysicsConfig, PlayerAnimConfig};

/// Jumps available after touching the ground.
pub const MAX_JUMPS: u8 = 2;

/// Which wall the player is sliding on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallSide {
    Left,
    #[default]
    None,
    Right,
}

impl WallSide {
    /// -1 for left, 0 for none, 1 for right.
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::None => 0.0,
            Self::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pose {
    #[default]
    Idle,
    Run,
}

/// Multipliers applied while the power-up is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boost {
    pub speed: f32,
    pub jump: f32,
}

impl Boost {
    pub const NONE: Boost = Boost {
        speed: 1.0,
        jump: 1.0,
    };
}

/// Result of a jump request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Wall,
    Ground,
    Air,
}

/// The single controllable actor.
///
/// `pos` is continuous; `hitbox` is the authoritative collision rectangle and
/// its origin is always `pos` rounded half-to-even.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    pub hitbox: Rect,
    pub on_ground: bool,
    pub jumps_left: u8,
    pub wall_sliding: bool,
    pub wall_side: WallSide,
    pub facing_right: bool,
    pub pose: Pose,
    pub anim_frame: u32,
    anim_elapsed: f64,
}

impl Player {
    pub fn new(physics: &PhysicsConfig) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            hitbox: Rect::new(0, 0, physics.hitbox_width, physics.hitbox_height),
            on_ground: false,
            jumps_left: MAX_JUMPS,
            wall_sliding: false,
            wall_side: WallSide::None,
            facing_right: true,
            pose: Pose::Idle,
            anim_frame: 0,
            anim_elapsed: 0.0,
        }
    }

    /// Place the player at a spawn point and clear all motion state.
    ///
    /// The hitbox drops onto the highest solid whose span contains its centre
    /// and whose top is at or below the spawn height.
    pub fn reset(&mut self, x: f32, y: f32, solids: &[Rect], physics: &PhysicsConfig) {
        *self = Self::new(physics);
        self.pos = Vec2::new(x, y);
        self.hitbox.x = x as i32;
        self.hitbox.y = y as i32;

        let centre_x = self.hitbox.center_x();
        let ground = solids
            .iter()
            .filter(|s| s.left() < centre_x && centre_x < s.right() && s.top() as f32 >= y)
            .min_by_key(|s| s.top());
        if let Some(ground) = ground {
            self.hitbox.set_bottom(ground.top());
        }
        self.sync_pos_from_hitbox();

        let contact = resolve_vertical(
            &mut self.hitbox,
            &mut self.pos.y,
            &mut self.vel.y,
            solids,
            physics.hitbox_height as f32 / 2.0,
        );
        self.apply_contact(contact);
        self.vel = Vec2::ZERO;
        self.sync_pos_from_hitbox();
    }

    /// Advance one tick. Motion is integrated per tick; `dt` only drives the
    /// sprite animation.
    pub fn step(
        &mut self,
        dt: f32,
        held: HeldKeys,
        solids: &[Rect],
        boost: Boost,
        physics: &PhysicsConfig,
        anim: &PlayerAnimConfig,
    ) {
        self.animate(dt, anim);

        self.acc = Vec2::new(0.0, physics.gravity);
        if held.left {
            self.acc.x = -physics.acceleration * boost.speed;
            self.facing_right = false;
        }
        if held.right {
            self.acc.x = physics.acceleration * boost.speed;
            self.facing_right = true;
        }
        if !held.any() {
            self.acc.x += self.vel.x * physics.friction;
        }

        self.vel += self.acc;
        let max_run = physics.max_run_speed * boost.speed;
        self.vel.x = self.vel.x.clamp(-max_run, max_run);
        if self.vel.x.abs() < physics.drift_dead_zone {
            self.vel.x = 0.0;
        }

        self.detect_wall_slide(held, solids, physics);

        self.pos.x += self.vel.x + 0.5 * self.acc.x;
        self.hitbox.x = round_coord(self.pos.x);
        resolve_horizontal(&mut self.hitbox, &mut self.pos.x, &mut self.vel.x, solids);

        self.pos.y += self.vel.y + 0.5 * self.acc.y;
        self.hitbox.y = round_coord(self.pos.y);
        if !self.wall_sliding {
            self.on_ground = false;
        }
        let contact = resolve_vertical(
            &mut self.hitbox,
            &mut self.pos.y,
            &mut self.vel.y,
            solids,
            physics.hitbox_height as f32 / 2.0,
        );
        self.apply_contact(contact);

        if self.vel.y > physics.max_fall_speed {
            self.vel.y = physics.max_fall_speed;
        }
    }

    /// Try to jump. Returns which jump fired, or `None` when no jump is
    /// available.
    pub fn jump(&mut self, boost: Boost, physics: &PhysicsConfig) -> Option<JumpKind> {
        if self.wall_sliding {
            self.vel.y = physics.wall_jump_y * boost.jump;
            self.vel.x = physics.wall_jump_x * -self.wall_side.sign();
            self.wall_sliding = false;
            self.wall_side = WallSide::None;
            self.jumps_left = 1;
            self.on_ground = false;
            self.facing_right = self.vel.x > 0.0;
            Some(JumpKind::Wall)
        } else if self.on_ground {
            self.vel.y = physics.jump_power * boost.jump;
            self.jumps_left = self.jumps_left.saturating_sub(1);
            self.on_ground = false;
            Some(JumpKind::Ground)
        } else if self.jumps_left > 0 {
            self.vel.y = physics.double_jump_power * boost.jump;
            self.jumps_left -= 1;
            self.on_ground = false;
            Some(JumpKind::Air)
        } else {
            None
        }
    }

    /// Probe sideways for a wall while airborne and falling.
    fn detect_wall_slide(&mut self, held: HeldKeys, solids: &[Rect], physics: &PhysicsConfig) {
        self.wall_sliding = false;
        self.wall_side = WallSide::None;
        if self.on_ground || self.vel.y <= 0.0 {
            return;
        }

        let probe = physics.wall_probe_distance;
        let wall_right = touches_any(&self.hitbox.translated(probe, 0), solids);
        if wall_right && held.right {
            self.wall_side = WallSide::Right;
        } else if held.left && touches_any(&self.hitbox.translated(-probe, 0), solids) {
            self.wall_side = WallSide::Left;
        }

        if self.wall_side != WallSide::None {
            self.wall_sliding = true;
            self.vel.y = self.vel.y.min(physics.wall_slide_speed);
            self.jumps_left = 1;
        }
    }

    fn apply_contact(&mut self, contact: VerticalContact) {
        if contact.landed {
            self.on_ground = true;
            self.wall_sliding = false;
            self.wall_side = WallSide::None;
            self.jumps_left = MAX_JUMPS;
        }
    }

    fn animate(&mut self, dt: f32, anim: &PlayerAnimConfig) {
        let pose = if self.vel.x.abs() > 0.1 {
            Pose::Run
        } else {
            Pose::Idle
        };
        if pose != self.pose {
            self.pose = pose;
            self.anim_frame = 0;
            self.anim_elapsed = 0.0;
        }

        let frames = match self.pose {
            Pose::Idle => anim.idle_frames,
            Pose::Run => anim.run_frames,
        };
        self.anim_elapsed += f64::from(dt.max(0.0));
        if self.anim_elapsed * 1000.0 > f64::from(anim.frame_ms) {
            self.anim_elapsed = 0.0;
            self.anim_frame = (self.anim_frame + 1) % frames.max(1);
        }
    }

    fn sync_pos_from_hitbox(&mut self) {
        self.pos = Vec2::new(self.hitbox.x as f32, self.hitbox.y as f32);
    }
}

/// Round a continuous coordinate to a pixel, ties to even.
pub fn round_coord(v: f32) -> i32 {
    v.round_ties_even() as i32
}
