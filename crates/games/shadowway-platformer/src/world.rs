use serde::{Deserialize, Serialize};

use shadowway_core::geometry::Rect;

use crate::config::{AnimationConfig, WorldConfig};
use crate::levels::LevelDef;

/// A spinning scroll coin, removed the tick it is touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub rect: Rect,
    pub frame: u32,
    /// Session-clock time of the last frame change.
    last_frame_at: f64,
}

impl Collectible {
    /// A coin of `size` x `size` centred on the spawn point.
    pub fn new(cx: i32, cy: i32, size: i32, now: f64) -> Self {
        Self {
            rect: Rect::from_center(cx, cy, size, size),
            frame: 0,
            last_frame_at: now,
        }
    }

    pub fn animate(&mut self, now: f64, anim: &AnimationConfig) {
        if now - self.last_frame_at > anim.frame_secs() {
            self.last_frame_at = now;
            self.frame = (self.frame + 1) % anim.frames.max(1);
        }
    }
}

/// Static geometry and pickups of the level being played.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub platforms: Vec<Rect>,
    pub collectibles: Vec<Collectible>,
    pub goal: Option<Rect>,
}

impl World {
    pub fn from_level(level: &LevelDef, world: &WorldConfig, now: f64) -> Self {
        Self {
            platforms: level.platforms.clone(),
            collectibles: level
                .collectibles
                .iter()
                .map(|&(x, y)| Collectible::new(x, y, world.collectible_size, now))
                .collect(),
            goal: Some(level.goal),
        }
    }

    pub fn clear(&mut self) {
        self.platforms.clear();
        self.collectibles.clear();
        self.goal = None;
    }

    pub fn animate(&mut self, now: f64, anim: &AnimationConfig) {
        for coin in &mut self.collectibles {
            coin.animate(now, anim);
        }
    }

    /// Remove every collectible the hitbox overlaps and return how many.
    pub fn collect(&mut self, hitbox: &Rect) -> u32 {
        let before = self.collectibles.len();
        self.collectibles.retain(|c| !hitbox.intersects(&c.rect));
        (before - self.collectibles.len()) as u32
    }

    pub fn reached_goal(&self, hitbox: &Rect) -> bool {
        self.goal.is_some_and(|g| hitbox.intersects(&g))
    }

    /// Everything a renderer needs to draw the level, player last.
    pub fn renderables(&self, player: Option<Renderable>) -> Vec<Renderable> {
        let platforms = self.platforms.iter().map(|&rect| Renderable {
            kind: EntityKind::Platform,
            rect,
            frame: 0,
        });
        let coins = self.collectibles.iter().map(|c| Renderable {
            kind: EntityKind::Collectible,
            rect: c.rect,
            frame: c.frame,
        });
        let goal = self.goal.map(|rect| Renderable {
            kind: EntityKind::Goal,
            rect,
            frame: 0,
        });
        platforms.chain(coins).chain(goal).chain(player).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Platform,
    Collectible,
    Goal,
    PlayerIdle,
    PlayerRun,
}

/// One drawable rectangle with its animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Renderable {
    pub kind: EntityKind,
    pub rect: Rect,
    pub frame: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelTable;

    fn level_one() -> World {
        let table = LevelTable::builtin();
        World::from_level(&table.levels()[0], &WorldConfig::default(), 0.0)
    }

    #[test]
    fn collectibles_are_centred_on_spawn() {
        let coin = Collectible::new(275, 520, 30, 0.0);
        assert_eq!(coin.rect, Rect::new(260, 505, 30, 30));
    }

    #[test]
    fn coin_is_collected_once() {
        let mut world = level_one();
        let total = world.collectibles.len();
        let hitbox = Rect::new(260, 500, 30, 45);
        assert_eq!(world.collect(&hitbox), 1);
        assert_eq!(world.collect(&hitbox), 0);
        assert_eq!(world.collectibles.len(), total - 1);
    }

    #[test]
    fn several_coins_in_one_sweep() {
        let mut world = World {
            collectibles: vec![
                Collectible::new(100, 100, 30, 0.0),
                Collectible::new(120, 110, 30, 0.0),
                Collectible::new(500, 500, 30, 0.0),
            ],
            ..World::default()
        };
        assert_eq!(world.collect(&Rect::new(95, 95, 30, 45)), 2);
        assert_eq!(world.collectibles.len(), 1);
    }

    #[test]
    fn coin_animation_waits_for_frame_time() {
        let anim = AnimationConfig::default();
        let mut coin = Collectible::new(0, 0, 30, 0.0);
        coin.animate(0.05, &anim);
        assert_eq!(coin.frame, 0);
        coin.animate(0.1, &anim);
        assert_eq!(coin.frame, 1);
        let rect = coin.rect;
        for i in 2..=9 {
            coin.animate(0.1 * f64::from(i), &anim);
        }
        assert_eq!(coin.frame, 0, "nine frames wrap around");
        assert_eq!(coin.rect, rect);
    }

    #[test]
    fn clear_empties_everything() {
        let mut world = level_one();
        world.clear();
        assert!(world.platforms.is_empty());
        assert!(world.collectibles.is_empty());
        assert!(world.goal.is_none());
        assert!(!world.reached_goal(&Rect::new(0, 0, 1000, 700)));
    }

    #[test]
    fn renderables_list_player_last() {
        let world = level_one();
        let player = Renderable {
            kind: EntityKind::PlayerIdle,
            rect: Rect::new(150, 615, 30, 45),
            frame: 0,
        };
        let items = world.renderables(Some(player));
        assert_eq!(
            items.len(),
            world.platforms.len() + world.collectibles.len() + 2
        );
        assert_eq!(items.last(), Some(&player));
        assert_eq!(items[items.len() - 2].kind, EntityKind::Goal);
    }
}
