use std::fmt;

use serde::{Deserialize, Serialize};

use shadowway_core::geometry::Rect;

use crate::config::{SCREEN_HEIGHT as H, SCREEN_WIDTH as W};

/// Standard goal door size.
pub const GOAL_W: i32 = 50;
pub const GOAL_H: i32 = 70;
/// Height at which coins float above the platform they mark.
pub const COLLECT_OFFSET: i32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub enum LevelError {
    UnknownIndex(usize),
    Parse(String),
    Empty,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownIndex(i) => write!(f, "no level with index {i}"),
            Self::Parse(e) => write!(f, "invalid level pack: {e}"),
            Self::Empty => write!(f, "level pack contains no levels"),
        }
    }
}

impl std::error::Error for LevelError {}

/// Geometry for one level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelDef {
    pub platforms: Vec<Rect>,
    /// Coin centres.
    pub collectibles: Vec<(i32, i32)>,
    pub goal: Rect,
    pub player_start: (f32, f32),
}

/// TOML shape: rectangles as `[x, y, w, h]`, points as `[x, y]`.
#[derive(Debug, Serialize, Deserialize)]
struct RawLevel {
    platforms: Vec<[i32; 4]>,
    #[serde(default)]
    collectibles: Vec<[i32; 2]>,
    goal: [i32; 4],
    player_start: [f32; 2],
}

#[derive(Debug, Serialize, Deserialize)]
struct RawPack {
    levels: Vec<RawLevel>,
}

impl From<RawLevel> for LevelDef {
    fn from(raw: RawLevel) -> Self {
        let rect = |[x, y, w, h]: [i32; 4]| Rect::new(x, y, w, h);
        Self {
            platforms: raw.platforms.into_iter().map(rect).collect(),
            collectibles: raw.collectibles.into_iter().map(|[x, y]| (x, y)).collect(),
            goal: rect(raw.goal),
            player_start: (raw.player_start[0], raw.player_start[1]),
        }
    }
}

/// Read-only, index-addressed list of levels.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelTable {
    levels: Vec<LevelDef>,
}

impl LevelTable {
    pub fn new(levels: Vec<LevelDef>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        Ok(Self { levels })
    }

    /// Parse a level pack:
    ///
    /// ```toml
    /// [[levels]]
    /// platforms = [[0, 660, 1000, 40]]
    /// collectibles = [[275, 520]]
    /// goal = [920, 50, 50, 70]
    /// player_start = [150.0, 620.0]
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, LevelError> {
        let pack: RawPack = toml::from_str(text).map_err(|e| LevelError::Parse(e.to_string()))?;
        Self::new(pack.levels.into_iter().map(LevelDef::from).collect())
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> &[LevelDef] {
        &self.levels
    }

    pub fn get(&self, index: usize) -> Result<&LevelDef, LevelError> {
        self.levels.get(index).ok_or(LevelError::UnknownIndex(index))
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.levels.len()
    }

    /// The ten levels the game ships with.
    pub fn builtin() -> Self {
        Self {
            levels: builtin_levels(),
        }
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn r(x: i32, y: i32, w: i32, h: i32) -> Rect {
    Rect::new(x, y, w, h)
}

fn goal(x: i32, y: i32) -> Rect {
    Rect::new(x, y, GOAL_W, GOAL_H)
}

fn builtin_levels() -> Vec<LevelDef> {
    const OFF: i32 = COLLECT_OFFSET;
    vec![
        // 1: tutorial room with walls on both sides
        LevelDef {
            platforms: vec![
                r(0, H - 40, W, 40),
                r(200, H - 150, 150, 20),
                r(450, H - 280, 200, 20),
                r(50, H - 400, 100, 20),
                r(700, H - 450, 150, 20),
                r(W - 100, 100, 100, 200),
                r(W - 100, 400, 100, 200),
                r(0, 100, 100, H - 140),
                r(300, 150, 200, 20),
            ],
            collectibles: vec![
                (275, H - 150 - OFF),
                (550, H - 280 - OFF),
                (120, H - 400 - OFF),
                (775, H - 450 - OFF),
                (400, 150 - OFF),
                (W - 50, 80),
            ],
            goal: goal(W - 80, 50),
            player_start: (150.0, (H - 80) as f32),
        },
        // 2: jumps
        LevelDef {
            platforms: vec![
                r(0, H - 40, 200, 40),
                r(300, H - 100, 150, 20),
                r(550, H - 180, 150, 20),
                r(800, H - 250, 150, 20),
                r(600, H - 350, 100, 20),
                r(350, H - 450, 100, 20),
                r(100, H - 550, 100, 20),
                r(W - 50, 0, 50, H),
            ],
            collectibles: vec![
                (375, H - 100 - OFF),
                (625, H - 180 - OFF),
                (875, H - 250 - OFF),
                (650, H - 350 - OFF),
                (400, H - 450 - OFF),
                (150, H - 550 - OFF),
            ],
            goal: goal(125, H - 550 - GOAL_H),
            player_start: (50.0, (H - 80) as f32),
        },
        // 3: wall jumps
        LevelDef {
            platforms: vec![
                r(0, H - 40, 100, 40),
                r(W - 100, H - 40, 100, 40),
                r(200, 100, 50, H - 150),
                r(400, 200, 50, H - 250),
                r(600, 100, 50, H - 150),
                r(800, 200, 50, H - 250),
                r(0, 0, W, 20),
            ],
            collectibles: vec![
                (170, H - 100),
                (380, H - 200),
                (575, H - 100),
                (775, H - 200),
                (500, 50),
            ],
            goal: goal(W - 75, H - 40 - GOAL_H),
            player_start: (50.0, (H - 80) as f32),
        },
        // 4: precision
        LevelDef {
            platforms: vec![
                r(0, H - 40, 150, 40),
                r(250, H - 100, 80, 20),
                r(400, H - 160, 80, 20),
                r(550, H - 220, 80, 20),
                r(700, H - 280, 80, 20),
                r(550, H - 400, 80, 20),
                r(400, H - 460, 80, 20),
                r(250, H - 520, 80, 20),
                r(100, H - 580, 80, 20),
                r(W - 50, 0, 50, H),
            ],
            collectibles: vec![
                (290, H - 100 - OFF),
                (440, H - 160 - OFF),
                (590, H - 220 - OFF),
                (740, H - 280 - OFF),
                (590, H - 400 - OFF),
                (440, H - 460 - OFF),
                (290, H - 520 - OFF),
                (140, H - 580 - OFF),
            ],
            goal: goal(115, H - 580 - GOAL_H),
            player_start: (50.0, (H - 80) as f32),
        },
        // 5: vertical ascent
        LevelDef {
            platforms: vec![
                r(0, H - 40, W, 40),
                r(100, H - 150, 100, 20),
                r(W - 200, H - 250, 100, 20),
                r(100, H - 350, 100, 20),
                r(W - 200, H - 450, 100, 20),
                r(100, H - 550, 100, 20),
                r(W - 200, H - 650, 100, 20),
                r(0, 0, 20, H),
                r(W - 20, 0, 20, H),
            ],
            collectibles: vec![
                (150, H - 150 - OFF),
                (W - 150, H - 250 - OFF),
                (150, H - 350 - OFF),
                (W - 150, H - 450 - OFF),
                (150, H - 550 - OFF),
            ],
            goal: goal(W - 175, H - 650 - GOAL_H),
            player_start: ((W / 2) as f32, (H - 80) as f32),
        },
        // 6: complex layout
        LevelDef {
            platforms: vec![
                r(0, H - 40, W, 40),
                r(100, H - 140, 100, 20),
                r(300, H - 240, 100, 20),
                r(50, 400, 100, 20),
                r(W - 150, 400, 100, 20),
                r(300, 250, 400, 20),
                r(W - 100, 100, 100, 200),
                r(0, 100, 100, 200),
                r(W / 2 - 50, 100, 100, 20),
            ],
            collectibles: vec![
                (150, H - 140 - OFF),
                (350, H - 240 - OFF),
                (100, 400 - OFF),
                (W - 100, 400 - OFF),
                (400, 250 - OFF),
                (600, 250 - OFF),
                (50, 75),
                (W - 50, 75),
            ],
            goal: goal(W / 2 - GOAL_W / 2, 100 - GOAL_H),
            player_start: (50.0, (H - 80) as f32),
        },
        // 7: simple ascent
        LevelDef {
            platforms: vec![
                r(0, H - 40, W, 40),
                r(200, 500, 100, 20),
                r(400, 400, 100, 20),
                r(600, 300, 100, 20),
            ],
            collectibles: vec![(250, 500 - OFF), (450, 400 - OFF), (650, 300 - OFF)],
            goal: goal(625, 300 - GOAL_H),
            player_start: (50.0, (H - 80) as f32),
        },
        // 8: vertical zigzag
        LevelDef {
            platforms: vec![
                r(0, H - 40, 100, 40),
                r(200, H - 100, 50, 20),
                r(0, H - 200, 50, 20),
                r(200, H - 300, 50, 20),
                r(0, H - 400, 50, 20),
                r(200, H - 500, 50, 20),
                r(W - 50, 0, 50, H),
            ],
            collectibles: vec![
                (225, H - 100 - OFF),
                (25, H - 200 - OFF),
                (225, H - 300 - OFF),
                (25, H - 400 - OFF),
                (225, H - 500 - OFF),
            ],
            goal: goal(W - 100, 80),
            player_start: (50.0, (H - 80) as f32),
        },
        // 9: diagonal staircase
        LevelDef {
            platforms: (0..10)
                .map(|i| r(i * 100 + 50, H - 40 - i * 60, 80, 20))
                .collect(),
            collectibles: (0..10)
                .map(|i| (i * 100 + 90, H - 40 - i * 60 - OFF))
                .collect(),
            goal: goal(950 + 40 - GOAL_W / 2, 120 - GOAL_H),
            player_start: (40.0, (H - 80) as f32),
        },
        // 10: final challenge
        LevelDef {
            platforms: vec![
                r(0, H - 40, 150, 40),
                r(300, H - 100, 100, 20),
                r(150, H - 200, 50, 20),
                r(0, 100, 50, H - 140),
                r(200, H - 350, 100, 20),
                r(400, H - 450, 100, 20),
                r(600, H - 550, 100, 20),
                r(W - 50, 100, 50, H - 100),
                r(W - 150, 50, 100, 20),
            ],
            collectibles: vec![
                (350, H - 100 - OFF),
                (175, H - 200 - OFF),
                (70, 150),
                (250, H - 350 - OFF),
                (450, H - 450 - OFF),
                (650, H - 550 - OFF),
                (W - 75, 150),
            ],
            goal: goal(W - 100, 50 - GOAL_H),
            player_start: (50.0, (H - 80) as f32),
        },
    ]
}
