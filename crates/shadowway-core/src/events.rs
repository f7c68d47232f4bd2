use serde::{Deserialize, Serialize};

/// Top-level screens of the game flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Menu,
    Controls,
    Playing,
    LevelComplete,
    GameOver,
    GameWon,
}

impl GamePhase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Controls => "controls",
            Self::Playing => "playing",
            Self::LevelComplete => "level_complete",
            Self::GameOver => "game_over",
            Self::GameWon => "game_won",
        }
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Sound effects the simulation asks an audio sink to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Jump,
    Collect,
}

/// Events emitted by a game during a tick, consumed by the host loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    PlaySound { cue: SoundCue },
    LevelLoaded { level: usize },
    CoinsCollected { count: u32, score: u32 },
    PowerUpActivated { remaining_secs: f64 },
    PowerUpExtended { remaining_secs: f64 },
    PowerUpExpired,
    NewBestTime { secs: f64 },
    QuitRequested,
}
