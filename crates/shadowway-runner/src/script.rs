//! Scripted input: a TOML timeline of key and button events keyed by tick.
//!
//! ```toml
//! end_tick = 600
//!
//! [[steps]]
//! tick = 0
//! clicks = ["play"]
//!
//! [[steps]]
//! tick = 5
//! keys_down = ["ArrowRight"]
//!
//! [[steps]]
//! tick = 30
//! keys_down = ["Space"]
//! keys_up = ["Space"]
//! ```

use std::path::Path;

use serde::Deserialize;

use shadowway_core::events::GamePhase;
use shadowway_core::input::{InputEvent, InputFrame, InputState};

use crate::error::RunnerError;
use crate::source::InputSource;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScriptStep {
    pub tick: u64,
    /// Key codes pressed on this tick (`"KeyA"`, `"ArrowRight"`, `"Space"`...).
    pub keys_down: Vec<String>,
    /// Key codes released after this tick's frame is taken.
    pub keys_up: Vec<String>,
    pub clicks: Vec<InputEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawScript {
    end_tick: Option<u64>,
    steps: Vec<ScriptStep>,
}

/// Replays a fixed timeline through the same keyboard mapping a player uses.
#[derive(Debug)]
pub struct ScriptedInput {
    steps: Vec<ScriptStep>,
    cursor: usize,
    /// A quit click is sent on this tick.
    end_tick: Option<u64>,
    keys: InputState,
}

impl ScriptedInput {
    pub fn new(mut steps: Vec<ScriptStep>, end_tick: Option<u64>) -> Self {
        steps.sort_by_key(|s| s.tick);
        Self {
            steps,
            cursor: 0,
            end_tick,
            keys: InputState::new(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RunnerError> {
        let raw: RawScript =
            toml::from_str(content).map_err(|e| RunnerError::Script(e.to_string()))?;
        Ok(Self::new(raw.steps, raw.end_tick))
    }

    pub fn from_file(path: &Path) -> Result<Self, RunnerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RunnerError::Script(format!("{}: {e}", path.display())))?;
        let script = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            steps = script.steps.len(),
            end_tick = ?script.end_tick,
            "Loaded input script"
        );
        Ok(script)
    }

    /// True once every step has been replayed.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.steps.len()
    }
}

impl InputSource for ScriptedInput {
    fn next_frame(&mut self, tick: u64, _phase: GamePhase) -> InputFrame {
        let start = self.cursor;
        while self.cursor < self.steps.len() && self.steps[self.cursor].tick <= tick {
            self.cursor += 1;
        }
        let due = &self.steps[start..self.cursor];

        for step in due {
            for key in &step.keys_down {
                self.keys.on_key_down(key.as_str());
            }
            for &click in &step.clicks {
                self.keys.on_click(click);
            }
        }
        if self.end_tick == Some(tick) {
            self.keys.on_click(InputEvent::Quit);
        }

        let frame = self.keys.take_frame();
        for step in due {
            for key in &step.keys_up {
                self.keys.on_key_up(key);
            }
        }
        frame
    }

    fn name(&self) -> &'static str {
        "script"
    }
}
