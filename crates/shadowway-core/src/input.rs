use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Movement keys held down during a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    pub const NONE: HeldKeys = HeldKeys {
        left: false,
        right: false,
    };

    pub const LEFT: HeldKeys = HeldKeys {
        left: true,
        right: false,
    };

    pub const RIGHT: HeldKeys = HeldKeys {
        left: false,
        right: true,
    };

    pub fn any(&self) -> bool {
        self.left || self.right
    }
}

/// Edge-triggered inputs: key presses and menu button clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    Jump,
    /// The `R` key.
    Restart,
    Escape,
    Quit,
    Play,
    Controls,
    Back,
    NextLevel,
    MainMenu,
    /// The "Restart Level" button on the game-over screen.
    RestartLevel,
}

/// Everything the simulation reads from the player for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    pub held: HeldKeys,
    pub events: Vec<InputEvent>,
}

impl InputFrame {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn holding(held: HeldKeys) -> Self {
        Self {
            held,
            events: Vec::new(),
        }
    }

    pub fn with_event(mut self, event: InputEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn pressed(event: InputEvent) -> Self {
        Self::idle().with_event(event)
    }
}

/// Raw keyboard state accumulated between ticks, keyed by DOM-style key codes
/// (`"KeyA"`, `"ArrowLeft"`, `"Space"`, ...).
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    pub keys_down: HashSet<String>,
    /// Keys pressed since the last frame was taken.
    pub keys_just_pressed: HashSet<String>,
    /// Button clicks since the last frame was taken, in click order.
    pub clicks: Vec<InputEvent>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key_down(&mut self, code: impl Into<String>) {
        let code = code.into();
        if self.keys_down.insert(code.clone()) {
            self.keys_just_pressed.insert(code);
        }
    }

    pub fn on_key_up(&mut self, code: &str) {
        self.keys_down.remove(code);
    }

    pub fn on_click(&mut self, button: InputEvent) {
        self.clicks.push(button);
    }

    pub fn is_key_down(&self, code: &str) -> bool {
        self.keys_down.contains(code)
    }

    pub fn is_key_just_pressed(&self, code: &str) -> bool {
        self.keys_just_pressed.contains(code)
    }

    /// Build the frame for this tick and clear the edge-triggered state.
    ///
    /// Arrow keys and WASD move, Space/Up/W jump, R restarts, Escape returns
    /// to the menu.
    pub fn take_frame(&mut self) -> InputFrame {
        let held = HeldKeys {
            left: self.is_key_down("KeyA") || self.is_key_down("ArrowLeft"),
            right: self.is_key_down("KeyD") || self.is_key_down("ArrowRight"),
        };

        let mut events = Vec::new();
        if ["Space", "ArrowUp", "KeyW"]
            .iter()
            .any(|k| self.is_key_just_pressed(k))
        {
            events.push(InputEvent::Jump);
        }
        if self.is_key_just_pressed("KeyR") {
            events.push(InputEvent::Restart);
        }
        if self.is_key_just_pressed("Escape") {
            events.push(InputEvent::Escape);
        }
        events.append(&mut self.clicks);

        self.keys_just_pressed.clear();
        InputFrame { held, events }
    }
}
