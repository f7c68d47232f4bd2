use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use shadowway_core::events::GamePhase;
use shadowway_core::input::{HeldKeys, InputEvent, InputFrame};

use crate::source::InputSource;

/// Ticks a screen stays up before the bot clicks through it.
const SCREEN_DWELL_TICKS: u64 = 30;

/// Per-tick chance of pressing jump while playing.
const JUMP_CHANCE: f64 = 0.05;

/// Range of ticks between direction changes.
const MIN_HOLD_TICKS: u64 = 20;
const MAX_HOLD_TICKS: u64 = 90;

/// Seeded autopilot: clicks through the menus, runs mostly right and jumps
/// at random. The same seed always produces the same input sequence for the
/// same phase sequence.
#[derive(Debug)]
pub struct Autopilot {
    rng: StdRng,
    phase: Option<GamePhase>,
    ticks_in_phase: u64,
    held: HeldKeys,
    hold_until: u64,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            phase: None,
            ticks_in_phase: 0,
            held: HeldKeys::RIGHT,
            hold_until: 0,
        }
    }

    fn screen_button(phase: GamePhase) -> Option<InputEvent> {
        match phase {
            GamePhase::Menu => Some(InputEvent::Play),
            GamePhase::Controls => Some(InputEvent::Back),
            GamePhase::LevelComplete => Some(InputEvent::NextLevel),
            GamePhase::GameOver => Some(InputEvent::RestartLevel),
            GamePhase::GameWon => Some(InputEvent::Quit),
            GamePhase::Playing => None,
        }
    }

    fn pick_direction(&mut self, tick: u64) {
        let roll: f64 = self.rng.random();
        self.held = if roll < 0.75 {
            HeldKeys::RIGHT
        } else if roll < 0.9 {
            HeldKeys::LEFT
        } else {
            HeldKeys::NONE
        };
        self.hold_until = tick + self.rng.random_range(MIN_HOLD_TICKS..=MAX_HOLD_TICKS);
    }
}

impl InputSource for Autopilot {
    fn next_frame(&mut self, tick: u64, phase: GamePhase) -> InputFrame {
        if self.phase != Some(phase) {
            self.phase = Some(phase);
            self.ticks_in_phase = 0;
        } else {
            self.ticks_in_phase += 1;
        }

        if let Some(button) = Self::screen_button(phase) {
            if self.ticks_in_phase == SCREEN_DWELL_TICKS {
                tracing::debug!(%phase, ?button, "Autopilot click");
                return InputFrame::pressed(button);
            }
            return InputFrame::idle();
        }

        if tick >= self.hold_until {
            self.pick_direction(tick);
        }
        let mut frame = InputFrame::holding(self.held);
        if self.rng.random_bool(JUMP_CHANCE) {
            frame = frame.with_event(InputEvent::Jump);
        }
        frame
    }

    fn name(&self) -> &'static str {
        "autopilot"
    }
}
