//! Output stand-ins for audio and rendering. Both only log.

use shadowway_core::events::{GameEvent, SoundCue};
use shadowway_platformer::GameSnapshot;

/// Receives what one simulation step produced.
pub trait FrameSink: Send {
    /// `state` is the game's encoded snapshot after the step.
    fn on_step(&mut self, step: u64, events: &[GameEvent], state: &[u8]);
}

/// Logs sound cues in place of playing them.
#[derive(Debug, Default)]
pub struct AudioLog {
    jumps: u64,
    collects: u64,
}

impl AudioLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self, cue: SoundCue) -> u64 {
        match cue {
            SoundCue::Jump => self.jumps,
            SoundCue::Collect => self.collects,
        }
    }
}

impl FrameSink for AudioLog {
    fn on_step(&mut self, step: u64, events: &[GameEvent], _state: &[u8]) {
        for event in events {
            let GameEvent::PlaySound { cue } = event else {
                continue;
            };
            match cue {
                SoundCue::Jump => self.jumps += 1,
                SoundCue::Collect => self.collects += 1,
            }
            tracing::debug!(step, ?cue, "Sound");
        }
    }
}

/// Decodes the snapshot every `interval` steps and logs the HUD line, plus
/// every phase change as it happens.
#[derive(Debug)]
pub struct HudLog {
    interval: u64,
    last: Option<GameSnapshot>,
}

impl HudLog {
    /// An interval of 0 only logs phase changes.
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// The most recently decoded snapshot.
    pub fn last(&self) -> Option<&GameSnapshot> {
        self.last.as_ref()
    }
}

impl FrameSink for HudLog {
    fn on_step(&mut self, step: u64, events: &[GameEvent], state: &[u8]) {
        for event in events {
            match event {
                GameEvent::PhaseChanged { from, to } => {
                    tracing::info!(step, %from, %to, "Screen");
                },
                GameEvent::NewBestTime { secs } => {
                    tracing::info!(step, secs, "New best time");
                },
                _ => {},
            }
        }

        if self.interval == 0 || step % self.interval != 0 {
            return;
        }
        match rmp_serde::from_slice::<GameSnapshot>(state) {
            Ok(snapshot) => {
                let hud = &snapshot.hud;
                tracing::info!(
                    step,
                    phase = %hud.phase,
                    level = hud.level,
                    score = hud.score,
                    time = %hud.run_time,
                    best = %hud.best_time,
                    boost = hud.boost_text.as_deref().unwrap_or(""),
                    entities = snapshot.entities.len(),
                    "HUD"
                );
                self.last = Some(snapshot);
            },
            Err(e) => tracing::warn!(step, error = %e, "Undecodable game snapshot"),
        }
    }
}
