use serde::{Deserialize, Serialize};

/// Level and run timing for one attempt at the full game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTimer {
    /// Seconds spent on the current level attempt.
    pub level_elapsed: f64,
    /// Sum of the elapsed times of the levels already cleared this run.
    pub total: f64,
    /// Set once, when the last level is cleared.
    pub final_time: Option<f64>,
    pub active: bool,
}

impl RunTimer {
    /// Start (or restart) the current level from zero.
    pub fn start_level(&mut self) {
        self.level_elapsed = 0.0;
        self.active = true;
    }

    pub fn tick(&mut self, dt: f32) {
        if self.active {
            self.level_elapsed += f64::from(dt);
        }
    }

    pub fn pause(&mut self) {
        self.active = false;
    }

    /// Bank the cleared level's time and start the next one.
    pub fn advance_level(&mut self) {
        self.total += self.level_elapsed;
        self.start_level();
    }

    /// Time shown while playing: banked levels plus the current attempt.
    pub fn run_time(&self) -> f64 {
        self.total + self.level_elapsed
    }

    /// Fix the run's final time.
    pub fn finish_run(&mut self) -> f64 {
        let final_time = self.run_time();
        self.final_time = Some(final_time);
        final_time
    }
}

/// Whether a finished run beats the stored record. Any finite time beats an
/// unset record.
pub fn beats_record(final_time: f64, best: Option<f64>) -> bool {
    final_time.is_finite() && best.is_none_or(|best| final_time < best)
}
