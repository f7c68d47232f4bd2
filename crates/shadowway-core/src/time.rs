use serde::{Deserialize, Serialize};

/// Shown when no time has been recorded yet.
pub const TIME_PLACEHOLDER: &str = "--:--:---";

/// Format a duration in seconds as `MM:SS:mmm`.
///
/// `None`, negative, and non-finite values render as [`TIME_PLACEHOLDER`].
/// Minutes are not capped, so long runs print three or more digits.
pub fn format_time(secs: Option<f64>) -> String {
    let Some(s) = secs.filter(|s| s.is_finite() && *s >= 0.0) else {
        return TIME_PLACEHOLDER.to_string();
    };
    let millis = ((s * 1000.0) % 1000.0) as u64;
    let seconds = (s % 60.0) as u64;
    let minutes = (s / 60.0).floor() as u64;
    format!("{minutes:02}:{seconds:02}:{millis:03}")
}

/// Monotonic session clock in seconds, advanced once per tick.
///
/// Unlike the level timer it never pauses, so anything scheduled against
/// it (the power-up expiry) keeps running across menus and level screens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionClock {
    now: f64,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.now += f64::from(dt);
        }
    }
}
