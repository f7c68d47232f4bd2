use serde::{Deserialize, Serialize};

use crate::config::PowerUpConfig;
use crate::physics::Boost;

/// What a single collected coin did to the power-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoinOutcome {
    /// Counted toward the next activation.
    Progress { count: u32 },
    Activated { remaining_secs: f64 },
    Extended { remaining_secs: f64 },
}

/// Speed and jump boost earned by collecting coins.
///
/// Times are on the session clock, which keeps running outside gameplay, so
/// a boost can run out while a menu is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub active: bool,
    pub expires_at: f64,
    /// Coins collected toward the next activation.
    pub progress: u32,
}

impl PowerUp {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Deactivate once the clock reaches the expiry time. Returns true on
    /// the tick it expires.
    pub fn expire_if_due(&mut self, now: f64) -> bool {
        if self.active && now >= self.expires_at {
            self.active = false;
            return true;
        }
        false
    }

    pub fn on_coin(&mut self, now: f64, cfg: &PowerUpConfig) -> CoinOutcome {
        if self.active {
            self.expires_at += cfg.extension_per_coin_secs;
            return CoinOutcome::Extended {
                remaining_secs: self.expires_at - now,
            };
        }
        self.progress += 1;
        if self.progress >= cfg.coins_needed {
            self.active = true;
            self.expires_at = now + cfg.initial_duration_secs;
            self.progress = 0;
            return CoinOutcome::Activated {
                remaining_secs: cfg.initial_duration_secs,
            };
        }
        CoinOutcome::Progress {
            count: self.progress,
        }
    }

    /// Seconds left while active, never negative.
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.active.then(|| (self.expires_at - now).max(0.0))
    }

    pub fn boost(&self, cfg: &PowerUpConfig) -> Boost {
        if self.active {
            Boost {
                speed: cfg.speed_multiplier,
                jump: cfg.jump_multiplier,
            }
        } else {
            Boost::NONE
        }
    }

    /// HUD line: remaining boost time, or progress toward the next one.
    pub fn hud_text(&self, now: f64, cfg: &PowerUpConfig) -> Option<String> {
        match self.remaining(now) {
            Some(secs) => Some(format!("Boost: {secs:.1}s")),
            None if self.progress > 0 => {
                Some(format!("Boost: {}/{}", self.progress, cfg.coins_needed))
            },
            None => None,
        }
    }
}
