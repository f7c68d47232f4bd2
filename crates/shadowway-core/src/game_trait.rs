use serde::{Deserialize, Serialize};
use tracing::error;

use crate::events::{GameEvent, GamePhase};
use crate::input::InputFrame;

/// Core trait the loop driver talks to.
///
/// The host owns timing, input collection, and output sinks; the game only
/// advances its own simulation and reports what happened.
pub trait ShadowGame: Send {
    /// Name and shape of the game, for logs and window titles.
    fn metadata(&self) -> GameMetadata;

    /// Advance one tick. `dt` is the seconds elapsed since the previous tick.
    fn update(&mut self, dt: f32, input: &InputFrame) -> Vec<GameEvent>;

    /// Current top-level screen.
    fn phase(&self) -> GamePhase;

    /// Renderable snapshot (HUD plus entity list) encoded as MessagePack.
    fn serialize_state(&self) -> Vec<u8>;

    /// True once the player asked to quit.
    fn wants_quit(&self) -> bool;

    /// Target simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub level_count: usize,
}

/// MessagePack-encode a snapshot. Encoding failures are logged and yield an
/// empty buffer so a bad frame never stops the loop.
pub fn encode_snapshot<T: Serialize>(snapshot: &T) -> Vec<u8> {
    match rmp_serde::to_vec(snapshot) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "Failed to encode game snapshot");
            Vec::new()
        },
    }
}
