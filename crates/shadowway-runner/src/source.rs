use shadowway_core::events::GamePhase;
use shadowway_core::input::InputFrame;

/// Produces the input for each loop iteration.
pub trait InputSource: Send {
    /// Input for loop iteration `tick`, given the phase the game is in.
    fn next_frame(&mut self, tick: u64, phase: GamePhase) -> InputFrame;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}
