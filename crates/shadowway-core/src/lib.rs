pub mod events;
pub mod game_trait;
pub mod geometry;
pub mod input;
pub mod storage;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::sync::{Arc, Mutex, PoisonError};

    use crate::events::{GameEvent, GamePhase};
    use crate::game_trait::ShadowGame;
    use crate::input::{InputEvent, InputFrame};
    use crate::storage::{BestTimeStore, StorageError};

    /// Run N game ticks with idle input, returning all accumulated events.
    pub fn run_game_ticks(game: &mut dyn ShadowGame, n: usize, dt: f32) -> Vec<GameEvent> {
        let idle = InputFrame::idle();
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(dt, &idle));
        }
        all_events
    }

    /// Feed one tick per frame, returning all accumulated events.
    pub fn run_game_frames(
        game: &mut dyn ShadowGame,
        frames: &[InputFrame],
        dt: f32,
    ) -> Vec<GameEvent> {
        frames
            .iter()
            .flat_map(|frame| game.update(dt, frame))
            .collect()
    }

    /// Assert that the game's serialized state differs from `before`.
    pub fn assert_game_state_changed(game: &dyn ShadowGame, before: &[u8]) {
        let after = game.serialize_state();
        assert_ne!(
            before,
            &after[..],
            "Game state should have changed after operation"
        );
    }

    #[derive(Debug, Default)]
    struct MemoryRecord {
        best: Option<f64>,
        saves: Vec<f64>,
        loads: usize,
        fail_writes: bool,
    }

    /// In-memory best-time store. Clones share the same record, so a test
    /// can keep a handle after boxing one into a game.
    #[derive(Debug, Clone, Default)]
    pub struct MemoryStore {
        inner: Arc<Mutex<MemoryRecord>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_best(best: f64) -> Self {
            let store = Self::new();
            store.record().best = Some(best);
            store
        }

        /// Make every subsequent save fail with an I/O error.
        pub fn failing_writes(self) -> Self {
            self.record().fail_writes = true;
            self
        }

        pub fn best(&self) -> Option<f64> {
            self.record().best
        }

        pub fn saves(&self) -> Vec<f64> {
            self.record().saves.clone()
        }

        pub fn load_count(&self) -> usize {
            self.record().loads
        }

        fn record(&self) -> std::sync::MutexGuard<'_, MemoryRecord> {
            self.inner.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl BestTimeStore for MemoryStore {
        fn load_best_time(&mut self) -> Option<f64> {
            let mut record = self.record();
            record.loads += 1;
            record.best
        }

        fn save_best_time(&mut self, secs: f64) -> Result<(), StorageError> {
            let mut record = self.record();
            if record.fail_writes {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            record.best = Some(secs);
            record.saves.push(secs);
            Ok(())
        }
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Every ShadowGame implementation must pass these. Game crates call
    // them from their own #[cfg(test)] modules with a fresh instance.

    /// A fresh game starts on the main menu and does not want to quit.
    pub fn contract_starts_in_menu(game: &dyn ShadowGame) {
        assert_eq!(game.phase(), GamePhase::Menu, "games must start in the menu");
        assert!(!game.wants_quit(), "a fresh game must not request exit");
    }

    /// serialize_state() must return non-empty bytes in every phase.
    pub fn contract_snapshot_non_empty(game: &dyn ShadowGame) {
        assert!(
            !game.serialize_state().is_empty(),
            "serialize_state() must return non-empty bytes"
        );
    }

    /// Play from the menu must start a level.
    pub fn contract_play_starts_level(game: &mut dyn ShadowGame) {
        game.update(0.016, &InputFrame::pressed(InputEvent::Play));
        assert_eq!(game.phase(), GamePhase::Playing, "Play must enter Playing");
    }

    /// update(dt>0) while playing must change the snapshot (timer at least).
    pub fn contract_update_advances_time(game: &mut dyn ShadowGame) {
        let before = game.serialize_state();
        game.update(0.25, &InputFrame::idle());
        assert_game_state_changed(game, &before);
    }

    /// Quit from the menu must be reported through wants_quit().
    pub fn contract_menu_quit_requests_exit(game: &mut dyn ShadowGame) {
        let events = game.update(0.016, &InputFrame::pressed(InputEvent::Quit));
        assert!(game.wants_quit(), "Quit from the menu must request exit");
        assert!(
            events.contains(&GameEvent::QuitRequested),
            "Quit must emit QuitRequested"
        );
    }

    /// Idle ticks on the menu must not leave it.
    pub fn contract_menu_is_stable(game: &mut dyn ShadowGame, ticks: usize) {
        run_game_ticks(game, ticks, 0.016);
        assert_eq!(game.phase(), GamePhase::Menu);
    }
}
