pub mod collision;
pub mod config;
pub mod levels;
pub mod physics;
pub mod powerups;
pub mod scoring;
pub mod world;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use shadowway_core::events::{GameEvent, GamePhase, SoundCue};
use shadowway_core::game_trait::{GameMetadata, ShadowGame, encode_snapshot};
use shadowway_core::input::{HeldKeys, InputEvent, InputFrame};
use shadowway_core::storage::BestTimeStore;
use shadowway_core::time::{SessionClock, format_time};

use config::PlatformerConfig;
use levels::LevelTable;
use physics::{Player, Pose};
use powerups::{CoinOutcome, PowerUp};
use scoring::{RunTimer, beats_record};
use world::{EntityKind, Renderable, World};

/// Session fields a HUD or end screen shows, pre-formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    /// 1-based.
    pub level: usize,
    pub level_count: usize,
    pub score: u32,
    /// Banked levels plus the current attempt.
    pub run_time: String,
    pub level_time: String,
    pub best_time: String,
    pub final_time: String,
    /// The finished run matched or beat the best time.
    pub new_best: bool,
    pub powerup_active: bool,
    pub powerup_remaining_secs: Option<f64>,
    pub powerup_progress: u32,
    /// "Boost: 1.8s" / "Boost: 2/3", when there is anything to show.
    pub boost_text: Option<String>,
    pub has_next_level: bool,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub hud: HudSnapshot,
    pub entities: Vec<Renderable>,
    pub facing_right: bool,
}

/// The Way of the Shadow: ten levels against the clock.
pub struct WayOfShadow {
    config: PlatformerConfig,
    levels: LevelTable,
    store: Box<dyn BestTimeStore>,
    phase: GamePhase,
    level_index: usize,
    score: u32,
    timer: RunTimer,
    best_time: Option<f64>,
    new_best: bool,
    powerup: PowerUp,
    clock: SessionClock,
    world: World,
    player: Player,
    quit: bool,
}

impl WayOfShadow {
    pub fn new(config: PlatformerConfig, levels: LevelTable, store: Box<dyn BestTimeStore>) -> Self {
        let player = Player::new(&config.physics);
        let mut game = Self {
            config,
            levels,
            store,
            phase: GamePhase::Menu,
            level_index: 0,
            score: 0,
            timer: RunTimer::default(),
            best_time: None,
            new_best: false,
            powerup: PowerUp::default(),
            clock: SessionClock::new(),
            world: World::default(),
            player,
            quit: false,
        };
        game.best_time = game.store.load_best_time();
        info!(best = %format_time(game.best_time), levels = game.levels.len(), "Game ready");
        game
    }

    /// Default tuning and the builtin levels.
    pub fn with_store(store: Box<dyn BestTimeStore>) -> Self {
        Self::new(PlatformerConfig::default(), LevelTable::builtin(), store)
    }

    pub fn config(&self) -> &PlatformerConfig {
        &self.config
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn timer(&self) -> &RunTimer {
        &self.timer
    }

    pub fn best_time(&self) -> Option<f64> {
        self.best_time
    }

    pub fn powerup(&self) -> &PowerUp {
        &self.powerup
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn session_time(&self) -> f64 {
        self.clock.now()
    }

    /// Start a fresh run directly on `index`, bypassing the menu. An index
    /// outside the level table leaves the game on the menu.
    pub fn start_at_level(&mut self, index: usize) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.reset_session();
        self.level_index = index;
        self.timer.start_level();
        if self.load_level(index, &mut events) {
            self.set_phase(GamePhase::Playing, &mut events);
        } else {
            self.level_index = 0;
            self.timer = RunTimer::default();
        }
        events
    }

    pub fn hud(&self) -> HudSnapshot {
        let now = self.clock.now();
        HudSnapshot {
            phase: self.phase,
            level: self.level_index + 1,
            level_count: self.levels.len(),
            score: self.score,
            run_time: format_time(Some(self.timer.run_time())),
            level_time: format_time(Some(self.timer.level_elapsed)),
            best_time: format_time(self.best_time),
            final_time: format_time(self.timer.final_time),
            new_best: self.new_best,
            powerup_active: self.powerup.active,
            powerup_remaining_secs: self.powerup.remaining(now),
            powerup_progress: self.powerup.progress,
            boost_text: self.powerup.hud_text(now, &self.config.powerup),
            has_next_level: !self.levels.is_last(self.level_index),
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let in_level = matches!(
            self.phase,
            GamePhase::Playing | GamePhase::LevelComplete | GamePhase::GameOver
        );
        let player = in_level.then(|| Renderable {
            kind: match self.player.pose {
                Pose::Idle => EntityKind::PlayerIdle,
                Pose::Run => EntityKind::PlayerRun,
            },
            rect: self.player.hitbox,
            frame: self.player.anim_frame,
        });
        GameSnapshot {
            hud: self.hud(),
            entities: self.world.renderables(player),
            facing_right: self.player.facing_right,
        }
    }

    fn set_phase(&mut self, to: GamePhase, events: &mut Vec<GameEvent>) {
        let from = self.phase;
        if from == to {
            return;
        }
        info!(%from, %to, level = self.level_index + 1, "Phase change");
        self.phase = to;
        events.push(GameEvent::PhaseChanged { from, to });
    }

    /// Wipe everything except the best time and the session clock.
    fn reset_session(&mut self) {
        self.level_index = 0;
        self.score = 0;
        self.world.clear();
        self.timer = RunTimer::default();
        self.powerup.reset();
        self.new_best = false;
    }

    fn return_to_menu(&mut self, events: &mut Vec<GameEvent>) {
        self.best_time = self.store.load_best_time();
        self.reset_session();
        self.set_phase(GamePhase::Menu, events);
    }

    /// Rebuild the level's entities and respawn the player. Timers are left
    /// to the caller.
    fn load_level(&mut self, index: usize, events: &mut Vec<GameEvent>) -> bool {
        self.world.clear();
        let level = match self.levels.get(index) {
            Ok(level) => level,
            Err(e) => {
                warn!(error = %e, "Cannot load level");
                self.set_phase(GamePhase::Menu, events);
                return false;
            },
        };
        self.world = World::from_level(level, &self.config.world, self.clock.now());
        let (x, y) = level.player_start;
        self.player
            .reset(x, y, &self.world.platforms, &self.config.physics);
        self.score = 0;
        info!(
            level = index + 1,
            banked = self.timer.total,
            powerup_progress = self.powerup.progress,
            powerup_active = self.powerup.active,
            "Level loaded"
        );
        events.push(GameEvent::LevelLoaded { level: index });
        true
    }

    /// Reload the current level and resume play with a fresh level timer.
    fn restart_level(&mut self, reset_powerup: bool, events: &mut Vec<GameEvent>) {
        if reset_powerup {
            self.powerup.reset();
        }
        self.timer.start_level();
        if self.load_level(self.level_index, events) {
            self.set_phase(GamePhase::Playing, events);
        }
    }

    fn handle_input(&mut self, input: InputEvent, events: &mut Vec<GameEvent>) {
        if input == InputEvent::Quit {
            if !self.quit {
                info!(phase = %self.phase, "Quit requested");
                self.quit = true;
                events.push(GameEvent::QuitRequested);
            }
            return;
        }

        match (self.phase, input) {
            (GamePhase::Menu, InputEvent::Play) => {
                events.extend(self.start_at_level(0));
            },
            (GamePhase::Menu, InputEvent::Controls) => {
                self.set_phase(GamePhase::Controls, events);
            },
            (GamePhase::Controls, InputEvent::Back) => {
                self.set_phase(GamePhase::Menu, events);
            },
            (GamePhase::Playing, InputEvent::Jump) => {
                let boost = self.powerup.boost(&self.config.powerup);
                if let Some(kind) = self.player.jump(boost, &self.config.physics) {
                    debug!(?kind, jumps_left = self.player.jumps_left, "Jump");
                    events.push(GameEvent::PlaySound {
                        cue: SoundCue::Jump,
                    });
                }
            },
            (GamePhase::Playing, InputEvent::Restart) => self.restart_level(true, events),
            (GamePhase::Playing, InputEvent::Escape) => self.return_to_menu(events),
            (GamePhase::LevelComplete, InputEvent::NextLevel)
                if !self.levels.is_last(self.level_index) =>
            {
                self.timer.advance_level();
                self.level_index += 1;
                info!(
                    level = self.level_index + 1,
                    total = self.timer.total,
                    "Advancing to next level"
                );
                if self.load_level(self.level_index, events) {
                    self.set_phase(GamePhase::Playing, events);
                }
            },
            (GamePhase::LevelComplete, InputEvent::Restart) => self.restart_level(false, events),
            (GamePhase::GameOver, InputEvent::RestartLevel) => self.restart_level(true, events),
            (GamePhase::GameOver, InputEvent::Restart) => self.restart_level(false, events),
            (
                GamePhase::LevelComplete | GamePhase::GameOver | GamePhase::GameWon,
                InputEvent::MainMenu,
            ) => self.return_to_menu(events),
            _ => {},
        }
    }

    fn play_tick(&mut self, dt: f32, held: HeldKeys, events: &mut Vec<GameEvent>) {
        let now = self.clock.now();
        let boost = self.powerup.boost(&self.config.powerup);
        self.player.step(
            dt,
            held,
            &self.world.platforms,
            boost,
            &self.config.physics,
            &self.config.player_anim,
        );
        self.world.animate(now, &self.config.collectible_anim);

        let collected = self.world.collect(&self.player.hitbox);
        if collected > 0 {
            self.score += collected;
            events.push(GameEvent::PlaySound {
                cue: SoundCue::Collect,
            });
            events.push(GameEvent::CoinsCollected {
                count: collected,
                score: self.score,
            });
            for _ in 0..collected {
                match self.powerup.on_coin(now, &self.config.powerup) {
                    CoinOutcome::Progress { count } => {
                        debug!(count, needed = self.config.powerup.coins_needed, "Power-up progress");
                    },
                    CoinOutcome::Activated { remaining_secs } => {
                        info!(remaining_secs, "Power-up activated");
                        events.push(GameEvent::PowerUpActivated { remaining_secs });
                    },
                    CoinOutcome::Extended { remaining_secs } => {
                        debug!(remaining_secs, "Power-up extended");
                        events.push(GameEvent::PowerUpExtended { remaining_secs });
                    },
                }
            }
        }

        if self.world.reached_goal(&self.player.hitbox) {
            self.timer.pause();
            info!(
                level = self.level_index + 1,
                elapsed = self.timer.level_elapsed,
                "Goal reached"
            );
            if self.levels.is_last(self.level_index) {
                self.finish_run(events);
            } else {
                self.set_phase(GamePhase::LevelComplete, events);
            }
            return;
        }

        if self.player.hitbox.top() > self.config.world.fall_bound() {
            self.timer.pause();
            info!(level = self.level_index + 1, "Player fell out of the world");
            self.set_phase(GamePhase::GameOver, events);
        }
    }

    fn finish_run(&mut self, events: &mut Vec<GameEvent>) {
        let final_time = self.timer.finish_run();
        // A tie still earns the end-screen banner but is not saved.
        self.new_best = self.best_time.is_none_or(|best| final_time <= best);
        self.set_phase(GamePhase::GameWon, events);
        info!(final_time = %format_time(Some(final_time)), "Run complete");

        if !beats_record(final_time, self.best_time) {
            info!(best = %format_time(self.best_time), "Best time stands");
            return;
        }
        self.best_time = Some(final_time);
        events.push(GameEvent::NewBestTime { secs: final_time });
        if let Err(e) = self.store.save_best_time(final_time) {
            warn!(error = %e, "New best time was not persisted");
        }
    }
}

impl ShadowGame for WayOfShadow {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "The Way of the Shadow".to_string(),
            description: "Run, wall-jump, and collect scrolls across ten levels against the clock."
                .to_string(),
            level_count: self.levels.len(),
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.tick_rate_hz
    }

    fn update(&mut self, dt: f32, input: &InputFrame) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for &event in &input.events {
            self.handle_input(event, &mut events);
        }

        self.clock.advance(dt);
        if self.powerup.expire_if_due(self.clock.now()) {
            info!("Power-up expired");
            events.push(GameEvent::PowerUpExpired);
        }

        self.timer.tick(dt);

        if self.phase == GamePhase::Playing {
            self.play_tick(dt, input.held, &mut events);
        }
        events
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn serialize_state(&self) -> Vec<u8> {
        encode_snapshot(&self.snapshot())
    }

    fn wants_quit(&self) -> bool {
        self.quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use shadowway_core::geometry::Rect;
    use shadowway_core::test_helpers::{self, MemoryStore};

    const DT: f32 = 1.0 / 60.0;

    fn game_with(store: &MemoryStore) -> WayOfShadow {
        WayOfShadow::with_store(Box::new(store.clone()))
    }

    fn new_game() -> (WayOfShadow, MemoryStore) {
        let store = MemoryStore::new();
        (game_with(&store), store)
    }

    fn press(game: &mut WayOfShadow, event: InputEvent) -> Vec<GameEvent> {
        game.update(DT, &InputFrame::pressed(event))
    }

    fn idle(game: &mut WayOfShadow, dt: f32) -> Vec<GameEvent> {
        game.update(dt, &InputFrame::idle())
    }

    fn place_player(game: &mut WayOfShadow, x: i32, y: i32) {
        game.player.pos = Vec2::new(x as f32, y as f32);
        game.player.hitbox.x = x;
        game.player.hitbox.y = y;
        game.player.vel = Vec2::ZERO;
    }

    fn place_in_goal(game: &mut WayOfShadow) {
        let goal = game.world.goal.unwrap();
        place_player(game, goal.x + 10, goal.y + 10);
    }

    fn place_on_next_coin(game: &mut WayOfShadow) {
        let coin = game.world.collectibles[0].rect;
        place_player(game, coin.x, coin.y - 5);
    }

    fn phase_changes(events: &[GameEvent]) -> Vec<GamePhase> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::PhaseChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn contract_starts_in_menu() {
        let (game, _) = new_game();
        test_helpers::contract_starts_in_menu(&game);
        test_helpers::contract_snapshot_non_empty(&game);
    }

    #[test]
    fn contract_play_and_update() {
        let (mut game, _) = new_game();
        test_helpers::contract_menu_is_stable(&mut game, 30);
        test_helpers::contract_play_starts_level(&mut game);
        test_helpers::contract_update_advances_time(&mut game);
        test_helpers::contract_snapshot_non_empty(&game);
    }

    #[test]
    fn contract_menu_quit() {
        let (mut game, _) = new_game();
        test_helpers::contract_menu_quit_requests_exit(&mut game);
    }

    #[test]
    fn tick_rate_comes_from_config() {
        let (game, _) = new_game();
        assert_eq!(game.tick_rate(), 60.0);
        assert_eq!(game.metadata().level_count, 10);
    }

    #[test]
    fn controls_screen_round_trip() {
        let (mut game, _) = new_game();
        // Only Back leaves the controls screen.
        let frames = [InputEvent::Controls, InputEvent::Play, InputEvent::Back]
            .map(InputFrame::pressed);
        let events = test_helpers::run_game_frames(&mut game, &frames, DT);
        assert_eq!(
            phase_changes(&events),
            vec![GamePhase::Controls, GamePhase::Menu]
        );
        assert_eq!(game.phase(), GamePhase::Menu);
    }

    #[test]
    fn play_loads_first_level_and_starts_timer() {
        let (mut game, _) = new_game();
        let events = press(&mut game, InputEvent::Play);
        assert!(events.contains(&GameEvent::LevelLoaded { level: 0 }));
        assert_eq!(phase_changes(&events), vec![GamePhase::Playing]);
        assert_eq!(game.level_index(), 0);
        assert!(game.timer().active);
        assert_eq!(game.world().collectibles.len(), 6);
        assert_eq!(game.player().hitbox.bottom(), 660);
        assert!((game.timer().level_elapsed - f64::from(DT)).abs() < 1e-9);
    }

    #[test]
    fn timer_runs_only_while_playing() {
        let (mut game, _) = new_game();
        idle(&mut game, 1.0);
        assert_eq!(game.timer().level_elapsed, 0.0);
        press(&mut game, InputEvent::Play);
        for _ in 0..60 {
            idle(&mut game, DT);
        }
        assert!((game.timer().level_elapsed - 61.0 * f64::from(DT)).abs() < 1e-6);
    }

    #[test]
    fn jump_sound_only_when_a_jump_fires() {
        let (mut game, _) = new_game();
        press(&mut game, InputEvent::Play);
        idle(&mut game, DT);
        let jump = GameEvent::PlaySound {
            cue: SoundCue::Jump,
        };
        assert!(press(&mut game, InputEvent::Jump).contains(&jump));
        assert!(press(&mut game, InputEvent::Jump).contains(&jump));
        assert!(!press(&mut game, InputEvent::Jump).contains(&jump));
    }

    #[test]
    fn collecting_counts_each_coin_once() {
        let (mut game, _) = new_game();
        press(&mut game, InputEvent::Play);
        place_on_next_coin(&mut game);
        let events = idle(&mut game, DT);
        assert!(events.contains(&GameEvent::PlaySound {
            cue: SoundCue::Collect
        }));
        assert!(events.contains(&GameEvent::CoinsCollected { count: 1, score: 1 }));
        assert_eq!(game.score(), 1);
        assert_eq!(game.powerup().progress, 1);
        // Standing on the same spot collects nothing more.
        let events = idle(&mut game, DT);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::CoinsCollected { .. })));
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn third_coin_activates_and_fourth_extends() {
        let (mut game, _) = new_game();
        press(&mut game, InputEvent::Play);
        let mut all = Vec::new();
        for _ in 0..3 {
            place_on_next_coin(&mut game);
            all.extend(idle(&mut game, DT));
        }
        assert!(all.contains(&GameEvent::PowerUpActivated {
            remaining_secs: 2.5
        }));
        assert!(game.powerup().active);
        assert_eq!(game.powerup().progress, 0);
        let expires = game.powerup().expires_at;

        place_on_next_coin(&mut game);
        let events = idle(&mut game, DT);
        assert!(events.iter().any(|e| matches!(e, GameEvent::PowerUpExtended { .. })));
        assert!((game.powerup().expires_at - (expires + 1.0)).abs() < 1e-9);
        assert_eq!(game.powerup().progress, 0);
        assert_eq!(game.hud().powerup_progress, 0);
        assert!(game.hud().boost_text.unwrap().ends_with('s'));
    }

    #[test]
    fn powerup_expires_outside_gameplay() {
        let (mut game, _) = new_game();
        press(&mut game, InputEvent::Play);
        for _ in 0..3 {
            place_on_next_coin(&mut game);
            idle(&mut game, DT);
        }
        assert!(game.powerup().active);
        place_in_goal(&mut game);
        idle(&mut game, DT);
        assert_eq!(game.phase(), GamePhase::LevelComplete);
        let events = idle(&mut game, 5.0);
        assert!(events.contains(&GameEvent::PowerUpExpired));
        assert!(!game.powerup().active);
    }

    #[test]
    fn goal_on_first_level_completes_it() {
        let (mut game, _) = new_game();
        press(&mut game, InputEvent::Play);
        place_in_goal(&mut game);
        let events = idle(&mut game, 2.0);
        assert_eq!(phase_changes(&events), vec![GamePhase::LevelComplete]);
        assert!(!game.timer().active);
        let elapsed = game.timer().level_elapsed;
        idle(&mut game, 5.0);
        assert_eq!(game.timer().level_elapsed, elapsed, "timer paused");
        assert_eq!(game.timer().final_time, None);
        assert!(game.hud().has_next_level);
    }

    #[test]
    fn next_level_banks_time() {
        let (mut game, _) = new_game();
        press(&mut game, InputEvent::Play);
        place_in_goal(&mut game);
        idle(&mut game, 2.0);
        let level_time = game.timer().level_elapsed;
        let events = game.update(0.0, &InputFrame::pressed(InputEvent::NextLevel));
        assert!(events.contains(&GameEvent::LevelLoaded { level: 1 }));
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.level_index(), 1);
        assert_eq!(game.timer().total, level_time);
        assert_eq!(game.timer().level_elapsed, 0.0);
        assert!(game.timer().active);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn level_complete_restart_replays_same_level() {
        let (mut game, _) = new_game();
        press(&mut game, InputEvent::Play);
        place_on_next_coin(&mut game);
        idle(&mut game, DT);
        place_in_goal(&mut game);
        idle(&mut game, 2.0);
        let progress = game.powerup().progress;
        assert!(progress > 0);
        let events = game.update(0.0, &InputFrame::pressed(InputEvent::Restart));
        assert!(events.contains(&GameEvent::LevelLoaded { level: 0 }));
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.timer().level_elapsed, 0.0);
        assert_eq!(game.timer().total, 0.0);
        assert_eq!(game.score(), 0);
        assert_eq!(game.powerup().progress, progress, "progress survives this restart");
    }

    #[test]
    fn main_menu_from_level_complete_resets_session() {
        let store = MemoryStore::with_best(80.0);
        let mut game = game_with(&store);
        press(&mut game, InputEvent::Play);
        place_on_next_coin(&mut game);
        idle(&mut game, DT);
        place_in_goal(&mut game);
        idle(&mut game, 2.0);
        assert_eq!(game.phase(), GamePhase::LevelComplete);

        let events = press(&mut game, InputEvent::MainMenu);
        assert_eq!(phase_changes(&events), vec![GamePhase::Menu]);
        assert_eq!(store.load_count(), 2);
        assert_eq!(game.level_index(), 0);
        assert_eq!(game.score(), 0);
        assert_eq!(game.powerup().progress, 0);
        assert_eq!(game.timer().level_elapsed, 0.0);
        assert!(game.world().platforms.is_empty());
    }

    #[test]
    fn full_run_sets_final_time_once() {
        let (mut game, store) = new_game();
        game.update(0.0, &InputFrame::pressed(InputEvent::Play));

        let mut total_increases = 0;
        let mut finals = 0;
        let mut last_total = game.timer().total;
        for level in 0..10 {
            assert_eq!(game.level_index(), level);
            place_in_goal(&mut game);
            let events = idle(&mut game, (level + 1) as f32);
            finals += events
                .iter()
                .filter(|e| matches!(e, GameEvent::PhaseChanged { to: GamePhase::GameWon, .. }))
                .count();
            if level < 9 {
                assert_eq!(game.phase(), GamePhase::LevelComplete);
                assert_eq!(game.timer().final_time, None);
                game.update(0.0, &InputFrame::pressed(InputEvent::NextLevel));
            }
            if game.timer().total > last_total {
                total_increases += 1;
                last_total = game.timer().total;
            }
        }

        assert_eq!(game.phase(), GamePhase::GameWon);
        assert_eq!(total_increases, 9);
        assert_eq!(finals, 1);
        assert_eq!(game.timer().final_time, Some(55.0));
        assert_eq!(game.best_time(), Some(55.0));
        assert_eq!(store.saves(), vec![55.0]);
        assert!(game.hud().new_best);
        assert!(!game.hud().has_next_level);

        // NextLevel is meaningless once the run is won.
        press(&mut game, InputEvent::NextLevel);
        assert_eq!(game.phase(), GamePhase::GameWon);
        press(&mut game, InputEvent::MainMenu);
        assert_eq!(game.phase(), GamePhase::Menu);
        assert_eq!(game.timer().final_time, None);
    }

    fn win_last_level_in(store: &MemoryStore, secs: f32) -> WayOfShadow {
        let mut game = game_with(store);
        game.start_at_level(9);
        place_in_goal(&mut game);
        idle(&mut game, secs);
        assert_eq!(game.phase(), GamePhase::GameWon);
        game
    }

    #[test]
    fn faster_run_replaces_record() {
        let store = MemoryStore::with_best(100.0);
        let game = win_last_level_in(&store, 90.0);
        assert_eq!(game.best_time(), Some(90.0));
        assert_eq!(store.saves(), vec![90.0]);
        assert_eq!(store.best(), Some(90.0));
        assert!(game.hud().new_best);
        assert_eq!(game.hud().best_time, "01:30:000");
    }

    #[test]
    fn tied_run_shows_new_best_without_saving() {
        let store = MemoryStore::with_best(90.0);
        let game = win_last_level_in(&store, 90.0);
        assert!(game.hud().new_best);
        assert!(store.saves().is_empty());
        assert_eq!(store.best(), Some(90.0));
        assert_eq!(game.best_time(), Some(90.0));
    }

    #[test]
    fn slower_run_keeps_record() {
        let store = MemoryStore::with_best(100.0);
        let game = win_last_level_in(&store, 110.0);
        assert_eq!(game.best_time(), Some(100.0));
        assert!(store.saves().is_empty());
        assert!(!game.hud().new_best);
        assert_eq!(game.hud().final_time, "01:50:000");
    }

    #[test]
    fn failed_save_keeps_playing() {
        let store = MemoryStore::new().failing_writes();
        let mut game = win_last_level_in(&store, 42.0);
        assert_eq!(game.best_time(), Some(42.0), "kept in memory");
        press(&mut game, InputEvent::MainMenu);
        assert_eq!(game.phase(), GamePhase::Menu);
        assert_eq!(game.best_time(), None, "reloaded from the store");
    }

    #[test]
    fn falling_out_is_game_over() {
        let (mut game, _) = new_game();
        press(&mut game, InputEvent::Play);
        place_player(&mut game, 500, 760);
        let events = idle(&mut game, DT);
        assert_eq!(phase_changes(&events), vec![GamePhase::GameOver]);
        assert!(!game.timer().active);
    }

    #[test]
    fn hitbox_exactly_at_fall_bound_is_still_in_play() {
        let (mut game, _) = new_game();
        press(&mut game, InputEvent::Play);
        // One tick of gravity lands the hitbox exactly on the bound.
        place_player(&mut game, 500, 749);
        idle(&mut game, DT);
        assert_eq!(game.player().hitbox.top(), 750);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    fn game_over_with_progress() -> WayOfShadow {
        let (mut game, _) = new_game();
        press(&mut game, InputEvent::Play);
        place_on_next_coin(&mut game);
        idle(&mut game, DT);
        place_player(&mut game, 500, 800);
        idle(&mut game, DT);
        assert_eq!(game.phase(), GamePhase::GameOver);
        game
    }

    #[test]
    fn restart_button_after_game_over_resets_powerup() {
        let mut game = game_over_with_progress();
        press(&mut game, InputEvent::RestartLevel);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.powerup().progress, 0);
        assert!(game.timer().active);
    }

    #[test]
    fn restart_key_after_game_over_keeps_powerup() {
        let mut game = game_over_with_progress();
        press(&mut game, InputEvent::Restart);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.powerup().progress, 1);
    }

    #[test]
    fn main_menu_from_game_over_resets_session() {
        let mut game = game_over_with_progress();
        let events = press(&mut game, InputEvent::MainMenu);
        assert_eq!(phase_changes(&events), vec![GamePhase::Menu]);
        assert_eq!(game.powerup().progress, 0);
        assert_eq!(game.score(), 0);
        assert!(game.world().goal.is_none());
        assert!(!game.timer().active);
        press(&mut game, InputEvent::Play);
        assert_eq!(game.level_index(), 0);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn restart_key_while_playing_resets_level() {
        let (mut game, _) = new_game();
        press(&mut game, InputEvent::Play);
        place_on_next_coin(&mut game);
        idle(&mut game, 1.0);
        let events = press(&mut game, InputEvent::Restart);
        assert!(events.contains(&GameEvent::LevelLoaded { level: 0 }));
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.score(), 0);
        assert_eq!(game.powerup().progress, 0);
        assert_eq!(game.world().collectibles.len(), 6);
        assert!(game.timer().level_elapsed < 0.1);
    }

    #[test]
    fn escape_returns_to_menu_and_reloads_best() {
        let store = MemoryStore::with_best(80.0);
        let mut game = game_with(&store);
        assert_eq!(store.load_count(), 1);
        press(&mut game, InputEvent::Play);
        idle(&mut game, 1.0);
        let events = press(&mut game, InputEvent::Escape);
        assert_eq!(phase_changes(&events), vec![GamePhase::Menu]);
        assert_eq!(store.load_count(), 2);
        assert_eq!(game.timer().level_elapsed, 0.0);
        assert!(!game.timer().active);
        assert!(game.world().platforms.is_empty());
        assert_eq!(game.hud().best_time, "01:20:000");
    }

    #[test]
    fn unknown_level_stays_on_menu() {
        let (mut game, _) = new_game();
        let events = game.start_at_level(42);
        assert!(events.is_empty());
        assert_eq!(game.phase(), GamePhase::Menu);
        assert_eq!(game.level_index(), 0);
        assert!(game.world().goal.is_none());
        idle(&mut game, 1.0);
        assert_eq!(game.timer().level_elapsed, 0.0);
    }

    #[test]
    fn unknown_level_while_playing_drops_to_menu() {
        let (mut game, _) = new_game();
        press(&mut game, InputEvent::Play);
        let events = game.start_at_level(10);
        assert_eq!(phase_changes(&events), vec![GamePhase::Menu]);
    }

    #[test]
    fn quit_works_from_any_phase_once() {
        let (mut game, _) = new_game();
        press(&mut game, InputEvent::Play);
        let events = press(&mut game, InputEvent::Quit);
        assert!(game.wants_quit());
        assert_eq!(events, vec![GameEvent::QuitRequested]);
        assert!(press(&mut game, InputEvent::Quit).is_empty());
    }

    #[test]
    fn events_in_one_frame_apply_in_order() {
        let (mut game, _) = new_game();
        let frame = InputFrame::pressed(InputEvent::Play).with_event(InputEvent::Escape);
        let events = game.update(DT, &frame);
        assert_eq!(
            phase_changes(&events),
            vec![GamePhase::Playing, GamePhase::Menu]
        );
    }

    #[test]
    fn custom_level_pack_is_playable() {
        let levels = LevelTable::from_toml_str(
            r#"
            [[levels]]
            platforms = [[0, 660, 1000, 40]]
            collectibles = [[300, 630]]
            goal = [900, 590, 50, 70]
            player_start = [40.0, 620.0]
            "#,
        )
        .unwrap();
        let store = MemoryStore::new();
        let mut game =
            WayOfShadow::new(PlatformerConfig::default(), levels, Box::new(store.clone()));
        press(&mut game, InputEvent::Play);
        place_in_goal(&mut game);
        idle(&mut game, 12.5);
        assert_eq!(game.phase(), GamePhase::GameWon);
        assert_eq!(store.saves().len(), 1);
    }

    #[test]
    fn snapshot_decodes_and_lists_player() {
        let (mut game, _) = new_game();
        press(&mut game, InputEvent::Play);
        let bytes = game.serialize_state();
        let snap: GameSnapshot = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(snap.hud.phase, GamePhase::Playing);
        assert_eq!(snap.hud.level, 1);
        assert_eq!(snap.hud.level_count, 10);
        assert_eq!(snap.hud.best_time, "--:--:---");
        let player = snap.entities.last().unwrap();
        assert_eq!(player.kind, EntityKind::PlayerIdle);
        assert_eq!(player.rect, Rect::new(150, 615, 30, 45));
    }

    #[test]
    fn menu_snapshot_has_no_entities() {
        let (game, _) = new_game();
        assert!(game.snapshot().entities.is_empty());
        assert_eq!(game.hud().run_time, "00:00:000");
    }

    #[test]
    fn session_clock_runs_in_every_phase() {
        let (mut game, _) = new_game();
        idle(&mut game, 0.5);
        press(&mut game, InputEvent::Controls);
        idle(&mut game, 0.5);
        assert!((game.session_time() - (1.0 + f64::from(DT))).abs() < 1e-6);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_input() -> impl Strategy<Value = InputEvent> {
            prop_oneof![
                Just(InputEvent::Jump),
                Just(InputEvent::Restart),
                Just(InputEvent::Escape),
                Just(InputEvent::Play),
                Just(InputEvent::Controls),
                Just(InputEvent::Back),
                Just(InputEvent::NextLevel),
                Just(InputEvent::MainMenu),
                Just(InputEvent::RestartLevel),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn random_input_never_breaks_invariants(
                steps in prop::collection::vec(
                    (prop::option::of(any_input()), any::<bool>(), any::<bool>()),
                    1..200,
                ),
            ) {
                let (mut game, _) = new_game();
                let mut last_total = 0.0;
                for (event, left, right) in steps {
                    let mut frame = InputFrame::holding(HeldKeys { left, right });
                    if let Some(event) = event {
                        frame = frame.with_event(event);
                    }
                    game.update(DT, &frame);

                    prop_assert!(game.player().jumps_left <= 2);
                    prop_assert_eq!(game.player().hitbox.x, physics::round_coord(game.player().pos.x));
                    if game.player().on_ground && game.phase() == GamePhase::Playing {
                        prop_assert!(!game.player().wall_sliding);
                    }
                    if game.phase() != GamePhase::Menu {
                        prop_assert!(game.timer().total >= last_total);
                    }
                    last_total = game.timer().total;
                    prop_assert!(game.level_index() < 10);
                }
            }
        }
    }
}
