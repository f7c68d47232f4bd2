pub mod bot;
pub mod config;
pub mod error;
pub mod game_loop;
pub mod script;
pub mod sinks;
pub mod source;

use std::future::Future;

use shadowway_core::storage::FileStore;
use shadowway_platformer::WayOfShadow;
use shadowway_platformer::config::PlatformerConfig;
use shadowway_platformer::levels::LevelTable;

use bot::Autopilot;
use config::RunnerConfig;
use error::RunnerError;
use game_loop::{LoopOptions, RunSummary, run_loop};
use script::ScriptedInput;
use sinks::{AudioLog, FrameSink, HudLog};
use source::InputSource;

/// Builtin levels, or the pack at `levels_path`.
pub fn load_levels(config: &RunnerConfig) -> Result<LevelTable, RunnerError> {
    let Some(path) = &config.levels_path else {
        return Ok(LevelTable::builtin());
    };
    let content = std::fs::read_to_string(path)?;
    let levels = LevelTable::from_toml_str(&content)?;
    tracing::info!(path = %path.display(), levels = levels.len(), "Loaded level pack");
    Ok(levels)
}

/// The scripted timeline when one is configured, the autopilot otherwise.
pub fn build_input(config: &RunnerConfig) -> Result<Box<dyn InputSource>, RunnerError> {
    if let Some(path) = &config.script_path {
        return Ok(Box::new(ScriptedInput::from_file(path)?));
    }
    let seed = config.bot_seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "Autopilot enabled");
    Ok(Box::new(Autopilot::new(seed)))
}

/// Build the game from `config` and run it until it quits, the tick limit
/// is reached, or `shutdown` resolves.
pub async fn run(
    config: &RunnerConfig,
    shutdown: impl Future<Output = ()>,
) -> Result<RunSummary, RunnerError> {
    config.validate()?;

    let levels = load_levels(config)?;
    let store = FileStore::new(config.highscore_path.clone());
    let mut game = WayOfShadow::new(PlatformerConfig::load(), levels, Box::new(store));
    let mut input = build_input(config)?;
    let mut sinks: Vec<Box<dyn FrameSink>> = vec![
        Box::new(AudioLog::new()),
        Box::new(HudLog::new(config.hud_log_interval_ticks)),
    ];

    let opts = LoopOptions::from(config);
    run_loop(&mut game, input.as_mut(), &mut sinks, &opts, shutdown).await
}
