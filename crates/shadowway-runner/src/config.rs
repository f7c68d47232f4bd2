use std::path::PathBuf;

use serde::Deserialize;

use crate::error::RunnerError;

pub const DEFAULT_CONFIG_FILE: &str = "shadowway-runner.toml";

/// How measured frame time is turned into simulation ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// One update per loop iteration with the measured dt.
    #[default]
    Variable,
    /// Accumulate measured time and run whole steps of `1 / fps`.
    Fixed,
}

impl std::str::FromStr for StepMode {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "variable" => Ok(Self::Variable),
            "fixed" => Ok(Self::Fixed),
            other => Err(RunnerError::Config(format!("unknown step mode {other:?}"))),
        }
    }
}

/// Runner configuration, loaded from `shadowway-runner.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub fps: f32,
    pub step_mode: StepMode,
    /// Where the best time is persisted.
    pub highscore_path: PathBuf,
    /// Scripted input timeline. The autopilot plays when unset.
    pub script_path: Option<PathBuf>,
    /// Custom level pack replacing the builtin levels.
    pub levels_path: Option<PathBuf>,
    /// Autopilot seed. A random seed is drawn when unset.
    pub bot_seed: Option<u64>,
    /// Stop after this many loop iterations. 0 runs until quit.
    pub max_ticks: u64,
    /// Log a HUD line every N ticks. 0 disables it.
    pub hud_log_interval_ticks: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            fps: 60.0,
            step_mode: StepMode::Variable,
            highscore_path: PathBuf::from("highscore.txt"),
            script_path: None,
            levels_path: None,
            bot_seed: None,
            max_ticks: 0,
            hud_log_interval_ticks: 60,
        }
    }
}

impl RunnerConfig {
    /// Load `$SHADOWWAY_RUNNER_CONFIG` or `shadowway-runner.toml` if it
    /// exists, then apply `SHADOWWAY_*` environment overrides.
    pub fn load() -> Self {
        let path = std::env::var("SHADOWWAY_RUNNER_CONFIG")
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => {
                    tracing::info!(path = %path, "Loaded runner configuration");
                    cfg
                },
                Err(e) => {
                    tracing::warn!(path = %path, "Failed to parse runner config: {e}, using defaults");
                    Self::default()
                },
            },
            Err(_) => {
                tracing::info!(path = %path, "No runner config found, using defaults");
                Self::default()
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RunnerError> {
        toml::from_str(content).map_err(|e| RunnerError::Config(e.to_string()))
    }

    /// Apply `SHADOWWAY_*` overrides read through `lookup`. Unparseable
    /// values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(val) = var("SHADOWWAY_FPS") {
            match val.parse::<f32>() {
                Ok(fps) => self.fps = fps,
                Err(_) => tracing::warn!(value = %val, "Ignoring invalid SHADOWWAY_FPS"),
            }
        }
        if let Some(val) = var("SHADOWWAY_STEP_MODE") {
            match val.parse::<StepMode>() {
                Ok(mode) => self.step_mode = mode,
                Err(e) => tracing::warn!("Ignoring SHADOWWAY_STEP_MODE: {e}"),
            }
        }
        if let Some(path) = var("SHADOWWAY_HIGHSCORE_PATH") {
            self.highscore_path = PathBuf::from(path);
        }
        if let Some(path) = var("SHADOWWAY_SCRIPT") {
            self.script_path = Some(PathBuf::from(path));
        }
        if let Some(path) = var("SHADOWWAY_LEVELS") {
            self.levels_path = Some(PathBuf::from(path));
        }
        if let Some(val) = var("SHADOWWAY_BOT_SEED") {
            match val.parse::<u64>() {
                Ok(seed) => self.bot_seed = Some(seed),
                Err(_) => tracing::warn!(value = %val, "Ignoring invalid SHADOWWAY_BOT_SEED"),
            }
        }
        if let Some(val) = var("SHADOWWAY_MAX_TICKS") {
            match val.parse::<u64>() {
                Ok(n) => self.max_ticks = n,
                Err(_) => tracing::warn!(value = %val, "Ignoring invalid SHADOWWAY_MAX_TICKS"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), RunnerError> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(RunnerError::Config(format!(
                "fps must be a positive number, got {}",
                self.fps
            )));
        }
        if self.fps > 1000.0 {
            return Err(RunnerError::Config(format!(
                "fps must be at most 1000, got {}",
                self.fps
            )));
        }
        if self.highscore_path.as_os_str().is_empty() {
            return Err(RunnerError::Config("highscore_path must not be empty".into()));
        }
        if self.hud_log_interval_ticks == 0 {
            tracing::debug!("HUD logging disabled");
        }
        Ok(())
    }
}
