use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use shadowway_core::events::GamePhase;
use shadowway_core::game_trait::ShadowGame;
use shadowway_core::input::{InputEvent, InputFrame};

use crate::config::{RunnerConfig, StepMode};
use crate::error::RunnerError;
use crate::sinks::FrameSink;
use crate::source::InputSource;

/// Most simulation steps one loop iteration may run in fixed mode. Any
/// backlog beyond that is dropped.
const MAX_CATCH_UP_STEPS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopOptions {
    pub fps: f32,
    pub step_mode: StepMode,
    /// 0 runs until the game quits or the shutdown future resolves.
    pub max_ticks: u64,
}

impl From<&RunnerConfig> for LoopOptions {
    fn from(config: &RunnerConfig) -> Self {
        Self {
            fps: config.fps,
            step_mode: config.step_mode,
            max_ticks: config.max_ticks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The game asked to quit.
    QuitRequested,
    TickLimit,
    /// The shutdown future resolved (Ctrl-C).
    Interrupted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Loop iterations.
    pub ticks: u64,
    /// Simulation updates. Equal to `ticks` in variable mode.
    pub steps: u64,
    /// Sum of the dt values handed to the game.
    pub sim_secs: f64,
    pub exit: ExitReason,
    pub phase: GamePhase,
}

/// Drive `game` at `opts.fps` until it quits, the tick limit is hit, or
/// `shutdown` resolves.
///
/// Each iteration reads one input frame and measures the real time since the
/// previous iteration. Variable mode hands that time to a single update.
/// Fixed mode banks it and runs whole steps of `1 / fps`; the frame's events
/// go to the first step and later steps only see the held keys.
///
/// Fails before the first tick when `opts.fps` does not give a usable frame
/// period.
pub async fn run_loop(
    game: &mut dyn ShadowGame,
    input: &mut dyn InputSource,
    sinks: &mut [Box<dyn FrameSink>],
    opts: &LoopOptions,
    shutdown: impl Future<Output = ()>,
) -> Result<RunSummary, RunnerError> {
    let fixed_dt = 1.0 / opts.fps;
    let period = Duration::try_from_secs_f32(fixed_dt)
        .ok()
        .filter(|period| !period.is_zero())
        .ok_or_else(|| {
            RunnerError::Config(format!("fps must be a positive frame rate, got {}", opts.fps))
        })?;
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    tracing::info!(
        fps = opts.fps,
        mode = ?opts.step_mode,
        input = input.name(),
        game = %game.metadata().name,
        "Game loop starting"
    );

    let mut ticks: u64 = 0;
    let mut steps: u64 = 0;
    let mut sim_secs = 0.0f64;
    let mut accumulator = 0.0f32;
    // Events from iterations that ran no fixed step.
    let mut carried: Vec<InputEvent> = Vec::new();
    let mut last = Instant::now();

    let exit = loop {
        tokio::select! {
            _ = &mut shutdown => break ExitReason::Interrupted,
            _ = interval.tick() => {},
        }
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;

        let frame = input.next_frame(ticks, game.phase());
        ticks += 1;

        match opts.step_mode {
            StepMode::Variable => {
                step_game(game, sinks, dt, &frame, &mut steps);
                sim_secs += f64::from(dt);
            },
            StepMode::Fixed => {
                accumulator += dt;
                let held = frame.held;
                let mut pending = Some(InputFrame {
                    held,
                    events: std::mem::take(&mut carried)
                        .into_iter()
                        .chain(frame.events)
                        .collect(),
                });
                let mut ran = 0;
                while accumulator >= fixed_dt && ran < MAX_CATCH_UP_STEPS {
                    let step_frame = pending
                        .take()
                        .unwrap_or_else(|| InputFrame::holding(held));
                    step_game(game, sinks, fixed_dt, &step_frame, &mut steps);
                    sim_secs += f64::from(fixed_dt);
                    accumulator -= fixed_dt;
                    ran += 1;
                    if game.wants_quit() {
                        break;
                    }
                }
                if ran == MAX_CATCH_UP_STEPS && accumulator >= fixed_dt {
                    tracing::debug!(backlog_secs = accumulator, "Dropping simulation backlog");
                    accumulator = 0.0;
                }
                if let Some(unused) = pending {
                    carried = unused.events;
                }
            },
        }

        if game.wants_quit() {
            break ExitReason::QuitRequested;
        }
        if opts.max_ticks > 0 && ticks >= opts.max_ticks {
            break ExitReason::TickLimit;
        }
    };

    let summary = RunSummary {
        ticks,
        steps,
        sim_secs,
        exit,
        phase: game.phase(),
    };
    tracing::info!(
        ticks,
        steps,
        sim_secs,
        exit = ?summary.exit,
        phase = %summary.phase,
        "Game loop finished"
    );
    Ok(summary)
}

fn step_game(
    game: &mut dyn ShadowGame,
    sinks: &mut [Box<dyn FrameSink>],
    dt: f32,
    frame: &InputFrame,
    steps: &mut u64,
) {
    let events = game.update(dt, frame);
    *steps += 1;
    let state = game.serialize_state();
    for sink in sinks.iter_mut() {
        sink.on_step(*steps, &events, &state);
    }
}
