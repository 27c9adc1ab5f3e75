//! Event sources merged into one ordered fold
//!
//! Producers (the tick timer, key input, per-obstacle spawn timers) all send
//! into one unbounded channel. A single task owns the `GameState`, reduces
//! each event in arrival order and publishes the result on a `watch`
//! channel, so consumers only ever see complete snapshots.
//!
//! [`Session::start`] must be called from inside a tokio runtime.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::level::{Level, LevelError};
use crate::sim::{GameEvent, GameState, Reducer};
use crate::tuning::{SpawnPolicy, Tuning, TuningError};

/// Why a session could not be set up
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid level data: {0}")]
    Level(#[from] LevelError),
    #[error(transparent)]
    Tuning(#[from] TuningError),
}

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Flap,
    Pause,
    Restart,
    Other,
}

impl From<Key> for GameEvent {
    fn from(key: Key) -> Self {
        match key {
            Key::Flap => GameEvent::Flap,
            Key::Pause => GameEvent::TogglePause,
            Key::Restart => GameEvent::Restart,
            Key::Other => GameEvent::Idle,
        }
    }
}

/// Read and parse a level file
pub fn load_level(path: impl AsRef<Path>, tuning: &Tuning) -> Result<Level, SessionError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let level = Level::parse(&text, tuning.viewport_width)?;
    log::info!("Loaded {} obstacles from {}", level.len(), path.display());
    Ok(level)
}

/// What travels through the merge channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Queued {
    /// Tick or key input, folded as is
    Event(GameEvent),
    /// Scheduled spawn, tagged with the run that armed its timer
    Spawn { id: u32, run: u32 },
}

/// A fully loaded game session that has not started yet
#[derive(Debug, Clone)]
pub struct Session {
    reducer: Reducer,
}

impl Session {
    pub fn new(level: Level, tuning: Tuning) -> Self {
        Self {
            reducer: Reducer::new(Arc::new(level), tuning),
        }
    }

    /// Load the level before any event source exists; a failure here means
    /// the session never starts.
    pub fn bootstrap(level_path: impl AsRef<Path>, tuning: Tuning) -> Result<Self, SessionError> {
        tuning.validate()?;
        let level = load_level(level_path, &tuning)?;
        Ok(Self::new(level, tuning))
    }

    pub fn reducer(&self) -> &Reducer {
        &self.reducer
    }

    /// Spawn the producers and the fold task
    pub fn start(self) -> SessionHandle {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let initial = self.reducer.initial_state();
        let (snapshot_tx, snapshot_rx) = watch::channel(initial.clone());
        let (stop_tx, stop_rx) = oneshot::channel();

        let period = self.reducer.tuning().tick_duration();
        let ticker = tokio::spawn(run_ticker(period, event_tx.clone()));
        let fold = tokio::spawn(fold_loop(
            self.reducer,
            initial,
            event_rx,
            event_tx.clone(),
            snapshot_tx,
            stop_rx,
        ));

        log::info!("Session started, tick every {period:?}");
        SessionHandle {
            input: InputSender { tx: event_tx },
            snapshots: snapshot_rx,
            stop: Some(stop_tx),
            ticker: Some(ticker),
            fold: Some(fold),
        }
    }
}

/// Cloneable handle for key input producers
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: mpsc::UnboundedSender<Queued>,
}

impl InputSender {
    /// Queue a key press. Returns false once the session is gone.
    pub fn press(&self, key: Key) -> bool {
        self.tx.send(Queued::Event(key.into())).is_ok()
    }
}

/// A running session. Dropping it tears every task down.
#[derive(Debug)]
pub struct SessionHandle {
    input: InputSender,
    snapshots: watch::Receiver<GameState>,
    stop: Option<oneshot::Sender<()>>,
    ticker: Option<JoinHandle<()>>,
    fold: Option<JoinHandle<GameState>>,
}

impl SessionHandle {
    pub fn input(&self) -> InputSender {
        self.input.clone()
    }

    /// Receiver of every reduced snapshot
    pub fn snapshots(&self) -> watch::Receiver<GameState> {
        self.snapshots.clone()
    }

    /// Most recent snapshot
    pub fn latest(&self) -> GameState {
        self.snapshots.borrow().clone()
    }

    /// Stop all producers and return the final state
    pub async fn shutdown(mut self) -> GameState {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let state = match self.fold.take() {
            Some(fold) => fold.await.ok(),
            None => None,
        };
        let state = state.unwrap_or_else(|| self.latest());
        log::info!(
            "Session stopped at t={:.2}s, score {}",
            state.elapsed_time,
            state.score
        );
        state
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        if let Some(fold) = self.fold.take() {
            fold.abort();
        }
    }
}

/// Fixed-rate tick producer. Late ticks are skipped, not bursted.
async fn run_ticker(period: Duration, tx: mpsc::UnboundedSender<Queued>) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        if tx.send(Queued::Event(GameEvent::Tick)).is_err() {
            break;
        }
    }
}

/// One-shot spawn timers for the current run, aborted on drop
struct SpawnTimers {
    handles: Vec<JoinHandle<()>>,
}

impl SpawnTimers {
    fn none() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Arm one timer per obstacle of run `run`, relative to now.
    ///
    /// Spawn times too far out for the timer wheel are never armed.
    fn arm(level: &Level, run: u32, tx: &mpsc::UnboundedSender<Queued>) -> Self {
        let start = Instant::now();
        let handles = level
            .by_spawn_time()
            .filter_map(|obstacle| {
                let id = obstacle.id;
                let Some(at) = spawn_deadline(start, obstacle.spawn_time) else {
                    log::warn!(
                        "obstacle {id}: spawn time {}s cannot be scheduled, skipping",
                        obstacle.spawn_time
                    );
                    return None;
                };
                let tx = tx.clone();
                Some(tokio::spawn(async move {
                    time::sleep_until(at).await;
                    let _ = tx.send(Queued::Spawn { id, run });
                }))
            })
            .collect();
        Self { handles }
    }
}

/// `start + spawn_time`, or `None` if it does not fit in an `Instant`
fn spawn_deadline(start: Instant, spawn_time: f32) -> Option<Instant> {
    let offset = Duration::try_from_secs_f32(spawn_time.max(0.0)).ok()?;
    start.checked_add(offset)
}

impl Drop for SpawnTimers {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

async fn fold_loop(
    reducer: Reducer,
    mut state: GameState,
    mut events: mpsc::UnboundedReceiver<Queued>,
    scheduler: mpsc::UnboundedSender<Queued>,
    snapshots: watch::Sender<GameState>,
    mut stop: oneshot::Receiver<()>,
) -> GameState {
    let scheduled = reducer.tuning().spawn_policy == SpawnPolicy::Scheduled;
    let arm = |reducer: &Reducer, run: u32| {
        if scheduled {
            SpawnTimers::arm(reducer.level(), run, &scheduler)
        } else {
            SpawnTimers::none()
        }
    };
    let mut run = 0;
    let mut timers = arm(&reducer, run);

    loop {
        let queued = tokio::select! {
            biased;
            _ = &mut stop => break,
            queued = events.recv() => match queued {
                Some(queued) => queued,
                None => break,
            },
        };

        let event = match queued {
            Queued::Event(event) => event,
            Queued::Spawn { id, run: armed_in } if armed_in == run => GameEvent::Spawn(id),
            Queued::Spawn { id, run: armed_in } => {
                log::debug!("dropping spawn of obstacle {id} armed by run {armed_in}");
                continue;
            }
        };

        let was_ended = state.ended;
        state = reducer.reduce(state, event);

        if was_ended && !state.ended {
            // Restarted: spawn times count from the new run's start
            run = run.wrapping_add(1);
            timers = arm(&reducer, run);
        } else if !was_ended && state.ended {
            log::info!(
                "Run ended at t={:.2}s: score {}, lives {}",
                state.elapsed_time,
                state.score,
                state.lives
            );
        }

        snapshots.send_replace(state.clone());
    }

    drop(timers);
    state
}
