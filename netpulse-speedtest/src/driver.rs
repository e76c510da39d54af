use std::time::Duration;

use netpulse_core::{RunId, SpeedTestResult};
use rand::Rng;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{Phase, SpeedTest, SpeedTestError, Tick};

const EVENT_BUFFER: usize = 16;

/// tokio intervals panic on a zero period.
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedTestEvent {
    Progress {
        run: RunId,
        phase: Phase,
        progress: u8,
    },
    Completed {
        run: RunId,
        result: SpeedTestResult,
    },
}

impl From<Tick> for SpeedTestEvent {
    fn from(tick: Tick) -> Self {
        match tick {
            Tick::Progress {
                run,
                phase,
                progress,
            } => SpeedTestEvent::Progress {
                run,
                phase,
                progress,
            },
            Tick::Completed { run, result } => SpeedTestEvent::Completed { run, result },
        }
    }
}

/// A run handed back to the caller of [`SpeedTestMeter::start`].
#[derive(Debug)]
pub struct SpeedTestRun {
    pub id: RunId,
    pub events: mpsc::Receiver<SpeedTestEvent>,
}

struct ActiveRun {
    id: RunId,
    cancel: CancellationToken,
}

/// Drives a [`SpeedTest`] on a fixed tick interval.
///
/// Only one run is driven at a time. A run that is cancelled never emits its
/// completion, and [`SpeedTestMeter::finish`] tells the caller whether a
/// completion still belongs to the run it is waiting for.
pub struct SpeedTestMeter {
    /// Interval between progress ticks.
    tick_interval: Duration,
    /// Run currently being driven.
    active: Option<ActiveRun>,
}

impl SpeedTestMeter {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval: tick_interval.max(MIN_TICK_INTERVAL),
            active: None,
        }
    }

    pub fn active_run(&self) -> Option<RunId> {
        self.active.as_ref().map(|active| active.id)
    }

    pub fn start(&mut self, cancel: &CancellationToken) -> Result<SpeedTestRun, SpeedTestError> {
        self.start_with(SpeedTest::new(), cancel)
    }

    pub fn start_with<R>(
        &mut self,
        mut test: SpeedTest<R>,
        cancel: &CancellationToken,
    ) -> Result<SpeedTestRun, SpeedTestError>
    where
        R: Rng + Send + 'static,
    {
        if let Some(active) = &self.active {
            return Err(SpeedTestError::AlreadyRunning(active.id));
        }

        let id = test.start()?;
        let token = cancel.child_token();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        info!(
            run_id = ?id,
            tick_interval_ms = self.tick_interval.as_millis() as u64,
            "Starting speed test meter"
        );

        tokio::spawn(drive(test, self.tick_interval, token.clone(), tx));

        self.active = Some(ActiveRun { id, cancel: token });
        Ok(SpeedTestRun { id, events: rx })
    }

    /// Cancels the active run, if any.
    pub fn cancel(&mut self) -> Option<RunId> {
        let active = self.active.take()?;
        active.cancel.cancel();
        info!(run_id = ?active.id, "speed test cancelled");
        Some(active.id)
    }

    /// Marks `run` as finished. Returns `false` when `run` is not the active
    /// run, in which case its result must not be applied.
    pub fn finish(&mut self, run: RunId) -> bool {
        match &self.active {
            Some(active) if active.id == run => {
                self.active = None;
                true
            }
            _ => {
                warn!(run_id = ?run, "ignoring completion of a stale speed test");
                false
            }
        }
    }

    /// Releases `run` when its event channel closed before a completion
    /// arrived. Returns `true` if `run` was still the active run.
    pub fn closed(&mut self, run: RunId) -> bool {
        match &self.active {
            Some(active) if active.id == run => {
                warn!(run_id = ?run, "speed test ended without a result");
                self.active = None;
                true
            }
            _ => false,
        }
    }
}

async fn drive<R: Rng>(
    mut test: SpeedTest<R>,
    tick_interval: Duration,
    cancel: CancellationToken,
    tx: mpsc::Sender<SpeedTestEvent>,
) {
    let mut interval = tokio::time::interval(tick_interval);
    // The first tick of a tokio interval fires immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Speed test driver shutting down");
                return;
            }
            _ = interval.tick() => {
                let tick = match test.tick() {
                    Ok(tick) => tick,
                    Err(e) => {
                        warn!(error = ?e, "speed test driver ticked an idle machine");
                        return;
                    }
                };

                let done = matches!(tick, Tick::Completed { .. });
                if tx.send(tick.into()).await.is_err() {
                    info!("Channel closed, speed test driver shutting down");
                    return;
                }
                if done {
                    return;
                }
            }
        }
    }
}
