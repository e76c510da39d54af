use std::ops::Range;

use netpulse_core::{RunId, SpeedTestResult};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use crate::SpeedTestError;

/// Progress added by every tick, in percent.
pub const PROGRESS_STEP: u8 = 2;

const DOWNLOAD_MBPS: Range<u32> = 20..100;
const UPLOAD_MBPS: Range<u32> = 10..50;
const PING_MS: Range<u32> = 10..40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ping,
    Download,
    Upload,
}

impl Phase {
    /// Progress at which this phase is complete.
    pub fn target(&self) -> u8 {
        match self {
            Phase::Ping => 30,
            Phase::Download => 60,
            Phase::Upload => 100,
        }
    }

    fn next(&self) -> Option<Phase> {
        match self {
            Phase::Ping => Some(Phase::Download),
            Phase::Download => Some(Phase::Upload),
            Phase::Upload => None,
        }
    }

    pub fn status_line(&self) -> &'static str {
        match self {
            Phase::Ping => "Testing connection...",
            Phase::Download => "Testing download speed...",
            Phase::Upload => "Testing upload speed...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedTestState {
    Idle,
    Running {
        run: RunId,
        phase: Phase,
        progress: u8,
    },
    Done {
        run: RunId,
        result: SpeedTestResult,
    },
}

/// What a single tick did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
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

type CompletionCallback = Box<dyn FnMut(RunId, &SpeedTestResult) + Send>;

/// Staged speed test simulation: ping, download, upload.
///
/// The machine does not own a timer. Whoever drives it calls [`SpeedTest::tick`]
/// on its own schedule, which keeps the progression testable with synthetic
/// ticks. No network I/O happens; the result is drawn from fixed ranges.
pub struct SpeedTest<R = StdRng> {
    state: SpeedTestState,
    rng: R,
    callbacks: Vec<CompletionCallback>,
}

impl SpeedTest<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for SpeedTest<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SpeedTest<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            state: SpeedTestState::Idle,
            rng,
            callbacks: Vec::new(),
        }
    }

    pub fn state(&self) -> SpeedTestState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SpeedTestState::Running { .. })
    }

    pub fn progress(&self) -> u8 {
        match self.state {
            SpeedTestState::Idle => 0,
            SpeedTestState::Running { progress, .. } => progress,
            SpeedTestState::Done { .. } => 100,
        }
    }

    /// Registers a callback invoked with every completed result.
    pub fn on_complete<F>(&mut self, callback: F)
    where
        F: FnMut(RunId, &SpeedTestResult) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Begins a new run. Starting again after a finished run is allowed;
    /// starting while a run is in progress is rejected.
    pub fn start(&mut self) -> Result<RunId, SpeedTestError> {
        if let SpeedTestState::Running { run, .. } = self.state {
            debug!(run_id = ?run, "speed test already running, rejecting start");
            return Err(SpeedTestError::AlreadyRunning(run));
        }

        let run = RunId::new();
        self.state = SpeedTestState::Running {
            run,
            phase: Phase::Ping,
            progress: 0,
        };
        info!(run_id = ?run, "speed test started");
        Ok(run)
    }

    pub fn tick(&mut self) -> Result<Tick, SpeedTestError> {
        let SpeedTestState::Running {
            run,
            mut phase,
            progress,
        } = self.state
        else {
            return Err(SpeedTestError::NotRunning);
        };

        let progress = progress.saturating_add(PROGRESS_STEP).min(100);

        if progress >= phase.target() {
            match phase.next() {
                Some(next) => {
                    debug!(run_id = ?run, from = ?phase, to = ?next, "speed test phase complete");
                    phase = next;
                }
                None => return Ok(self.complete(run)),
            }
        }

        self.state = SpeedTestState::Running {
            run,
            phase,
            progress,
        };
        Ok(Tick::Progress {
            run,
            phase,
            progress,
        })
    }

    fn complete(&mut self, run: RunId) -> Tick {
        let result = SpeedTestResult {
            download_mbps: self.rng.random_range(DOWNLOAD_MBPS),
            upload_mbps: self.rng.random_range(UPLOAD_MBPS),
            ping_ms: self.rng.random_range(PING_MS),
            measured_at: jiff::Timestamp::now(),
        };

        self.state = SpeedTestState::Done { run, result };
        info!(
            run_id = ?run,
            download_mbps = result.download_mbps,
            upload_mbps = result.upload_mbps,
            ping_ms = result.ping_ms,
            "speed test complete"
        );

        for callback in self.callbacks.iter_mut() {
            callback(run, &result);
        }

        Tick::Completed { run, result }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedGrade {
    Good,
    Fair,
    Poor,
}

impl SpeedGrade {
    pub fn download(mbps: u32) -> Self {
        Self::against(mbps, 50)
    }

    pub fn upload(mbps: u32) -> Self {
        Self::against(mbps, 25)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpeedGrade::Good => "Good",
            SpeedGrade::Fair => "Fair",
            SpeedGrade::Poor => "Poor",
        }
    }

    fn against(mbps: u32, threshold: u32) -> Self {
        if mbps >= threshold {
            SpeedGrade::Good
        } else if mbps * 2 >= threshold {
            SpeedGrade::Fair
        } else {
            SpeedGrade::Poor
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn seeded() -> SpeedTest<StdRng> {
        SpeedTest::with_rng(StdRng::seed_from_u64(7))
    }

    fn run_to_completion(test: &mut SpeedTest<StdRng>) -> (usize, SpeedTestResult) {
        let mut ticks = 0;
        loop {
            ticks += 1;
            if let Tick::Completed { result, .. } = test.tick().unwrap() {
                return (ticks, result);
            }
        }
    }

    #[test]
    fn tick_before_start_is_rejected() {
        let mut test = seeded();
        assert_eq!(test.tick(), Err(SpeedTestError::NotRunning));
        assert_eq!(test.state(), SpeedTestState::Idle);
    }

    #[test]
    fn phases_advance_at_their_targets() {
        let mut test = seeded();
        let run = test.start().unwrap();

        for _ in 0..14 {
            test.tick().unwrap();
        }
        assert_eq!(
            test.state(),
            SpeedTestState::Running {
                run,
                phase: Phase::Ping,
                progress: 28
            }
        );

        let tick = test.tick().unwrap();
        assert_eq!(
            tick,
            Tick::Progress {
                run,
                phase: Phase::Download,
                progress: 30
            }
        );

        for _ in 0..15 {
            test.tick().unwrap();
        }
        assert_eq!(
            test.state(),
            SpeedTestState::Running {
                run,
                phase: Phase::Upload,
                progress: 60
            }
        );
    }

    #[test]
    fn run_takes_fifty_ticks_and_stays_in_range() {
        let mut test = seeded();
        test.start().unwrap();

        let (ticks, result) = run_to_completion(&mut test);
        assert_eq!(ticks, 50);
        assert!((20..100).contains(&result.download_mbps));
        assert!((10..50).contains(&result.upload_mbps));
        assert!((10..40).contains(&result.ping_ms));
        assert_eq!(test.progress(), 100);
        assert!(!test.is_running());
    }

    #[test]
    fn start_while_running_is_rejected() {
        let mut test = seeded();
        let run = test.start().unwrap();
        test.tick().unwrap();

        assert_eq!(test.start(), Err(SpeedTestError::AlreadyRunning(run)));
        assert_eq!(test.progress(), 2);
    }

    #[test]
    fn test_again_after_done_starts_a_fresh_run() {
        let mut test = seeded();
        let first = test.start().unwrap();
        run_to_completion(&mut test);

        let second = test.start().unwrap();
        assert_ne!(first, second);
        assert_eq!(test.progress(), 0);
    }

    #[test]
    fn callbacks_receive_every_result() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut test = seeded();
        let sink = Arc::clone(&seen);
        test.on_complete(move |run, result| sink.lock().unwrap().push((run, *result)));

        let run = test.start().unwrap();
        let (_, result) = run_to_completion(&mut test);

        assert_eq!(*seen.lock().unwrap(), vec![(run, result)]);
    }

    #[test]
    fn grades_follow_half_threshold_bands() {
        assert_eq!(SpeedGrade::download(50), SpeedGrade::Good);
        assert_eq!(SpeedGrade::download(25), SpeedGrade::Fair);
        assert_eq!(SpeedGrade::download(24), SpeedGrade::Poor);
        assert_eq!(SpeedGrade::upload(25), SpeedGrade::Good);
        assert_eq!(SpeedGrade::upload(13), SpeedGrade::Fair);
        assert_eq!(SpeedGrade::upload(12), SpeedGrade::Poor);
    }
}
