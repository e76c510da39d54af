pub mod driver;
pub mod machine;

pub use driver::{SpeedTestEvent, SpeedTestMeter, SpeedTestRun};
pub use machine::{Phase, SpeedGrade, SpeedTest, SpeedTestState, Tick};

use netpulse_core::RunId;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SpeedTestError {
    #[error("a speed test is already running")]
    AlreadyRunning(RunId),
    #[error("no speed test is running")]
    NotRunning,
}
