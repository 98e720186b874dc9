//! Timed Loop
//!
//! Repeats one procedure with one argument tuple until a wall-clock budget has
//! elapsed. The budget is checked only after an invocation completes, so the
//! loop always finishes at least one invocation and never interrupts one.
//! Nothing is counted or timed beyond the budget check: this drives sustained
//! load, it does not measure it.

use crate::error::ConfigError;
use crate::invoke::Procedure;
use crate::value::Args;
use std::time::{Duration, Instant};

/// Wall-clock run time for each timed loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunBudget(Duration);

impl RunBudget {
    /// Budget in whole seconds; zero is rejected
    pub fn from_secs(secs: u64) -> Result<Self, ConfigError> {
        Self::from_duration(Duration::from_secs(secs))
    }

    /// Budget of any non-zero length
    pub fn from_duration(duration: Duration) -> Result<Self, ConfigError> {
        if duration.is_zero() {
            return Err(ConfigError::ZeroBudget);
        }
        Ok(Self(duration))
    }

    /// Budget as a duration
    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl Default for RunBudget {
    fn default() -> Self {
        Self(Duration::from_secs(1))
    }
}

/// Run `procedure` against `target` until `budget` has elapsed.
///
/// Returns the first error raised by an invocation, unchanged.
pub async fn run_timed_loop<T>(
    procedure: &mut Procedure<T>,
    target: &mut T,
    args: &Args,
    budget: RunBudget,
) -> anyhow::Result<()> {
    let start = Instant::now();
    loop {
        procedure.invoke(target, args).await?;
        if start.elapsed() >= budget.as_duration() {
            return Ok(());
        }
    }
}
