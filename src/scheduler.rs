//! Bounded fan-out/fan-in over independent units of remote work.
//!
//! Every unit gets exactly one outcome. Units run under a semaphore sized to
//! the configured ceiling; a fatal failure stops units that have not started
//! yet (they come back `Cancelled`) while units already running are drained.

use crate::error::{ApiError, BatchFailure};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Result of one unit of work.
#[derive(Debug, Clone)]
pub enum UnitOutcome<T> {
    Completed(T),
    Failed(BatchFailure),
    /// Never dispatched because an earlier unit hit a fatal error.
    Cancelled,
}

impl<T> UnitOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, UnitOutcome::Completed(_))
    }
}

/// One write-once slot per unit.
struct OutcomeSlots<T> {
    slots: Vec<Option<UnitOutcome<T>>>,
    filled: usize,
}

impl<T> OutcomeSlots<T> {
    fn new(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
            filled: 0,
        }
    }

    fn fill(&mut self, index: usize, outcome: UnitOutcome<T>) -> Result<(), ApiError> {
        let slot = self.slots.get_mut(index).ok_or_else(|| {
            ApiError::Precondition(format!("Outcome for unknown unit {}", index))
        })?;
        if slot.is_some() {
            return Err(ApiError::Precondition(format!(
                "Unit {} reported more than one outcome",
                index
            )));
        }
        *slot = Some(outcome);
        self.filled += 1;
        Ok(())
    }

    fn finish(self) -> Result<Vec<UnitOutcome<T>>, ApiError> {
        if self.filled != self.slots.len() {
            return Err(ApiError::Precondition(format!(
                "Collected {} outcome(s) for {} unit(s)",
                self.filled,
                self.slots.len()
            )));
        }
        Ok(self.slots.into_iter().flatten().collect())
    }
}

/// Run `work` for every unit with at most `concurrency` in flight.
///
/// The returned vector is indexed like `units`, whatever order units finish in.
pub async fn fan_out<U, T, F, Fut>(
    units: Vec<U>,
    concurrency: usize,
    work: F,
) -> Result<Vec<UnitOutcome<T>>, ApiError>
where
    F: Fn(usize, U) -> Fut,
    Fut: Future<Output = Result<T, BatchFailure>>,
{
    if concurrency == 0 {
        return Err(ApiError::ConfigError(
            "Concurrency must be at least 1".to_string(),
        ));
    }

    let total = units.len();
    let permits = Semaphore::new(concurrency);
    let halted = AtomicBool::new(false);
    let mut pending = FuturesUnordered::new();

    for (index, unit) in units.into_iter().enumerate() {
        let permits = &permits;
        let halted = &halted;
        let work = &work;
        pending.push(async move {
            let Ok(_permit) = permits.acquire().await else {
                return (index, UnitOutcome::Cancelled);
            };
            if halted.load(Ordering::Acquire) {
                return (index, UnitOutcome::Cancelled);
            }
            let outcome = match work(index, unit).await {
                Ok(value) => UnitOutcome::Completed(value),
                Err(failure) => {
                    if failure.fatal && !halted.swap(true, Ordering::AcqRel) {
                        warn!(
                            unit = index,
                            cause = %failure.cause,
                            "Fatal failure; no further units will be dispatched"
                        );
                    }
                    UnitOutcome::Failed(failure)
                }
            };
            (index, outcome)
        });
    }

    let mut slots = OutcomeSlots::new(total);
    while let Some((index, outcome)) = pending.next().await {
        debug!(unit = index, completed = outcome.is_completed(), "Collected unit outcome");
        slots.fill(index, outcome)?;
    }
    slots.finish()
}
