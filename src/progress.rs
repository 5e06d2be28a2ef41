//! Progress reporting for long-running prime and key generation.

use core::ops::ControlFlow;

/// A step reached during primality testing or key generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The prime search is sieving; `step` counts candidates skipped so far.
    Sieve {
        /// Number of 2-increments walked from the seed.
        step: u32,
    },
    /// A Rabin-Miller round is about to run.
    RabinMiller {
        /// Zero-based round index.
        round: u32,
    },
    /// A prime was accepted.
    PrimeFound,
    /// The generated key's round-trip self-test is starting.
    SelfTestBegin,
    /// The self-test finished successfully.
    SelfTestEnd,
}

/// Observer of [`ProgressEvent`]s.
///
/// Returning [`ControlFlow::Break`] asks the running operation to stop.
pub trait Progress {
    /// Called as each event happens.
    fn report(&mut self, event: ProgressEvent) -> ControlFlow<()>;
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _event: ProgressEvent) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<F> Progress for F
where
    F: FnMut(ProgressEvent) -> ControlFlow<()>,
{
    fn report(&mut self, event: ProgressEvent) -> ControlFlow<()> {
        self(event)
    }
}
