//! Start gate arbitrating between a queued run and cancellation

use std::sync::atomic::{AtomicU8, Ordering};

const QUEUED: u8 = 0;
const STARTED: u8 = 1;
const CANCELLED: u8 = 2;

/// One-shot latch: exactly one of `try_start` / `try_cancel` wins
#[derive(Debug, Default)]
pub struct StartGate {
    state: AtomicU8,
}

impl StartGate {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(QUEUED),
        }
    }

    fn transition(&self, to: u8) -> bool {
        self.state
            .compare_exchange(QUEUED, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Claim the gate for the engine run
    pub fn try_start(&self) -> bool {
        self.transition(STARTED)
    }

    /// Claim the gate for cancellation
    pub fn try_cancel(&self) -> bool {
        self.transition(CANCELLED)
    }

    pub fn is_started(&self) -> bool {
        self.state.load(Ordering::Acquire) == STARTED
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }
}
