use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Signed distance from `since` to `now` on the wrapping cycle counter.
///
/// Positive when `now` is later than `since`. Valid as long as the two timestamps are less than
/// 2^31 cycles apart.
#[inline]
pub fn cycle_delta(now: u32, since: u32) -> i32 {
    now.wrapping_sub(since) as i32
}

/// Write handle for the primary processor's cycle counter.
///
/// Only the primary processor's own progression advances the counter; every other component gets
/// a read-only [`CycleClock`] from [`CycleCounter::clock`].
#[derive(Debug, Default)]
pub struct CycleCounter {
    cycle: Arc<AtomicU32>,
}

impl CycleCounter {
    pub fn new(start: u32) -> Self {
        Self {
            cycle: Arc::new(AtomicU32::new(start)),
        }
    }

    pub fn clock(&self) -> CycleClock {
        CycleClock {
            cycle: Arc::clone(&self.cycle),
        }
    }

    pub fn now(&self) -> u32 {
        self.cycle.load(Ordering::Relaxed)
    }

    /// Retire `cycles` primary-processor cycles. Wraps at `u32::MAX`.
    pub fn advance(&mut self, cycles: u32) -> u32 {
        self.cycle
            .fetch_add(cycles, Ordering::Relaxed)
            .wrapping_add(cycles)
    }

    pub fn set(&mut self, cycle: u32) {
        self.cycle.store(cycle, Ordering::Relaxed);
    }
}

/// Read-only view of the primary processor's cycle counter.
#[derive(Debug, Clone)]
pub struct CycleClock {
    cycle: Arc<AtomicU32>,
}

impl CycleClock {
    #[inline]
    pub fn now(&self) -> u32 {
        self.cycle.load(Ordering::Relaxed)
    }

    /// Cycles elapsed since `since` (negative if `since` lies in the future).
    #[inline]
    pub fn since(&self, since: u32) -> i32 {
        cycle_delta(self.now(), since)
    }
}
