use crate::clock::{cycle_delta, CycleClock};

/// Lets a component ask the primary event loop to poll it again later.
pub trait EventTimer {
    /// Request re-invocation no sooner than `delta_cycles` primary cycles from now.
    ///
    /// A non-positive delta means the next poll.
    fn arm_next(&mut self, delta_cycles: i32);
}

/// Single-deadline event timer.
///
/// Only the earliest requested deadline is kept: arming with a later deadline while an earlier one
/// is pending is a no-op, matching how the primary processor folds every "next event" request into
/// one comparison per loop iteration.
#[derive(Debug, Clone)]
pub struct NextEventTimer {
    clock: CycleClock,
    next_event: Option<u32>,
    arms: u64,
}

impl NextEventTimer {
    pub fn new(clock: CycleClock) -> Self {
        Self {
            clock,
            next_event: None,
            arms: 0,
        }
    }

    /// Absolute cycle of the pending deadline, if any.
    pub fn pending(&self) -> Option<u32> {
        self.next_event
    }

    /// Cycles left until the pending deadline (zero or negative once due).
    pub fn cycles_until(&self) -> Option<i32> {
        self.next_event
            .map(|deadline| cycle_delta(deadline, self.clock.now()))
    }

    pub fn is_due(&self) -> bool {
        matches!(self.cycles_until(), Some(left) if left <= 0)
    }

    /// Consume the pending deadline if it has been reached.
    pub fn take_due(&mut self) -> bool {
        if self.is_due() {
            self.next_event = None;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.next_event = None;
    }

    /// Total number of [`EventTimer::arm_next`] requests seen.
    pub fn arm_count(&self) -> u64 {
        self.arms
    }
}

impl EventTimer for NextEventTimer {
    fn arm_next(&mut self, delta_cycles: i32) {
        self.arms += 1;
        let now = self.clock.now();
        let deadline = now.wrapping_add(delta_cycles.max(0) as u32);
        match self.next_event {
            Some(current) if cycle_delta(current, now) <= cycle_delta(deadline, now) => {}
            _ => {
                tracing::trace!(now, deadline, "event timer re-armed");
                self.next_event = Some(deadline);
            }
        }
    }
}
