//! Primary-processor cycle time and event re-arming.
//!
//! The primary processor owns a wrapping 32-bit cycle counter. Everything that schedules against
//! it (vector units, the event loop) reads the counter through a [`CycleClock`] handle and compares
//! timestamps with [`cycle_delta`], never with plain `<`, so comparisons stay correct across
//! wraparound.

mod clock;
mod event;

pub use clock::{cycle_delta, CycleClock, CycleCounter};
pub use event::{EventTimer, NextEventTimer};
