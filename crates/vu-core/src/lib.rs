//! Block-granular co-scheduling of the two vector units against the primary processor.
//!
//! The primary processor's event loop polls [`VuBlockScheduler::tick`] for each unit. The
//! scheduler decides whether enough primary cycles have elapsed to run the unit's next microcode
//! block, hands the cycle budget to the unit's [`BlockExecutor`], and asks the [`EventTimer`] to
//! poll again when the next block is due.
//!
//! # Ownership of shared state
//!
//! | state | written by | read by |
//! |-------|------------|---------|
//! | primary cycle counter ([`CycleClock`]) | primary processor | scheduler, executors |
//! | busy/stop bits ([`VpuStat`]) | executors, unit start, offload channel | scheduler |
//! | `last_sync_cycle` | executors, unit start, offload channel, scheduler (after a kickstart) | scheduler |
//! | `next_block_cycles` | executors, unit start, offload channel | scheduler |
//!
//! The scheduler borrows all of it through a [`VuContext`] for the duration of one call and never
//! writes a status bit itself.
//!
//! [`CycleClock`]: vu_time::CycleClock
//! [`EventTimer`]: vu_time::EventTimer

pub mod config;
pub mod exec;
pub mod offload;
pub mod scheduler;
pub mod unit;

pub use config::{ConfigError, SchedulerConfig, KICKSTART_CYCLES};
pub use exec::{BlockExecutor, ExecUnit, ScriptedExecutor};
pub use offload::{apply_vu1_change, OffloadChannel, RingOffloadChannel};
pub use scheduler::{SchedulerStats, Vu1Backend, VuBlockScheduler, VuContext};
pub use unit::{VpuStat, VpuState, VuIndex, VuUnitState};
