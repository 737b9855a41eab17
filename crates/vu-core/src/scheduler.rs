use serde::Serialize;
use vu_time::{cycle_delta, CycleClock, EventTimer};

use crate::config::{SchedulerConfig, KICKSTART_CYCLES};
use crate::exec::BlockExecutor;
use crate::offload::OffloadChannel;
use crate::unit::{VpuState, VuIndex};

/// Everything a scheduling call borrows from the emulator core.
pub struct VuContext<'a> {
    pub clock: &'a CycleClock,
    pub vpu: &'a mut VpuState,
    pub timer: &'a mut dyn EventTimer,
}

impl<'a> VuContext<'a> {
    pub fn new(
        clock: &'a CycleClock,
        vpu: &'a mut VpuState,
        timer: &'a mut dyn EventTimer,
    ) -> Self {
        Self { clock, vpu, timer }
    }
}

/// Who runs VU1's microcode.
pub enum Vu1Backend {
    /// Executed inline from the primary loop, like VU0.
    Inline(Box<dyn BlockExecutor>),
    /// Owned by a worker thread; the scheduler only drains its notifications.
    Offloaded(Box<dyn OffloadChannel>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub ticks: u64,
    /// Ticks that found the unit idle.
    pub idle_ticks: u64,
    /// Execution calls, including kickstart slices and cross-kicks.
    pub executions: u64,
    /// Sum of all cycle budgets handed to executors.
    pub cycles_granted: u64,
    pub kickstarts: u64,
    pub cross_kicks: u64,
    pub timer_arms: u64,
    pub offload_changes: u64,
}

impl SchedulerStats {
    fn record_execution(&mut self, budget: u32) {
        self.executions += 1;
        self.cycles_granted += u64::from(budget);
    }
}

/// Decides, per poll, whether and how far to run each vector unit.
pub struct VuBlockScheduler {
    config: SchedulerConfig,
    vu0: Box<dyn BlockExecutor>,
    vu1: Vu1Backend,
    stats: SchedulerStats,
}

impl VuBlockScheduler {
    pub fn new(config: SchedulerConfig, vu0: Box<dyn BlockExecutor>, vu1: Vu1Backend) -> Self {
        Self {
            config,
            vu0,
            vu1,
            stats: SchedulerStats::default(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Flip the kickstart toggle. Takes effect on the next poll.
    pub fn set_kickstart(&mut self, kickstart: bool) {
        self.config.kickstart = kickstart;
    }

    pub fn is_offloaded(&self, unit: VuIndex) -> bool {
        unit == VuIndex::Vu1 && matches!(self.vu1, Vu1Backend::Offloaded(_))
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Per-poll entry point for `unit`.
    ///
    /// `is_startup` marks the poll issued right after a microprogram was started.
    pub fn tick(&mut self, unit: VuIndex, is_startup: bool, cx: &mut VuContext<'_>) {
        self.stats.ticks += 1;

        let executor: &mut dyn BlockExecutor = match (unit, &mut self.vu1) {
            (VuIndex::Vu0, _) => self.vu0.as_mut(),
            (VuIndex::Vu1, Vu1Backend::Inline(executor)) => executor.as_mut(),
            (VuIndex::Vu1, Vu1Backend::Offloaded(channel)) => {
                let drained = channel.drain_changes(cx.vpu);
                self.stats.offload_changes += drained as u64;
                return;
            }
        };

        if !cx.vpu.is_running(unit) {
            self.stats.idle_ticks += 1;
            return;
        }

        let kickstart = self.config.kickstart;
        let kickstarted = is_startup && kickstart;
        if kickstarted {
            // Microprograms may be started before all of their operands have landed; a short
            // guaranteed slice first keeps the unit ahead of those writes.
            tracing::debug!(?unit, cycles = KICKSTART_CYCLES, "kickstart slice");
            executor.execute(&mut cx.vpu.exec_unit(unit), KICKSTART_CYCLES);
            self.stats.kickstarts += 1;
            self.stats.record_execution(KICKSTART_CYCLES);
        } else {
            let state = *cx.vpu.unit(unit);
            let delta = cx.clock.since(state.last_sync_cycle);
            let due = if kickstart {
                delta > 0
            } else {
                i64::from(delta) >= i64::from(state.next_block_cycles)
            };
            if !due {
                return;
            }
            // `due` implies `delta >= 0` in both modes.
            let budget = delta as u32;
            tracing::trace!(?unit, budget, "running vector unit");
            executor.execute(&mut cx.vpu.exec_unit(unit), budget);
            self.stats.record_execution(budget);
        }

        if !cx.vpu.is_running(unit) {
            return;
        }

        // Read back after execution: under kickstart the re-arm distance is the unit's timeline
        // relative to the primary counter, which can be negative when the unit is behind.
        let now = cx.clock.now();
        let state = *cx.vpu.unit(unit);
        let next = if kickstart {
            cycle_delta(state.last_sync_cycle, now)
        } else {
            i32::try_from(state.next_block_cycles).unwrap_or(i32::MAX)
        };
        if next != 0 {
            tracing::trace!(?unit, next, "re-arming event timer");
            cx.timer.arm_next(next);
            self.stats.timer_arms += 1;
        }

        // The kickstart slice is not charged against the unit's timeline: once the re-arm
        // distance has been taken from it, the unit restarts level with the primary counter.
        if kickstarted {
            cx.vpu.resync(unit, now);
        }
    }

    /// Run VU0 up to the primary counter right after operand data was transferred into its
    /// registers, so it consumes the fresh data before its next poll.
    ///
    /// Always acts on VU0, whatever `target` the transfer path names, and ignores the kickstart
    /// toggle. Does not re-arm the event timer.
    pub fn cross_kick(&mut self, target: VuIndex, cx: &mut VuContext<'_>) {
        if target != VuIndex::Vu0 {
            tracing::trace!(?target, "cross-kick always targets VU0");
        }
        let unit = VuIndex::Vu0;
        if !cx.vpu.is_running(unit) {
            return;
        }
        let delta = cx.clock.since(cx.vpu.unit(unit).last_sync_cycle);
        if delta > 0 {
            tracing::debug!(budget = delta, "cross-kicking VU0");
            self.vu0.execute(&mut cx.vpu.exec_unit(unit), delta as u32);
            self.stats.cross_kicks += 1;
            self.stats.record_execution(delta as u32);
        }
    }
}
