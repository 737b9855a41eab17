use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::exec::ExecUnit;

/// Which vector unit.
///
/// VU0 is tied to the primary processor's pipeline (it also serves as its macro-mode
/// coprocessor); VU1 is standalone and may be driven by its own worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VuIndex {
    Vu0,
    Vu1,
}

impl VuIndex {
    pub const ALL: [VuIndex; 2] = [VuIndex::Vu0, VuIndex::Vu1];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            VuIndex::Vu0 => 0,
            VuIndex::Vu1 => 1,
        }
    }

    /// Busy bit for this unit in [`VpuStat`].
    #[inline]
    pub fn busy_bit(self) -> VpuStat {
        match self {
            VuIndex::Vu0 => VpuStat::VBS0,
            VuIndex::Vu1 => VpuStat::VBS1,
        }
    }

    pub fn dbit_stop_bit(self) -> VpuStat {
        match self {
            VuIndex::Vu0 => VpuStat::VDS0,
            VuIndex::Vu1 => VpuStat::VDS1,
        }
    }

    pub fn tbit_stop_bit(self) -> VpuStat {
        match self {
            VuIndex::Vu0 => VpuStat::VTS0,
            VuIndex::Vu1 => VpuStat::VTS1,
        }
    }
}

bitflags! {
    /// VPU status register.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
    pub struct VpuStat: u32 {
        /// VU0 busy.
        const VBS0 = 1 << 0;
        /// VU0 stopped on a D-bit.
        const VDS0 = 1 << 1;
        /// VU0 stopped on a T-bit.
        const VTS0 = 1 << 2;
        /// VU1 busy.
        const VBS1 = 1 << 8;
        /// VU1 stopped on a D-bit.
        const VDS1 = 1 << 9;
        /// VU1 stopped on a T-bit.
        const VTS1 = 1 << 10;
    }
}

/// Per-unit timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VuUnitState {
    /// Primary cycle the unit's own timeline has reached.
    pub last_sync_cycle: u32,
    /// Cost of the block the unit will run next.
    pub next_block_cycles: u32,
}

/// Status register plus both units' timelines.
///
/// Owned by the emulator core. Mutation goes through [`VpuState::exec_unit`] (execution
/// capability), [`VpuState::start_microprogram`] (unit start) or [`crate::apply_vu1_change`]
/// (offload channel). The scheduler itself only realigns a unit's timeline after a kickstart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VpuState {
    stat: VpuStat,
    units: [VuUnitState; 2],
}

impl VpuState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stat(&self) -> VpuStat {
        self.stat
    }

    #[inline]
    pub fn is_running(&self, unit: VuIndex) -> bool {
        self.stat.contains(unit.busy_bit())
    }

    pub fn unit(&self, unit: VuIndex) -> &VuUnitState {
        &self.units[unit.index()]
    }

    /// Start a microprogram on `unit` at primary cycle `now`.
    ///
    /// Sets the busy bit, clears stale stop bits and aligns the unit's timeline with the primary
    /// processor. The cost of the first block is unknown until it has been fetched.
    pub fn start_microprogram(&mut self, unit: VuIndex, now: u32) {
        self.stat
            .remove(unit.dbit_stop_bit() | unit.tbit_stop_bit());
        self.stat.insert(unit.busy_bit());
        self.units[unit.index()] = VuUnitState {
            last_sync_cycle: now,
            next_block_cycles: 0,
        };
    }

    /// Borrow `unit` for an execution call.
    pub fn exec_unit(&mut self, unit: VuIndex) -> ExecUnit<'_> {
        ExecUnit::new(unit, &mut self.units[unit.index()], &mut self.stat)
    }

    /// Realign `unit`'s timeline with the primary counter.
    pub(crate) fn resync(&mut self, unit: VuIndex, now: u32) {
        self.units[unit.index()].last_sync_cycle = now;
    }

    pub(crate) fn parts_mut(&mut self, unit: VuIndex) -> (&mut VuUnitState, &mut VpuStat) {
        (&mut self.units[unit.index()], &mut self.stat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_sets_busy_and_clears_stop_bits() {
        let mut vpu = VpuState::new();
        vpu.exec_unit(VuIndex::Vu1).stop_on_tbit();
        assert!(vpu.stat().contains(VpuStat::VTS1));

        vpu.start_microprogram(VuIndex::Vu1, 777);
        assert_eq!(vpu.stat(), VpuStat::VBS1);
        assert!(vpu.is_running(VuIndex::Vu1));
        assert!(!vpu.is_running(VuIndex::Vu0));
        assert_eq!(vpu.unit(VuIndex::Vu1).last_sync_cycle, 777);
    }
}
