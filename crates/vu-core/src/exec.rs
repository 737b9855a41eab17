use std::collections::VecDeque;

use vu_time::cycle_delta;

use crate::unit::{VpuStat, VuIndex, VuUnitState};

/// Runs a unit's microcode for a cycle budget.
///
/// Implemented per unit and per backend (interpreter, recompiler). Implementations advance the
/// unit's timeline, publish the cost of the next block and clear the unit's busy bit when the
/// microprogram ends. A call must return after consuming roughly `cycle_budget` cycles; whole
/// blocks may overshoot it.
pub trait BlockExecutor {
    fn execute(&mut self, unit: &mut ExecUnit<'_>, cycle_budget: u32);
}

impl<E: BlockExecutor + ?Sized> BlockExecutor for Box<E> {
    fn execute(&mut self, unit: &mut ExecUnit<'_>, cycle_budget: u32) {
        (**self).execute(unit, cycle_budget)
    }
}

/// Mutable view of one unit handed to a [`BlockExecutor`].
#[derive(Debug)]
pub struct ExecUnit<'a> {
    id: VuIndex,
    state: &'a mut VuUnitState,
    stat: &'a mut VpuStat,
}

impl<'a> ExecUnit<'a> {
    pub(crate) fn new(id: VuIndex, state: &'a mut VuUnitState, stat: &'a mut VpuStat) -> Self {
        Self { id, state, stat }
    }

    pub fn id(&self) -> VuIndex {
        self.id
    }

    pub fn state(&self) -> &VuUnitState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.stat.contains(self.id.busy_bit())
    }

    /// Retire `cycles` on the unit's own timeline.
    pub fn advance(&mut self, cycles: u32) {
        self.state.last_sync_cycle = self.state.last_sync_cycle.wrapping_add(cycles);
    }

    pub fn set_next_block_cycles(&mut self, cycles: u32) {
        self.state.next_block_cycles = cycles;
    }

    /// The microprogram hit its end bit.
    pub fn finish(&mut self) {
        self.stat.remove(self.id.busy_bit());
    }

    pub fn stop_on_dbit(&mut self) {
        self.stat.remove(self.id.busy_bit());
        self.stat.insert(self.id.dbit_stop_bit());
    }

    pub fn stop_on_tbit(&mut self) {
        self.stat.remove(self.id.busy_bit());
        self.stat.insert(self.id.tbit_stop_bit());
    }
}

/// Replays a microprogram described only by its block costs.
///
/// Blocks run whole: a call keeps running blocks while the unit's timeline is behind
/// `last_sync_cycle + budget`, so a zero budget runs nothing and a one-cycle budget runs exactly
/// one block. The last block carries the end bit.
#[derive(Debug, Clone, Default)]
pub struct ScriptedExecutor {
    blocks: VecDeque<u32>,
    executed_blocks: u64,
}

impl ScriptedExecutor {
    pub fn new(blocks: impl IntoIterator<Item = u32>) -> Self {
        Self {
            blocks: blocks.into_iter().collect(),
            executed_blocks: 0,
        }
    }

    /// Replace the remaining program.
    pub fn load(&mut self, blocks: impl IntoIterator<Item = u32>) {
        self.blocks = blocks.into_iter().collect();
    }

    pub fn remaining_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn executed_blocks(&self) -> u64 {
        self.executed_blocks
    }

    /// Cost of the block that would run next, zero once the program is exhausted.
    pub fn next_block_cycles(&self) -> u32 {
        self.blocks.front().copied().unwrap_or(0)
    }
}

impl BlockExecutor for ScriptedExecutor {
    fn execute(&mut self, unit: &mut ExecUnit<'_>, cycle_budget: u32) {
        let target = unit.state().last_sync_cycle.wrapping_add(cycle_budget);
        while unit.is_running() && cycle_delta(unit.state().last_sync_cycle, target) < 0 {
            let Some(cost) = self.blocks.pop_front() else {
                unit.finish();
                break;
            };
            unit.advance(cost);
            self.executed_blocks += 1;
            if self.blocks.is_empty() {
                unit.finish();
            }
        }
        unit.set_next_block_cycles(self.next_block_cycles());
    }
}
