#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use vu_core::{BlockExecutor, ExecUnit, OffloadChannel, VpuState};
use vu_time::EventTimer;

/// Shared log of every budget an executor was asked to run.
#[derive(Clone, Default)]
pub struct ExecLog(Rc<RefCell<Vec<u32>>>);

impl ExecLog {
    pub fn snapshot(&self) -> Vec<u32> {
        self.0.borrow().clone()
    }
}

type Behaviour = Box<dyn FnMut(&mut ExecUnit<'_>, u32)>;

pub struct RecordingExecutor {
    log: ExecLog,
    behaviour: Behaviour,
}

impl RecordingExecutor {
    pub fn new<F>(log: ExecLog, behaviour: F) -> Self
    where
        F: FnMut(&mut ExecUnit<'_>, u32) + 'static,
    {
        Self {
            log,
            behaviour: Box::new(behaviour),
        }
    }

    /// Advances the unit by exactly the budget, keeps it running and publishes `next_block`.
    pub fn consuming(log: ExecLog, next_block: u32) -> Self {
        Self::new(log, move |unit, budget| {
            unit.advance(budget);
            unit.set_next_block_cycles(next_block);
        })
    }

    /// Runs to completion on the first call.
    pub fn finishing(log: ExecLog) -> Self {
        Self::new(log, |unit, budget| {
            unit.advance(budget);
            unit.finish();
        })
    }
}

impl BlockExecutor for RecordingExecutor {
    fn execute(&mut self, unit: &mut ExecUnit<'_>, cycle_budget: u32) {
        self.log.0.borrow_mut().push(cycle_budget);
        (self.behaviour)(unit, cycle_budget)
    }
}

#[derive(Clone, Default)]
pub struct TimerLog(Rc<RefCell<Vec<i32>>>);

impl TimerLog {
    pub fn snapshot(&self) -> Vec<i32> {
        self.0.borrow().clone()
    }
}

impl EventTimer for TimerLog {
    fn arm_next(&mut self, delta_cycles: i32) {
        self.0.borrow_mut().push(delta_cycles);
    }
}

#[derive(Clone, Default)]
pub struct DrainLog(Rc<RefCell<u32>>);

impl DrainLog {
    pub fn count(&self) -> u32 {
        *self.0.borrow()
    }
}

impl OffloadChannel for DrainLog {
    fn drain_changes(&mut self, _vpu: &mut VpuState) -> usize {
        *self.0.borrow_mut() += 1;
        0
    }
}

/// Executor that must never be reached.
pub struct Unreachable;

impl BlockExecutor for Unreachable {
    fn execute(&mut self, unit: &mut ExecUnit<'_>, cycle_budget: u32) {
        panic!("unexpected execute({cycle_budget}) on {:?}", unit.id());
    }
}
