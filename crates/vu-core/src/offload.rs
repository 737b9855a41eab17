//! Consumer side of an offloaded VU1.

use vu_ipc::{ChangeReceiver, RecvError, StopReason, Vu1Change};

use crate::unit::{VpuState, VuIndex};

/// Non-blocking source of VU1 state changes published by the thread that owns VU1.
pub trait OffloadChannel {
    /// Apply the changes published so far and return how many were applied.
    fn drain_changes(&mut self, vpu: &mut VpuState) -> usize;
}

impl<C: OffloadChannel + ?Sized> OffloadChannel for Box<C> {
    fn drain_changes(&mut self, vpu: &mut VpuState) -> usize {
        (**self).drain_changes(vpu)
    }
}

/// Fold one worker-published change into VU1's state and status bits.
pub fn apply_vu1_change(vpu: &mut VpuState, change: &Vu1Change) {
    let unit = VuIndex::Vu1;
    let (state, stat) = vpu.parts_mut(unit);
    match *change {
        Vu1Change::Progress {
            cycle,
            next_block_cycles,
        } => {
            state.last_sync_cycle = cycle;
            state.next_block_cycles = next_block_cycles;
        }
        Vu1Change::Finished { cycle } => {
            state.last_sync_cycle = cycle;
            state.next_block_cycles = 0;
            stat.remove(unit.busy_bit());
        }
        Vu1Change::Stopped { cycle, reason } => {
            state.last_sync_cycle = cycle;
            state.next_block_cycles = 0;
            stat.remove(unit.busy_bit());
            stat.insert(match reason {
                StopReason::DBit => unit.dbit_stop_bit(),
                StopReason::TBit => unit.tbit_stop_bit(),
            });
        }
    }
}

/// [`OffloadChannel`] backed by a [`vu_ipc`] change ring.
#[derive(Debug)]
pub struct RingOffloadChannel {
    rx: ChangeReceiver,
    closed: bool,
}

impl RingOffloadChannel {
    pub fn new(rx: ChangeReceiver) -> Self {
        Self { rx, closed: false }
    }

    /// True once the publisher is gone and everything it sent has been drained.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl OffloadChannel for RingOffloadChannel {
    fn drain_changes(&mut self, vpu: &mut VpuState) -> usize {
        // Bounded by what is committed on entry, so a chatty worker cannot stall the caller. One
        // pop is always attempted so a closed channel is noticed.
        let budget = self.rx.pending().max(1);
        let mut applied = 0;
        for _ in 0..budget {
            match self.rx.try_recv() {
                Ok(change) => {
                    apply_vu1_change(vpu, &change);
                    applied += 1;
                }
                Err(RecvError::Decode(err)) => {
                    tracing::warn!(%err, "dropping undecodable VU1 change");
                }
                Err(RecvError::Empty) => break,
                Err(RecvError::Disconnected) => {
                    if !self.closed {
                        tracing::debug!("VU1 worker channel closed");
                        self.closed = true;
                    }
                    break;
                }
            }
        }
        applied
    }
}
