use std::thread::{self, JoinHandle};

use serde::Serialize;
use vu_core::{BlockExecutor, ScriptedExecutor, VpuState, VuIndex};
use vu_ipc::{ChangePublisher, Vu1Change};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerSummary {
    pub blocks_executed: u64,
    pub changes_published: u64,
    pub final_cycle: u32,
    /// The coordinator went away before the program finished.
    pub abandoned: bool,
}

/// Handle to a thread that owns VU1.
#[derive(Debug)]
pub struct Vu1Worker {
    handle: JoinHandle<WorkerSummary>,
}

impl Vu1Worker {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker. `None` if it panicked.
    pub fn join(self) -> Option<WorkerSummary> {
        self.handle.join().ok()
    }
}

/// Run `blocks` as a VU1 microprogram started at `start_cycle` on a dedicated thread.
///
/// The worker keeps its own copy of VU1's state and publishes a change after every `quantum`
/// cycles of progress; the coordinator never touches that copy.
pub fn spawn_vu1_worker(
    blocks: Vec<u32>,
    start_cycle: u32,
    quantum: u32,
    mut publisher: ChangePublisher,
) -> std::io::Result<Vu1Worker> {
    let handle = thread::Builder::new()
        .name("vu1-worker".into())
        .spawn(move || {
            let unit = VuIndex::Vu1;
            let mut exec = ScriptedExecutor::new(blocks);
            let mut local = VpuState::new();
            local.start_microprogram(unit, start_cycle);

            let mut summary = WorkerSummary::default();
            loop {
                exec.execute(&mut local.exec_unit(unit), quantum);
                let state = *local.unit(unit);
                let running = local.is_running(unit);
                let change = if running {
                    Vu1Change::Progress {
                        cycle: state.last_sync_cycle,
                        next_block_cycles: state.next_block_cycles,
                    }
                } else {
                    Vu1Change::Finished {
                        cycle: state.last_sync_cycle,
                    }
                };
                if publisher.publish(&change).is_err() {
                    tracing::debug!("coordinator dropped the VU1 change channel");
                    summary.abandoned = true;
                    break;
                }
                summary.changes_published += 1;
                summary.final_cycle = state.last_sync_cycle;
                if !running {
                    break;
                }
            }
            summary.blocks_executed = exec.executed_blocks();
            summary
        })?;
    Ok(Vu1Worker { handle })
}
