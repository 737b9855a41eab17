use std::thread;

use serde::Serialize;
use thiserror::Error;
use vu_core::{
    ConfigError, RingOffloadChannel, SchedulerStats, ScriptedExecutor, Vu1Backend,
    VuBlockScheduler, VuContext, VuIndex, VpuState,
};
use vu_ipc::change_channel;
use vu_time::{cycle_delta, CycleCounter, NextEventTimer};

use crate::config::{ProgramConfig, SessionConfig};
use crate::worker::{spawn_vu1_worker, Vu1Worker, WorkerSummary};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session config: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to spawn VU1 worker: {0}")]
    SpawnWorker(#[source] std::io::Error),
    #[error("VU1 worker panicked")]
    WorkerPanicked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    pub started: bool,
    pub running: bool,
    pub last_sync_cycle: u32,
    pub next_block_cycles: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub final_cycle: u32,
    pub polls: u64,
    /// Polls that found the event timer due.
    pub timer_events: u64,
    pub vpu_stat: u32,
    pub vu0: UnitReport,
    pub vu1: UnitReport,
    pub scheduler: SchedulerStats,
    pub worker: Option<WorkerSummary>,
}

/// Drive a session to completion.
///
/// Each poll starts any program whose start cycle has been reached, ticks both units, optionally
/// cross-kicks VU0, then advances the primary counter by one slice. A slice is
/// `cycles_per_step` long unless the event timer is due sooner.
///
/// With VU1 offloaded, polling continues past `steps` until the worker has finished and its
/// last change has been drained.
pub fn run_session(config: &SessionConfig) -> Result<SessionReport, SessionError> {
    config.validate()?;

    let mut counter = CycleCounter::new(0);
    let clock = counter.clock();
    let mut timer = NextEventTimer::new(clock.clone());
    let mut vpu = VpuState::new();

    let program_blocks = |program: &Option<ProgramConfig>| {
        program
            .as_ref()
            .map(|p| p.blocks.clone())
            .unwrap_or_default()
    };

    let mut publisher = None;
    let vu1 = if config.offload_vu1 {
        let (tx, rx) = change_channel(config.offload_ring_capacity);
        publisher = Some(tx);
        Vu1Backend::Offloaded(Box::new(RingOffloadChannel::new(rx)))
    } else {
        Vu1Backend::Inline(Box::new(ScriptedExecutor::new(program_blocks(&config.vu1))))
    };
    let mut scheduler = VuBlockScheduler::new(
        config.scheduler,
        Box::new(ScriptedExecutor::new(program_blocks(&config.vu0))),
        vu1,
    );

    let mut pending = [config.vu0.as_ref(), config.vu1.as_ref()];
    let mut worker: Option<Vu1Worker> = None;
    let mut timer_events = 0u64;

    for poll in 0..config.steps {
        let now = counter.now();
        let mut startup = [false; 2];
        for unit in VuIndex::ALL {
            let Some(program) = pending[unit.index()] else {
                continue;
            };
            if cycle_delta(now, program.start_cycle) < 0 {
                continue;
            }
            pending[unit.index()] = None;
            vpu.start_microprogram(unit, now);
            startup[unit.index()] = true;
            tracing::debug!(
                ?unit,
                cycle = now,
                blocks = program.blocks.len(),
                "microprogram started"
            );

            if let (VuIndex::Vu1, Some(tx)) = (unit, publisher.take()) {
                let handle =
                    spawn_vu1_worker(program.blocks.clone(), now, config.worker_quantum, tx)
                        .map_err(SessionError::SpawnWorker)?;
                worker = Some(handle);
            }
        }

        if timer.take_due() {
            timer_events += 1;
        }

        {
            let mut cx = VuContext::new(&clock, &mut vpu, &mut timer);
            for unit in VuIndex::ALL {
                scheduler.tick(unit, startup[unit.index()], &mut cx);
            }
            if let Some(every) = config.cross_kick_every {
                if (poll + 1) % every == 0 {
                    scheduler.cross_kick(VuIndex::Vu0, &mut cx);
                }
            }
        }

        let slice = timer
            .cycles_until()
            .filter(|left| *left > 0)
            .map_or(config.cycles_per_step, |left| {
                (left as u32).min(config.cycles_per_step)
            });
        counter.advance(slice);
    }

    let worker = match worker {
        Some(worker) => {
            let mut cx = VuContext::new(&clock, &mut vpu, &mut timer);
            while !worker.is_finished() {
                scheduler.tick(VuIndex::Vu1, false, &mut cx);
                thread::yield_now();
            }
            let summary = worker.join().ok_or(SessionError::WorkerPanicked)?;
            scheduler.tick(VuIndex::Vu1, false, &mut cx);
            tracing::debug!(?summary, "VU1 worker finished");
            Some(summary)
        }
        None => None,
    };

    let unit_report = |unit: VuIndex, program: &Option<ProgramConfig>| {
        let state = *vpu.unit(unit);
        UnitReport {
            started: program.is_some() && pending[unit.index()].is_none(),
            running: vpu.is_running(unit),
            last_sync_cycle: state.last_sync_cycle,
            next_block_cycles: state.next_block_cycles,
        }
    };

    let report = SessionReport {
        final_cycle: counter.now(),
        polls: config.steps,
        timer_events,
        vpu_stat: vpu.stat().bits(),
        vu0: unit_report(VuIndex::Vu0, &config.vu0),
        vu1: unit_report(VuIndex::Vu1, &config.vu1),
        scheduler: *scheduler.stats(),
        worker,
    };
    tracing::info!(
        final_cycle = report.final_cycle,
        executions = report.scheduler.executions,
        "session complete"
    );
    Ok(report)
}
