use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vu_core::{
    BlockExecutor, ExecUnit, SchedulerConfig, Vu1Backend, VpuState, VuBlockScheduler, VuContext,
    VuIndex,
};
use vu_time::{CycleCounter, NextEventTimer};

fn criterion_config() -> Criterion {
    match std::env::var("VU_BENCH_PROFILE").as_deref() {
        Ok("ci") => Criterion::default()
            .warm_up_time(Duration::from_millis(150))
            .measurement_time(Duration::from_millis(400))
            .sample_size(20),
        _ => Criterion::default()
            .warm_up_time(Duration::from_secs(1))
            .measurement_time(Duration::from_secs(2))
            .sample_size(50),
    }
}

/// Keeps the unit running forever, one 8-cycle block per call.
struct Endless;

impl BlockExecutor for Endless {
    fn execute(&mut self, unit: &mut ExecUnit<'_>, cycle_budget: u32) {
        unit.advance(cycle_budget);
        unit.set_next_block_cycles(8);
    }
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("vu_tick");

    for kickstart in [false, true] {
        let mut sched = VuBlockScheduler::new(
            SchedulerConfig::with_kickstart(kickstart),
            Box::new(Endless),
            Vu1Backend::Inline(Box::new(Endless)),
        );
        let mut counter = CycleCounter::new(0);
        let clock = counter.clock();
        let mut timer = NextEventTimer::new(clock.clone());
        let mut vpu = VpuState::new();
        vpu.start_microprogram(VuIndex::Vu0, 0);

        let name = if kickstart { "busy_kickstart" } else { "busy_batching" };
        group.bench_function(name, |b| {
            b.iter(|| {
                counter.advance(black_box(4));
                let mut cx = VuContext::new(&clock, &mut vpu, &mut timer);
                sched.tick(VuIndex::Vu0, false, &mut cx);
            })
        });
    }

    let mut sched = VuBlockScheduler::new(
        SchedulerConfig::default(),
        Box::new(Endless),
        Vu1Backend::Inline(Box::new(Endless)),
    );
    let counter = CycleCounter::new(0);
    let clock = counter.clock();
    let mut timer = NextEventTimer::new(clock.clone());
    let mut vpu = VpuState::new();
    group.bench_function("idle", |b| {
        b.iter(|| {
            let mut cx = VuContext::new(&clock, &mut vpu, &mut timer);
            sched.tick(black_box(VuIndex::Vu1), false, &mut cx);
        })
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_tick
}
criterion_main!(benches);
