use proptest::prelude::*;
use vu_time::{CycleCounter, EventTimer, NextEventTimer};

#[test]
fn arm_sets_deadline_relative_to_now() {
    let mut counter = CycleCounter::new(1_000);
    let mut timer = NextEventTimer::new(counter.clock());

    timer.arm_next(50);
    assert_eq!(timer.pending(), Some(1_050));
    assert_eq!(timer.cycles_until(), Some(50));
    assert!(!timer.is_due());

    counter.advance(49);
    assert!(!timer.take_due());
    counter.advance(1);
    assert!(timer.take_due());
    assert_eq!(timer.pending(), None);
}

#[test]
fn later_request_does_not_push_back_earlier_deadline() {
    let counter = CycleCounter::new(0);
    let mut timer = NextEventTimer::new(counter.clock());

    timer.arm_next(10);
    timer.arm_next(500);
    assert_eq!(timer.pending(), Some(10));

    timer.arm_next(3);
    assert_eq!(timer.pending(), Some(3));
    assert_eq!(timer.arm_count(), 3);
}

#[test]
fn negative_delta_is_due_on_next_poll() {
    let counter = CycleCounter::new(200);
    let mut timer = NextEventTimer::new(counter.clock());

    timer.arm_next(-40);
    assert_eq!(timer.pending(), Some(200));
    assert!(timer.is_due());
}

#[test]
fn cancel_drops_pending_deadline() {
    let mut counter = CycleCounter::new(0);
    let mut timer = NextEventTimer::new(counter.clock());

    timer.arm_next(5);
    timer.cancel();
    assert_eq!(timer.pending(), None);
    counter.advance(10);
    assert!(!timer.take_due());

    // A later request is no longer held back by the cancelled one.
    timer.arm_next(50);
    assert_eq!(timer.pending(), Some(60));
    assert_eq!(timer.arm_count(), 2);
}

#[test]
fn deadline_survives_counter_wraparound() {
    let mut counter = CycleCounter::new(u32::MAX - 10);
    let mut timer = NextEventTimer::new(counter.clock());

    timer.arm_next(20);
    assert_eq!(timer.pending(), Some(9));
    counter.advance(15);
    assert!(!timer.is_due());
    counter.advance(5);
    assert!(timer.is_due());
}

proptest! {
    #[test]
    fn pending_deadline_is_the_earliest_request(
        start in any::<u32>(),
        deltas in proptest::collection::vec(0i32..100_000, 1..16),
    ) {
        let counter = CycleCounter::new(start);
        let mut timer = NextEventTimer::new(counter.clock());
        for &d in &deltas {
            timer.arm_next(d);
        }
        let min = *deltas.iter().min().unwrap();
        prop_assert_eq!(timer.cycles_until(), Some(min));
    }
}
