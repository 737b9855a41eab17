use std::collections::VecDeque;
use std::thread;

use proptest::prelude::*;
use vu_ipc::{record_ring, PopError, PushError, Record};

#[test]
fn pop_reports_disconnect_only_after_drain() {
    let (mut tx, mut rx) = record_ring(4);
    tx.try_push(&[7, 1, 2, 3]).unwrap();
    drop(tx);

    assert_eq!(rx.try_pop(), Ok([7, 1, 2, 3]));
    assert_eq!(rx.try_pop(), Err(PopError::Disconnected));
}

#[test]
fn push_fails_once_consumer_is_gone() {
    let (mut tx, rx) = record_ring(4);
    drop(rx);
    assert_eq!(tx.try_push(&[0; 4]), Err(PushError::Disconnected));
}

#[test]
fn counters_wrap_without_losing_records() {
    let (mut tx, mut rx) = record_ring(4);
    // Far more records than the capacity so slot indices cycle many times.
    for i in 0..10_000u32 {
        tx.try_push(&[i, i ^ 0xFFFF, 0, 0]).unwrap();
        assert_eq!(rx.try_pop(), Ok([i, i ^ 0xFFFF, 0, 0]));
    }
    assert!(rx.is_empty());
}

#[test]
fn spsc_threads_preserve_order() {
    const COUNT: u32 = 200_000;
    let (mut tx, mut rx) = record_ring(64);

    let producer = thread::spawn(move || {
        for i in 0..COUNT {
            tx.push_spinning(&[i, i.wrapping_mul(3), !i, 0]).unwrap();
        }
    });

    let mut expected = 0u32;
    loop {
        match rx.try_pop() {
            Ok(rec) => {
                assert_eq!(rec, [expected, expected.wrapping_mul(3), !expected, 0]);
                expected += 1;
            }
            Err(PopError::Empty) => std::hint::spin_loop(),
            Err(PopError::Disconnected) => break,
        }
    }
    producer.join().unwrap();
    assert_eq!(expected, COUNT);
}

proptest! {
    #[test]
    fn ring_matches_fifo_model(ops in proptest::collection::vec(any::<(bool, u32)>(), 0..512)) {
        let (mut tx, mut rx) = record_ring(8);
        let mut model: VecDeque<Record> = VecDeque::new();
        for (push, v) in ops {
            if push {
                let rec = [v, v.rotate_left(7), 0, 1];
                match tx.try_push(&rec) {
                    Ok(()) => model.push_back(rec),
                    Err(PushError::Full) => prop_assert_eq!(model.len(), 8),
                    Err(PushError::Disconnected) => prop_assert!(false, "consumer alive"),
                }
            } else {
                match rx.try_pop() {
                    Ok(rec) => prop_assert_eq!(Some(rec), model.pop_front()),
                    Err(PopError::Empty) => prop_assert!(model.is_empty()),
                    Err(PopError::Disconnected) => prop_assert!(false, "producer alive"),
                }
            }
            prop_assert_eq!(rx.len(), model.len());
        }
    }
}
